use crate::constants::OBSERVE_REGISTER;
use crate::constants::OBSERVE_SEQUENCE_MASK;

/// Options of a CoAP message relevant for observe processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    observe: Option<u32>,
    uri_path: Vec<String>,
    uri_query: Vec<String>,
    content_format: Option<u16>,
    accept: Option<u16>,
    max_age: Option<u32>,
    etags: Vec<Vec<u8>>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self) -> Option<u32> {
        self.observe
    }

    pub fn has_observe(&self) -> bool {
        self.observe.is_some()
    }

    /// Sets the observe option, truncated to its 24 bit range.
    pub fn set_observe(
        &mut self,
        seqnum: u32,
    ) -> &mut Self {
        self.observe = Some(seqnum & OBSERVE_SEQUENCE_MASK);
        self
    }

    pub fn remove_observe(&mut self) -> &mut Self {
        self.observe = None;
        self
    }

    pub fn is_observe_register(&self) -> bool {
        self.observe == Some(OBSERVE_REGISTER)
    }

    pub fn uri_path(&self) -> &[String] {
        &self.uri_path
    }

    /// Sets the uri path segments from a `/` separated path.
    pub fn set_uri_path(
        &mut self,
        path: &str,
    ) -> &mut Self {
        self.uri_path = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn uri_path_string(&self) -> String {
        self.uri_path.join("/")
    }

    pub fn uri_query(&self) -> &[String] {
        &self.uri_query
    }

    pub fn add_uri_query(
        &mut self,
        query: impl Into<String>,
    ) -> &mut Self {
        self.uri_query.push(query.into());
        self
    }

    pub fn content_format(&self) -> Option<u16> {
        self.content_format
    }

    pub fn set_content_format(
        &mut self,
        format: u16,
    ) -> &mut Self {
        self.content_format = Some(format);
        self
    }

    pub fn accept(&self) -> Option<u16> {
        self.accept
    }

    pub fn set_accept(
        &mut self,
        format: u16,
    ) -> &mut Self {
        self.accept = Some(format);
        self
    }

    pub fn max_age(&self) -> Option<u32> {
        self.max_age
    }

    pub fn set_max_age(
        &mut self,
        seconds: u32,
    ) -> &mut Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn etags(&self) -> &[Vec<u8>] {
        &self.etags
    }

    pub fn add_etag(
        &mut self,
        etag: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.etags.push(etag.into());
        self
    }
}
