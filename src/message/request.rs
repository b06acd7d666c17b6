use std::collections::HashMap;
use std::sync::Arc;

use super::EndpointContext;
use super::KeyToken;
use super::MessageType;
use super::OptionSet;
use super::Token;

/// CoAP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestCode {
    Get,
    Post,
    Put,
    Delete,
    Fetch,
    Patch,
    IPatch,
}

/// A received (server side) or prepared (client side) request.
///
/// Payload and user context are reference counted so that
/// [`crate::ObservationUtil::shallow_clone`] shares them with the original.
#[derive(Debug, Clone)]
pub struct Request {
    code: RequestCode,
    message_type: MessageType,
    mid: Option<u16>,
    token: Token,
    options: OptionSet,
    payload: Arc<[u8]>,
    unintended_payload: bool,
    user_context: Option<Arc<HashMap<String, String>>>,
    max_resource_body_size: usize,
    source_context: Option<Arc<EndpointContext>>,
    destination_context: Option<Arc<EndpointContext>>,
}

impl Request {
    pub fn new(
        code: RequestCode,
        message_type: MessageType,
    ) -> Self {
        Self {
            code,
            message_type,
            mid: None,
            token: Token::default(),
            options: OptionSet::default(),
            payload: Arc::from(Vec::new()),
            unintended_payload: false,
            user_context: None,
            max_resource_body_size: 0,
            source_context: None,
            destination_context: None,
        }
    }

    /// Observe registration request (`GET` with observe option `0`).
    pub fn observe_register(message_type: MessageType) -> Self {
        let mut request = Self::new(RequestCode::Get, message_type);
        request.options.set_observe(crate::constants::OBSERVE_REGISTER);
        request
    }

    pub fn with_mid(
        mut self,
        mid: u16,
    ) -> Self {
        self.mid = Some(mid);
        self
    }

    pub fn with_token(
        mut self,
        token: Token,
    ) -> Self {
        self.token = token;
        self
    }

    pub fn with_options(
        mut self,
        options: OptionSet,
    ) -> Self {
        self.options = options;
        self
    }

    /// Sets the payload. Payloads on methods that don't define one must be
    /// flagged with [`Request::with_unintended_payload`] first.
    pub fn with_payload(
        mut self,
        payload: impl Into<Arc<[u8]>>,
    ) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_unintended_payload(mut self) -> Self {
        self.unintended_payload = true;
        self
    }

    pub fn with_user_context(
        mut self,
        user_context: Arc<HashMap<String, String>>,
    ) -> Self {
        self.user_context = Some(user_context);
        self
    }

    pub fn with_max_resource_body_size(
        mut self,
        size: usize,
    ) -> Self {
        self.max_resource_body_size = size;
        self
    }

    pub fn with_source_context(
        mut self,
        context: Arc<EndpointContext>,
    ) -> Self {
        self.source_context = Some(context);
        self
    }

    pub fn with_destination_context(
        mut self,
        context: Arc<EndpointContext>,
    ) -> Self {
        self.destination_context = Some(context);
        self
    }

    pub fn code(&self) -> RequestCode {
        self.code
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn mid(&self) -> Option<u16> {
        self.mid
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.options
    }

    pub fn payload(&self) -> &Arc<[u8]> {
        &self.payload
    }

    pub fn is_unintended_payload(&self) -> bool {
        self.unintended_payload
    }

    pub fn user_context(&self) -> Option<&Arc<HashMap<String, String>>> {
        self.user_context.as_ref()
    }

    pub fn max_resource_body_size(&self) -> usize {
        self.max_resource_body_size
    }

    pub fn source_context(&self) -> Option<&Arc<EndpointContext>> {
        self.source_context.as_ref()
    }

    pub fn destination_context(&self) -> Option<&Arc<EndpointContext>> {
        self.destination_context.as_ref()
    }

    pub fn is_confirmable(&self) -> bool {
        self.message_type == MessageType::Confirmable
    }

    /// Key of the observe relation this request registers or cancels.
    ///
    /// `None` for requests without source context, i.e. requests that were
    /// not received from a peer.
    pub fn key_token(&self) -> Option<KeyToken> {
        self.source_context
            .as_ref()
            .map(|ctx| KeyToken::new(self.token.clone(), ctx.peer_address()))
    }
}
