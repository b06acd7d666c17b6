use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use super::MessageType;
use super::OptionSet;

/// CoAP response code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Created,
    Deleted,
    Valid,
    Changed,
    Content,
    Continue,
    BadRequest,
    Unauthorized,
    BadOption,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    RequestEntityIncomplete,
    PreconditionFailed,
    RequestEntityTooLarge,
    UnsupportedContentFormat,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    ProxyNotSupported,
}

impl ResponseCode {
    /// `(class, detail)` as in `2.05`
    pub fn value(&self) -> (u8, u8) {
        match self {
            ResponseCode::Created => (2, 1),
            ResponseCode::Deleted => (2, 2),
            ResponseCode::Valid => (2, 3),
            ResponseCode::Changed => (2, 4),
            ResponseCode::Content => (2, 5),
            ResponseCode::Continue => (2, 31),
            ResponseCode::BadRequest => (4, 0),
            ResponseCode::Unauthorized => (4, 1),
            ResponseCode::BadOption => (4, 2),
            ResponseCode::Forbidden => (4, 3),
            ResponseCode::NotFound => (4, 4),
            ResponseCode::MethodNotAllowed => (4, 5),
            ResponseCode::NotAcceptable => (4, 6),
            ResponseCode::RequestEntityIncomplete => (4, 8),
            ResponseCode::PreconditionFailed => (4, 12),
            ResponseCode::RequestEntityTooLarge => (4, 13),
            ResponseCode::UnsupportedContentFormat => (4, 15),
            ResponseCode::InternalServerError => (5, 0),
            ResponseCode::NotImplemented => (5, 1),
            ResponseCode::BadGateway => (5, 2),
            ResponseCode::ServiceUnavailable => (5, 3),
            ResponseCode::GatewayTimeout => (5, 4),
            ResponseCode::ProxyNotSupported => (5, 5),
        }
    }

    pub fn is_success(&self) -> bool {
        self.value().0 == 2
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let (class, detail) = self.value();
        write!(f, "{}.{:02}", class, detail)
    }
}

/// Response shared between the resource, the observe relation and the
/// transport.
///
/// The transport updates the transmission flags while the relation inspects
/// them, so everything mutable is behind interior mutability and responses
/// travel as `Arc<Response>`. Two responses are "the same" notification only
/// if they are the same allocation ([`Arc::ptr_eq`]).
pub struct Response {
    code: ResponseCode,
    payload: Arc<[u8]>,
    message_type: Mutex<Option<MessageType>>,
    options: Mutex<OptionSet>,
    acknowledged: AtomicBool,
    rejected: AtomicBool,
    timed_out: AtomicBool,
    transfer_complete: AtomicBool,
}

impl Response {
    pub fn new(code: ResponseCode) -> Self {
        Self {
            code,
            payload: Arc::from(Vec::new()),
            message_type: Mutex::new(None),
            options: Mutex::new(OptionSet::default()),
            acknowledged: AtomicBool::new(false),
            rejected: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            transfer_complete: AtomicBool::new(false),
        }
    }

    pub fn with_payload(
        mut self,
        payload: impl Into<Arc<[u8]>>,
    ) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_type(
        self,
        message_type: MessageType,
    ) -> Self {
        self.set_type(message_type);
        self
    }

    pub fn with_options(
        self,
        options: OptionSet,
    ) -> Self {
        *self.options.lock() = options;
        self
    }

    pub fn code(&self) -> ResponseCode {
        self.code
    }

    pub fn payload(&self) -> &Arc<[u8]> {
        &self.payload
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn message_type(&self) -> Option<MessageType> {
        *self.message_type.lock()
    }

    pub fn set_type(
        &self,
        message_type: MessageType,
    ) {
        *self.message_type.lock() = Some(message_type);
    }

    pub fn is_confirmable(&self) -> bool {
        self.message_type() == Some(MessageType::Confirmable)
    }

    /// Snapshot of the current options
    pub fn options(&self) -> OptionSet {
        self.options.lock().clone()
    }

    /// Runs `f` with exclusive access to the options.
    pub fn update_options<R>(
        &self,
        f: impl FnOnce(&mut OptionSet) -> R,
    ) -> R {
        let mut guard = self.options.lock();
        f(&mut guard)
    }

    pub fn observe(&self) -> Option<u32> {
        self.options.lock().observe()
    }

    pub fn set_observe(
        &self,
        seqnum: u32,
    ) {
        self.options.lock().set_observe(seqnum);
    }

    pub fn remove_observe(&self) {
        self.options.lock().remove_observe();
    }

    /// A notification is any response carrying the observe option.
    pub fn is_notification(&self) -> bool {
        self.options.lock().has_observe()
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::Acquire)
    }

    pub fn set_acknowledged(
        &self,
        acknowledged: bool,
    ) {
        self.acknowledged.store(acknowledged, Ordering::Release);
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected.load(Ordering::Acquire)
    }

    pub fn set_rejected(
        &self,
        rejected: bool,
    ) {
        self.rejected.store(rejected, Ordering::Release);
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Acquire)
    }

    pub fn set_timed_out(
        &self,
        timed_out: bool,
    ) {
        self.timed_out.store(timed_out, Ordering::Release);
    }

    /// Marks the response as finished; a completed response is never sent
    /// again.
    pub fn on_transfer_complete(&self) {
        self.transfer_complete.store(true, Ordering::Release);
    }

    pub fn is_transfer_complete(&self) -> bool {
        self.transfer_complete.load(Ordering::Acquire)
    }

    /// `true` while a confirmable transmission has neither been acknowledged,
    /// rejected nor timed out.
    pub fn is_in_transit(&self) -> bool {
        self.is_confirmable() && !self.is_acknowledged() && !self.is_timed_out() && !self.is_rejected()
    }
}

impl fmt::Debug for Response {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Response")
            .field("code", &self.code.to_string())
            .field("type", &self.message_type())
            .field("observe", &self.observe())
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
