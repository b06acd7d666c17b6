//! Fakes and builders shared by the unit tests.
mod mock;

pub use mock::*;

use std::sync::Arc;

use crate::message::EndpointContext;
use crate::message::MessageType;
use crate::message::Request;
use crate::message::Response;
use crate::message::ResponseCode;
use crate::message::Token;
use crate::ObserveConfig;

pub fn test_config(
    check_count: u32,
    check_interval_ms: u64,
    max_relations: usize,
) -> ObserveConfig {
    ObserveConfig {
        notification_check_interval_time_in_ms: check_interval_ms,
        notification_check_interval_count: check_count,
        max_server_observes: max_relations,
    }
}

/// Registration request received from `peer` with `token`.
pub fn register_request(
    peer: &str,
    token: &[u8],
    message_type: MessageType,
) -> Request {
    let peer = peer.parse().expect("valid socket address");
    Request::observe_register(message_type)
        .with_mid(1)
        .with_token(Token::new(token.to_vec()))
        .with_source_context(Arc::new(EndpointContext::new(peer)))
}

/// Exchange of a NON registration request, relying on the manager's config.
pub fn relation_exchange(
    peer: &str,
    token: &[u8],
) -> Arc<TestExchange> {
    Arc::new(TestExchange::new(register_request(
        peer,
        token,
        MessageType::NonConfirmable,
    )))
}

pub fn success_response() -> Arc<Response> {
    Arc::new(Response::new(ResponseCode::Content))
}

/// CON notification as the transport sends it.
pub fn con_notification(seqnum: u32) -> Arc<Response> {
    let response = Response::new(ResponseCode::Content).with_type(MessageType::Confirmable);
    response.set_observe(seqnum);
    Arc::new(response)
}
