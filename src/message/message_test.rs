use std::net::SocketAddr;
use std::sync::Arc;

use super::*;

fn peer() -> SocketAddr {
    "192.168.0.10:5683".parse().unwrap()
}

#[test]
fn test_set_observe_truncates_to_24_bits() {
    let mut options = OptionSet::new();
    options.set_observe(0x0100_0005);

    assert_eq!(options.observe(), Some(5));
}

#[test]
fn test_uri_path_is_split_into_segments() {
    let mut options = OptionSet::new();
    options.set_uri_path("/3/0/1");

    assert_eq!(options.uri_path(), &["3", "0", "1"]);
    assert_eq!(options.uri_path_string(), "3/0/1");
}

#[test]
fn test_observe_register_request_carries_marker() {
    let request = Request::observe_register(MessageType::Confirmable);

    assert!(request.options().is_observe_register());
    assert_eq!(request.code(), RequestCode::Get);
    assert!(request.is_confirmable());
}

#[test]
fn test_key_token_requires_source_context() {
    let request = Request::observe_register(MessageType::NonConfirmable).with_token(Token::new(vec![1, 2]));
    assert!(request.key_token().is_none());

    let request = request.with_source_context(Arc::new(EndpointContext::new(peer())));
    let key = request.key_token().unwrap();
    assert_eq!(key.peer(), peer());
    assert_eq!(key.token().as_bytes(), &[1, 2]);
    assert_eq!(key.to_string(), "0102@192.168.0.10:5683");
}

#[test]
fn test_response_success_classes() {
    assert!(ResponseCode::Content.is_success());
    assert!(ResponseCode::Changed.is_success());
    assert!(!ResponseCode::NotFound.is_success());
    assert!(!ResponseCode::InternalServerError.is_success());
    assert_eq!(ResponseCode::Content.to_string(), "2.05");
    assert_eq!(ResponseCode::NotFound.to_string(), "4.04");
}

#[test]
fn test_response_notification_follows_observe_option() {
    let response = Response::new(ResponseCode::Content);
    assert!(!response.is_notification());

    response.set_observe(7);
    assert!(response.is_notification());
    assert_eq!(response.observe(), Some(7));

    response.remove_observe();
    assert!(!response.is_notification());
}

#[test]
fn test_response_in_transit_only_for_unfinished_con() {
    let response = Response::new(ResponseCode::Content);
    assert!(!response.is_in_transit());

    response.set_type(MessageType::NonConfirmable);
    assert!(!response.is_in_transit());

    response.set_type(MessageType::Confirmable);
    assert!(response.is_in_transit());

    response.set_acknowledged(true);
    assert!(!response.is_in_transit());

    response.set_acknowledged(false);
    response.set_timed_out(true);
    assert!(!response.is_in_transit());

    response.set_timed_out(false);
    response.set_rejected(true);
    assert!(!response.is_in_transit());
}

#[test]
fn test_response_update_options_is_visible_in_snapshot() {
    let response = Response::new(ResponseCode::Content);
    response.set_observe(3);

    let max_age = response.update_options(|options| {
        options.set_content_format(60).set_max_age(30).add_etag(vec![0xEEu8]);
        options.max_age()
    });

    assert_eq!(max_age, Some(30));
    let options = response.options();
    assert_eq!(options.content_format(), Some(60));
    assert_eq!(options.etags(), &[vec![0xEEu8]]);
    assert_eq!(options.observe(), Some(3));
}
