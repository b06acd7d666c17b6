use std::collections::HashMap;
use std::sync::Arc;

use super::*;
use crate::message::EndpointContext;
use crate::message::MessageType;
use crate::message::Request;
use crate::message::RequestCode;
use crate::message::Token;
use crate::Error;
use crate::ObserveError;

fn context() -> Arc<EndpointContext> {
    Arc::new(EndpointContext::new("10.0.0.1:5684".parse().unwrap()).with_virtual_host("sensor.local"))
}

#[test]
fn test_observation_requires_register_marker() {
    let request = Arc::new(Request::new(RequestCode::Get, MessageType::Confirmable));
    let result = Observation::new(request, context());
    assert!(matches!(
        result,
        Err(Error::Observe(ObserveError::InvalidArgument(_)))
    ));

    let mut cancel = Request::new(RequestCode::Get, MessageType::Confirmable);
    cancel.options_mut().set_observe(crate::OBSERVE_CANCEL);
    assert!(Observation::new(Arc::new(cancel), context()).is_err());

    let register = Arc::new(Request::observe_register(MessageType::Confirmable));
    assert!(Observation::new(register, context()).is_ok());
}

#[test]
fn test_shallow_clone_copies_request_fields() {
    let mut user_context = HashMap::new();
    user_context.insert("endpoint".to_string(), "client-1".to_string());
    let user_context = Arc::new(user_context);

    let mut request = Request::observe_register(MessageType::NonConfirmable)
        .with_mid(4711)
        .with_token(Token::new(vec![0xCA, 0xFE]))
        .with_unintended_payload()
        .with_payload(b"{}".to_vec())
        .with_user_context(user_context.clone())
        .with_max_resource_body_size(8192)
        .with_destination_context(context());
    request
        .options_mut()
        .set_uri_path("/3303/0/5700")
        .add_uri_query("ep=client-1")
        .set_accept(50)
        .set_content_format(110)
        .set_max_age(60)
        .add_etag(vec![0x01u8, 0x02]);
    let original = Observation::new(Arc::new(request), context()).unwrap();

    let clone = ObservationUtil::shallow_clone(&original);
    let (a, b) = (original.request(), clone.request());

    assert!(!Arc::ptr_eq(a, b));
    assert_eq!(b.code(), RequestCode::Get);
    assert_eq!(b.message_type(), MessageType::NonConfirmable);
    assert_eq!(b.mid(), Some(4711));
    assert_eq!(b.token(), a.token());
    assert_eq!(b.options(), a.options());
    assert_eq!(b.options().uri_query(), &["ep=client-1"]);
    assert_eq!(b.options().content_format(), Some(110));
    assert_eq!(b.options().max_age(), Some(60));
    assert_eq!(b.options().etags(), &[vec![0x01u8, 0x02]]);
    assert!(b.is_unintended_payload());
    assert!(Arc::ptr_eq(b.payload(), a.payload()));
    assert!(Arc::ptr_eq(b.user_context().unwrap(), &user_context));
    assert_eq!(b.max_resource_body_size(), 8192);
    assert_eq!(b.destination_context(), a.destination_context());
    assert!(Arc::ptr_eq(clone.context(), original.context()));
}

#[test]
fn test_shallow_clone_leaves_original_untouched() {
    let original = Observation::new(
        Arc::new(Request::observe_register(MessageType::Confirmable)),
        context(),
    )
    .unwrap();

    let clone = ObservationUtil::shallow_clone(&original);

    assert!(original.request().mid().is_none());
    assert!(clone.request().mid().is_none());
    assert!(!clone.request().is_unintended_payload());
    assert!(clone.request().options().is_observe_register());
}
