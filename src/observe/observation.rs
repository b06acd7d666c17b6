use std::sync::Arc;

use crate::message::EndpointContext;
use crate::message::Request;
use crate::ObserveError;
use crate::Result;

/// A registration request paired with the endpoint context it was sent on.
#[derive(Debug, Clone)]
pub struct Observation {
    request: Arc<Request>,
    context: Arc<EndpointContext>,
}

impl Observation {
    /// # Errors
    /// `InvalidArgument` if `request` does not carry observe option `0`.
    pub fn new(
        request: Arc<Request>,
        context: Arc<EndpointContext>,
    ) -> Result<Self> {
        if !request.options().is_observe_register() {
            return Err(ObserveError::InvalidArgument(format!(
                "request has no observe registration option (observe: {:?})",
                request.options().observe()
            ))
            .into());
        }
        Ok(Self { request, context })
    }

    pub fn request(&self) -> &Arc<Request> {
        &self.request
    }

    pub fn context(&self) -> &Arc<EndpointContext> {
        &self.context
    }
}

pub struct ObservationUtil;

impl ObservationUtil {
    /// Creates an observation with a copy of the request, sharing payload,
    /// user context and endpoint contexts with the original.
    ///
    /// Used to run the registration request through the resource again
    /// without touching the original request.
    pub fn shallow_clone(observation: &Observation) -> Observation {
        let request = observation.request();
        let mut clone = Request::new(request.code(), request.message_type())
            .with_token(request.token().clone())
            .with_options(request.options().clone())
            .with_max_resource_body_size(request.max_resource_body_size());
        if let Some(destination) = request.destination_context() {
            clone = clone.with_destination_context(destination.clone());
        }
        if let Some(source) = request.source_context() {
            clone = clone.with_source_context(source.clone());
        }
        if request.is_unintended_payload() {
            clone = clone.with_unintended_payload();
        }
        clone = clone.with_payload(request.payload().clone());
        if let Some(mid) = request.mid() {
            clone = clone.with_mid(mid);
        }
        if let Some(user_context) = request.user_context() {
            clone = clone.with_user_context(user_context.clone());
        }

        Observation {
            request: Arc::new(clone),
            context: observation.context().clone(),
        }
    }
}
