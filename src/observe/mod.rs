//! Server side CoAP observe relations.
//!
//! An [`ObserveRelation`] is created by the [`ObserveManager`] when a
//! registration request arrives, is grouped with the other relations of the
//! same peer in an [`ObservingEndpoint`], and decides for every response of
//! the observed resource whether it is sent, postponed behind a confirmable
//! notification still in flight, or whether the relation ends.
//!
//! The resource tree and the exchange/transport layer are collaborators
//! reached through the [`ObservableResource`] and [`Exchange`] traits.

mod endpoint;
mod manager;
mod observation;
mod order;
mod relation;
pub use endpoint::*;
pub use manager::*;
pub use observation::*;
pub use order::*;
pub use relation::*;

#[cfg(test)]
mod observation_test;
#[cfg(test)]
mod order_test;

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::message::MessageType;
use crate::message::Request;
use crate::message::Response;
use crate::ObserveConfig;

/// Resource that accepts observe relations.
pub trait ObservableResource: Send + Sync + 'static {
    /// Preferred type of notifications, `None` to follow the request type.
    fn observe_type(&self) -> Option<MessageType>;

    /// Current notification sequence number of this resource.
    fn notification_sequence_number(&self) -> u32;

    /// Called once the relation's first successful response is processed.
    fn add_observe_relation(
        &self,
        relation: Arc<ObserveRelation>,
    );

    /// Called when an established relation is canceled.
    fn remove_observe_relation(
        &self,
        relation: &Arc<ObserveRelation>,
    );

    /// Uri of the resource, for diagnostics.
    fn uri(&self) -> String;

    /// Prepares a successful response of a live relation.
    ///
    /// Stamps the current notification sequence number by default. Resources
    /// with their own relation bookkeeping override this.
    fn validate_relation(
        &self,
        _exchange: &dyn Exchange,
        response: &Response,
    ) {
        response.set_observe(self.notification_sequence_number());
    }
}

/// Request/response exchange of the transport layer that carried the
/// registration request.
pub trait Exchange: Send + Sync + 'static {
    /// The registration request.
    fn request(&self) -> &Request;

    /// Configuration of the endpoint the exchange belongs to, if any.
    /// Takes precedence over the manager's configuration.
    fn endpoint_config(&self) -> Option<Arc<ObserveConfig>>;

    /// Marks the exchange as carrying `relation`.
    fn set_relation(
        &self,
        relation: Arc<ObserveRelation>,
    );

    /// A newer response supersedes the one still pending for retransmission.
    fn retransmit_response(&self);

    /// Completes the exchange, stopping all retransmissions.
    fn execute_complete(&self);
}

/// Health side channel of the [`ObserveManager`], for monitoring only.
#[cfg_attr(test, automock)]
pub trait ObserveHealth: Send + Sync + 'static {
    /// A registration request was processed.
    fn receiving_observe_relation(&self);

    /// A deregistration request was processed.
    fn receiving_cancel_request(&self);

    /// A notification was rejected by the peer.
    fn receiving_reject(&self);

    fn set_observe_relations(
        &self,
        count: usize,
    );

    fn set_observe_endpoints(
        &self,
        count: usize,
    );
}
