use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::ObserveRelation;
use crate::message::Token;

/// All observe relations of one remote peer.
pub struct ObservingEndpoint {
    address: SocketAddr,
    relations: RwLock<Vec<Arc<ObserveRelation>>>,
}

impl ObservingEndpoint {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            relations: RwLock::new(Vec::new()),
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn add_observe_relation(
        &self,
        relation: Arc<ObserveRelation>,
    ) {
        self.relations.write().push(relation);
    }

    /// Removes exactly `relation`; a newer relation with the same token stays.
    pub fn remove_observe_relation(
        &self,
        relation: &ObserveRelation,
    ) -> bool {
        let mut relations = self.relations.write();
        let before = relations.len();
        relations.retain(|r| r.id() != relation.id());
        before != relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.relations.read().len()
    }

    /// Most recently added relation for `token`.
    pub fn get_observe_relation(
        &self,
        token: &Token,
    ) -> Option<Arc<ObserveRelation>> {
        self.relations
            .read()
            .iter()
            .rev()
            .find(|r| r.key().token() == token)
            .cloned()
    }

    /// Cancels all relations of this peer.
    pub fn cancel_all(&self) {
        let relations: Vec<Arc<ObserveRelation>> = self.relations.read().clone();
        debug!("Canceling {} observe relations of {}", relations.len(), self.address);
        for relation in relations {
            relation.cancel();
        }
    }
}
