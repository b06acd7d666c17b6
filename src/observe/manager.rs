//! Registry of all observe relations of a server.
//!
//! Relations are indexed by [`KeyToken`] and grouped per peer in
//! [`ObservingEndpoint`]s. Both maps allow lock-free reads; structural
//! changes (insert or displace, removal together with dropping an empty
//! endpoint) run under one manager-wide lock. Relations are never canceled
//! while that lock is held.

use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;

use super::Exchange;
use super::ObservableResource;
use super::ObserveHealth;
use super::ObserveRelation;
use super::ObservingEndpoint;
use super::Owner;
use crate::message::KeyToken;
use crate::utils::time::Clock;
use crate::utils::time::SystemClock;
use crate::ObserveConfig;
use crate::Result;

pub struct ObserveManager {
    endpoints: DashMap<SocketAddr, Arc<ObservingEndpoint>>,
    relations: DashMap<KeyToken, Arc<ObserveRelation>>,
    /// Serializes insert-or-displace and endpoint removal
    structure_lock: Mutex<()>,
    config: Option<Arc<ObserveConfig>>,
    max_relations: usize,
    health: Option<Arc<dyn ObserveHealth>>,
    clock: Arc<dyn Clock>,
}

#[derive(Default)]
pub struct ObserveManagerBuilder {
    config: Option<ObserveConfig>,
    health: Option<Arc<dyn ObserveHealth>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ObserveManagerBuilder {
    /// Manager level configuration, used by relations whose exchange has no
    /// endpoint configuration. Also provides `max_server_observes`.
    pub fn config(
        mut self,
        config: ObserveConfig,
    ) -> Self {
        self.config = Some(config);
        self
    }

    pub fn health(
        mut self,
        health: Arc<dyn ObserveHealth>,
    ) -> Self {
        self.health = Some(health);
        self
    }

    pub fn clock(
        mut self,
        clock: Arc<dyn Clock>,
    ) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Arc<ObserveManager> {
        let max_relations = self.config.as_ref().map_or(0, |c| c.max_server_observes);
        info!("Observe manager, max. {} relations (0 = unlimited)", max_relations);
        Arc::new(ObserveManager {
            endpoints: DashMap::new(),
            relations: DashMap::new(),
            structure_lock: Mutex::new(()),
            config: self.config.map(Arc::new),
            max_relations,
            health: self.health,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}

impl ObserveManager {
    pub fn builder() -> ObserveManagerBuilder {
        ObserveManagerBuilder::default()
    }

    pub fn new(config: ObserveConfig) -> Arc<Self> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> Option<Arc<ObserveConfig>> {
        self.config.clone()
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Creates and registers the observe relation for a registration request.
    ///
    /// An existing relation with the same key is replaced and canceled, even
    /// if the manager is full. A new key is not registered once the manager is
    /// full.
    ///
    /// # Returns
    /// The registered relation, `None` if the relation limit was reached.
    ///
    /// # Errors
    /// `InvalidArgument` if the relation can't be created.
    pub fn add_observe_relation(
        self: &Arc<Self>,
        exchange: Arc<dyn Exchange>,
        resource: Arc<dyn ObservableResource>,
    ) -> Result<Option<Arc<ObserveRelation>>> {
        let relation = ObserveRelation::new(Owner::Manager(self.clone()), resource, exchange)?;
        let key = relation.key().clone();

        let (added, previous) = {
            let _guard = self.structure_lock.lock();
            let previous = self.relations.get(&key).map(|r| r.value().clone());
            if previous.is_some() || !self.is_full() {
                let source = relation.source();
                let endpoint = self
                    .endpoints
                    .entry(source)
                    .or_insert_with(|| Arc::new(ObservingEndpoint::new(source)))
                    .value()
                    .clone();
                relation.set_endpoint(endpoint)?;
                self.relations.insert(key.clone(), relation.clone());
                (true, previous)
            } else {
                (false, None)
            }
        };

        if let Some(previous) = previous {
            debug!("Replacing observe relation {} with {:?}", key, relation.id());
            previous.cancel();
        }
        if !added {
            debug!(
                "Observe relation {} not registered, limit of {} relations reached",
                key, self.max_relations
            );
        }
        if let Some(health) = &self.health {
            health.receiving_observe_relation();
            health.set_observe_relations(self.relations.len());
            health.set_observe_endpoints(self.endpoints.len());
        }
        Ok(added.then_some(relation))
    }

    /// Cancels the relation the deregistration request of `exchange` refers
    /// to, if any.
    pub fn cancel_observe_relation(
        &self,
        exchange: &dyn Exchange,
    ) {
        let relation = ObserveRelation::key_token(exchange)
            .and_then(|key| self.relations.get(&key).map(|r| r.value().clone()));
        if let Some(relation) = relation {
            relation.cancel();
        }
        if let Some(health) = &self.health {
            health.receiving_cancel_request();
        }
    }

    /// A notification of `relation` was rejected by the peer.
    pub fn on_rejected_notification(
        &self,
        relation: &Arc<ObserveRelation>,
    ) {
        if let Some(health) = &self.health {
            health.receiving_reject();
        }
        relation.cancel();
    }

    /// Removes exactly `relation` from the registry, and its endpoint once the
    /// endpoint has no relations left.
    pub fn remove_observe_relation(
        &self,
        relation: &ObserveRelation,
    ) {
        // Waits for an insert in progress, so a relation canceled while it
        // was being registered is removed after its insert.
        let change = {
            let _guard = self.structure_lock.lock();
            let mut change = self
                .relations
                .remove_if(relation.key(), |_, r| r.id() == relation.id())
                .is_some();
            if let Some(endpoint) = relation.endpoint() {
                endpoint.remove_observe_relation(relation);
                if endpoint.is_empty()
                    && self
                        .endpoints
                        .remove_if(&endpoint.address(), |_, e| Arc::ptr_eq(e, endpoint))
                        .is_some()
                {
                    change = true;
                }
            }
            change
        };

        if change {
            if let Some(health) = &self.health {
                health.set_observe_relations(self.relations.len());
                health.set_observe_endpoints(self.endpoints.len());
            }
        }
    }

    /// `true` if a relation limit is configured and reached.
    pub fn is_full(&self) -> bool {
        self.max_relations > 0 && self.relations.len() >= self.max_relations
    }

    pub fn max_relations(&self) -> usize {
        self.max_relations
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn get_relation(
        &self,
        key: &KeyToken,
    ) -> Option<Arc<ObserveRelation>> {
        self.relations.get(key).map(|r| r.value().clone())
    }

    pub fn get_endpoint(
        &self,
        address: &SocketAddr,
    ) -> Option<Arc<ObservingEndpoint>> {
        self.endpoints.get(address).map(|e| e.value().clone())
    }
}
