use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;

use crate::message::MessageType;
use crate::message::Request;
use crate::utils::time::Clock;
use crate::Exchange;
use crate::ObservableResource;
use crate::ObserveConfig;
use crate::ObserveRelation;

/// Exchange recording the calls of the observe core.
pub struct TestExchange {
    request: Request,
    config: Option<Arc<ObserveConfig>>,
    relation: Mutex<Option<Weak<ObserveRelation>>>,
    pub retransmits: AtomicUsize,
    pub completes: AtomicUsize,
}

impl TestExchange {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            config: None,
            relation: Mutex::new(None),
            retransmits: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
        }
    }

    pub fn with_config(
        mut self,
        config: ObserveConfig,
    ) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    pub fn relation(&self) -> Option<Arc<ObserveRelation>> {
        self.relation.lock().as_ref().and_then(Weak::upgrade)
    }

    pub fn retransmit_count(&self) -> usize {
        self.retransmits.load(Ordering::SeqCst)
    }

    pub fn complete_count(&self) -> usize {
        self.completes.load(Ordering::SeqCst)
    }
}

impl Exchange for TestExchange {
    fn request(&self) -> &Request {
        &self.request
    }

    fn endpoint_config(&self) -> Option<Arc<ObserveConfig>> {
        self.config.clone()
    }

    fn set_relation(
        &self,
        relation: Arc<ObserveRelation>,
    ) {
        *self.relation.lock() = Some(Arc::downgrade(&relation));
    }

    fn retransmit_response(&self) {
        self.retransmits.fetch_add(1, Ordering::SeqCst);
    }

    fn execute_complete(&self) {
        self.completes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Resource keeping its relations like a real observable resource.
pub struct TestResource {
    uri: String,
    observe_type: Mutex<Option<MessageType>>,
    sequence: AtomicU32,
    relations: Mutex<Vec<Arc<ObserveRelation>>>,
    pub added: AtomicUsize,
    pub removed: AtomicUsize,
}

impl TestResource {
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            observe_type: Mutex::new(None),
            sequence: AtomicU32::new(2),
            relations: Mutex::new(Vec::new()),
            added: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
        }
    }

    pub fn with_observe_type(
        self,
        observe_type: MessageType,
    ) -> Self {
        *self.observe_type.lock() = Some(observe_type);
        self
    }

    /// Simulates a state change of the resource.
    pub fn changed(&self) -> u32 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn relation_count(&self) -> usize {
        self.relations.lock().len()
    }

    pub fn added_count(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }

    pub fn removed_count(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }
}

impl ObservableResource for TestResource {
    fn observe_type(&self) -> Option<MessageType> {
        *self.observe_type.lock()
    }

    fn notification_sequence_number(&self) -> u32 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn add_observe_relation(
        &self,
        relation: Arc<ObserveRelation>,
    ) {
        self.added.fetch_add(1, Ordering::SeqCst);
        self.relations.lock().push(relation);
    }

    fn remove_observe_relation(
        &self,
        relation: &Arc<ObserveRelation>,
    ) {
        self.removed.fetch_add(1, Ordering::SeqCst);
        self.relations.lock().retain(|r| r.id() != relation.id());
    }

    fn uri(&self) -> String {
        self.uri.clone()
    }
}

/// Clock advanced by hand.
#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn advance(
        &self,
        duration: Duration,
    ) {
        self.now.fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
