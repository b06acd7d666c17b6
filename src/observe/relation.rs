//! Observe relation state machine.
//!
//! A relation starts when a registration request is accepted, is established
//! with the first successful response and ends, once, when it is canceled.
//! Besides the lifecycle it owns two more concerns:
//!
//! - interest checks: every so often a NON notification is upgraded to CON to
//!   learn whether the client is still there;
//! - notification coalescing: while a CON notification is in flight, newer
//!   notifications are parked and only the latest one is sent afterwards.
//!
//! Lifecycle flags and interest-check bookkeeping share one lock, the
//! notification slots have their own. Neither lock is held while calling
//! into the resource, the endpoint, the manager or the exchange.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::Exchange;
use super::ObservableResource;
use super::ObserveManager;
use super::ObservingEndpoint;
use crate::message::KeyToken;
use crate::message::MessageType;
use crate::message::Response;
use crate::utils::time::Clock;
use crate::utils::time::SystemClock;
use crate::ObserveError;
use crate::Result;

static NEXT_RELATION_ID: AtomicU64 = AtomicU64::new(1);

/// State of an observe relation as seen by response processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationState {
    /// No observe relation.
    None,
    /// Observe request received, first response pending.
    Init,
    /// Observe request received, response/notification sent.
    Established,
    /// Observe relation canceled.
    Canceled,
}

impl fmt::Display for RelationState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            RelationState::None => "NONE",
            RelationState::Init => "INIT",
            RelationState::Established => "ESTABLISHED",
            RelationState::Canceled => "CANCELED",
        };
        f.write_str(name)
    }
}

/// Process unique identity of a relation.
///
/// Two relations for the same [`KeyToken`] (a re-registration) differ by id,
/// so removing the older one never removes its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(u64);

impl RelationId {
    fn next() -> Self {
        RelationId(NEXT_RELATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Who deregisters a canceled relation.
pub enum Owner {
    /// Relation registered in a manager.
    Manager(Arc<ObserveManager>),
    /// Relation tracked only by its endpoint, bound at construction.
    Endpoint(Arc<ObservingEndpoint>),
}

enum OwnerRef {
    Manager(Weak<ObserveManager>),
    Endpoint,
}

struct LifecycleState {
    established: bool,
    canceled: bool,
    interest_check_timer: u64,
    interest_check_counter: u32,
}

#[derive(Default)]
struct NotificationSlots {
    /// Last notification handed to the transport
    recent: Option<Arc<Response>>,
    /// Notification waiting for `recent` to leave transit
    next: Option<Arc<Response>>,
}

pub struct ObserveRelation {
    id: RelationId,
    owner: OwnerRef,
    resource: Arc<dyn ObservableResource>,
    exchange: Arc<dyn Exchange>,
    request_type: MessageType,
    source: SocketAddr,
    key: KeyToken,
    check_interval_time: u64,
    check_interval_count: u32,
    clock: Arc<dyn Clock>,
    endpoint: OnceLock<Arc<ObservingEndpoint>>,
    state: Mutex<LifecycleState>,
    notifications: Mutex<NotificationSlots>,
}

impl ObserveRelation {
    /// Creates a relation for the registration request of `exchange`.
    ///
    /// Interest-check parameters come from the exchange's endpoint
    /// configuration, or from the manager's if the exchange has none. A
    /// relation owned by an endpoint is bound to it right away; a manager
    /// binds its relations when registering them.
    ///
    /// # Errors
    /// `InvalidArgument` if the request was not received from a peer or no
    /// configuration is available.
    pub fn new(
        owner: Owner,
        resource: Arc<dyn ObservableResource>,
        exchange: Arc<dyn Exchange>,
    ) -> Result<Arc<Self>> {
        let request = exchange.request();
        let request_type = request.message_type();
        let key = request.key_token().ok_or_else(|| {
            ObserveError::InvalidArgument("observe request has no source context".to_string())
        })?;
        let source = key.peer();

        let (owner, manager_config, clock, endpoint) = match owner {
            Owner::Manager(manager) => (
                OwnerRef::Manager(Arc::downgrade(&manager)),
                manager.config(),
                manager.clock(),
                None,
            ),
            Owner::Endpoint(endpoint) => (
                OwnerRef::Endpoint,
                None,
                Arc::new(SystemClock) as Arc<dyn Clock>,
                Some(endpoint),
            ),
        };
        let config = exchange.endpoint_config().or(manager_config).ok_or_else(|| {
            ObserveError::InvalidArgument(
                "either the observe manager or the exchange must provide a configuration".to_string(),
            )
        })?;

        let check_interval_time =
            u64::try_from(config.check_interval_time().as_nanos()).unwrap_or(u64::MAX);
        let check_interval_count = config.notification_check_interval_count;
        debug!(
            "Observe-relation, checks every {}ns or {} notifications.",
            check_interval_time, check_interval_count
        );

        let relation = Arc::new(Self {
            id: RelationId::next(),
            owner,
            resource,
            exchange,
            request_type,
            source,
            key,
            check_interval_time,
            check_interval_count,
            state: Mutex::new(LifecycleState {
                established: false,
                canceled: false,
                interest_check_timer: clock.now_nanos(),
                interest_check_counter: 1,
            }),
            clock,
            endpoint: OnceLock::new(),
            notifications: Mutex::new(NotificationSlots::default()),
        });

        if let Some(endpoint) = endpoint {
            relation.set_endpoint(endpoint)?;
        }
        Ok(relation)
    }

    /// Binds the relation to the endpoint of its peer and marks the exchange
    /// as carrying it.
    ///
    /// # Errors
    /// Illegal state if the relation is already bound.
    pub fn set_endpoint(
        self: &Arc<Self>,
        endpoint: Arc<ObservingEndpoint>,
    ) -> Result<()> {
        if let Err(rejected) = self.endpoint.set(endpoint) {
            let address = self.endpoint.get().unwrap_or(&rejected).address();
            return Err(ObserveError::EndpointAlreadyBound {
                key: self.key.clone(),
                address,
            }
            .into());
        }
        if let Some(endpoint) = self.endpoint.get() {
            endpoint.add_observe_relation(self.clone());
        }
        self.exchange.set_relation(self.clone());
        Ok(())
    }

    pub fn id(&self) -> RelationId {
        self.id
    }

    /// Source address and token of the registration request.
    pub fn key(&self) -> &KeyToken {
        &self.key
    }

    pub fn source(&self) -> SocketAddr {
        self.source
    }

    pub fn request_type(&self) -> MessageType {
        self.request_type
    }

    pub fn exchange(&self) -> &Arc<dyn Exchange> {
        &self.exchange
    }

    pub fn resource(&self) -> &Arc<dyn ObservableResource> {
        &self.resource
    }

    pub fn endpoint(&self) -> Option<&Arc<ObservingEndpoint>> {
        self.endpoint.get()
    }

    pub fn is_established(&self) -> bool {
        self.state.lock().established
    }

    pub fn is_canceled(&self) -> bool {
        self.state.lock().canceled
    }

    /// Marks the relation as established.
    ///
    /// # Errors
    /// Illegal state if the relation was already canceled.
    pub fn set_established(&self) -> Result<()> {
        self.establish().map(|_| ())
    }

    /// Returns `true` if this call made the transition.
    fn establish(&self) -> Result<bool> {
        {
            let mut state = self.state.lock();
            if !state.canceled {
                let transition = !state.established;
                state.established = true;
                return Ok(transition);
            }
        }
        Err(ObserveError::AlreadyCanceled {
            key: self.key.clone(),
            uri: self.resource.uri(),
        }
        .into())
    }

    /// Type of the next notification.
    ///
    /// The resource's observe type, or the request type if the resource has
    /// none. A NON notification is upgraded to CON when [`Self::check`] asks
    /// for an interest check.
    pub fn observe_type(&self) -> MessageType {
        let observe_type = self.resource.observe_type().unwrap_or(self.request_type);
        if observe_type != MessageType::Confirmable && !self.check() {
            return MessageType::NonConfirmable;
        }
        MessageType::Confirmable
    }

    /// Returns `true` if the next notification should be sent as CON to check
    /// that the client is still interested.
    ///
    /// Fires every `notification_check_interval_count` notifications or after
    /// `notification_check_interval_time`, whichever comes first.
    pub fn check(&self) -> bool {
        let now = self.clock.now_nanos();
        let mut state = self.state.lock();

        state.interest_check_counter += 1;
        if state.interest_check_counter >= self.check_interval_count {
            state.interest_check_timer = now;
            state.interest_check_counter = 0;
            trace!(
                "Observe-relation check, {} notifications reached.",
                self.check_interval_count
            );
            return true;
        }

        if now.saturating_sub(state.interest_check_timer) > self.check_interval_time {
            state.interest_check_timer = now;
            state.interest_check_counter = 0;
            trace!(
                "Observe-relation check, {}s interval reached.",
                self.check_interval_time / 1_000_000_000
            );
            return true;
        }
        false
    }

    /// Processes a response of the observed resource for this relation.
    ///
    /// The first successful response establishes the relation and registers
    /// it with the resource. Successful responses of a live relation are
    /// validated by the resource, which stamps the notification sequence
    /// number.
    ///
    /// # Errors
    /// Illegal state if the relation was canceled while the first response
    /// was processed; the caller drops that response.
    pub fn handle_response(
        self: &Arc<Self>,
        response: &Response,
    ) -> Result<RelationState> {
        if self.is_canceled() {
            return Ok(RelationState::Canceled);
        }
        if !self.is_established() {
            let mut established = false;
            if response.is_success() {
                if !self.establish()? {
                    return Ok(self.on_established_response(response));
                }
                self.resource.add_observe_relation(self.clone());
                established = !self.is_canceled();
            }
            if !established {
                return Ok(RelationState::Canceled);
            }
            self.resource.validate_relation(self.exchange.as_ref(), response);
            return Ok(RelationState::Init);
        }
        Ok(self.on_established_response(response))
    }

    fn on_established_response(
        &self,
        response: &Response,
    ) -> RelationState {
        self.exchange.retransmit_response();
        if response.is_success() {
            self.resource.validate_relation(self.exchange.as_ref(), response);
        }
        RelationState::Established
    }

    /// Processes `response` with `relation`, if any.
    ///
    /// Removes the observe option from notifications that don't belong to a
    /// live relation, or that are unsuccessful, so a client never takes them
    /// for an active subscription.
    pub fn on_response(
        relation: Option<&Arc<ObserveRelation>>,
        response: &Response,
    ) -> Result<RelationState> {
        let result = match relation {
            Some(relation) => relation.handle_response(response),
            None => Ok(RelationState::None),
        };
        let live = matches!(
            result,
            Ok(RelationState::Init) | Ok(RelationState::Established)
        );
        if response.is_notification() && (!response.is_success() || !live) {
            warn!(
                "Application notification, not longer observing, remove observe-option {:?}",
                response
            );
            response.remove_observe();
        }
        result
    }

    /// Checks whether sending `response` is postponed.
    ///
    /// While the recent notification is still in transit, `response` is
    /// parked as next notification and `true` is returned; a parked
    /// notification it replaces is completed. A parked final response is
    /// never replaced. Otherwise `response` becomes the recent notification,
    /// [`Self::on_send`] is called and `false` is returned.
    pub fn is_postponed_notification(
        self: &Arc<Self>,
        response: &Arc<Response>,
    ) -> bool {
        let (postponed, replaced) = {
            let mut slots = self.notifications.lock();
            let in_transit = slots.recent.as_ref().is_some_and(|recent| recent.is_in_transit());
            if in_transit {
                trace!("in transit {:?}", slots.recent);
                match slots.next.take() {
                    Some(next) if !next.is_notification() => {
                        slots.next = Some(next);
                        (true, None)
                    }
                    replaced => {
                        slots.next = Some(response.clone());
                        (true, replaced)
                    }
                }
            } else {
                slots.recent = Some(response.clone());
                slots.next = None;
                (false, None)
            }
        };

        if let Some(replaced) = replaced {
            replaced.on_transfer_complete();
        }
        if !postponed {
            self.on_send(response);
        }
        postponed
    }

    /// Called when the transmission of `response` ends.
    ///
    /// If `response` is the recent notification, the parked notification is
    /// promoted, passed to [`Self::on_send`] and returned for sending. Without
    /// a parked notification an acknowledged relation becomes idle.
    ///
    /// # Arguments
    /// * `acknowledged` - `true` if `response` was acknowledged, `false` on
    ///   retransmission
    pub fn next_notification(
        self: &Arc<Self>,
        response: &Arc<Response>,
        acknowledged: bool,
    ) -> Option<Arc<Response>> {
        let next = {
            let mut slots = self.notifications.lock();
            let is_recent = slots.recent.as_ref().is_some_and(|recent| Arc::ptr_eq(recent, response));
            if !is_recent {
                return None;
            }
            match slots.next.take() {
                Some(next) => {
                    slots.recent = Some(next.clone());
                    Some(next)
                }
                None => {
                    if acknowledged {
                        slots.recent = None;
                    }
                    None
                }
            }
        };

        if let Some(next) = &next {
            self.on_send(next);
        }
        next
    }

    /// Called before `response` is sent for this relation.
    ///
    /// A response without observe option ends the relation; the exchange is
    /// left for the transport to complete.
    pub fn on_send(
        self: &Arc<Self>,
        response: &Response,
    ) {
        if !response.is_notification() {
            self.cancel_with(false);
        }
    }

    /// The peer rejected a notification.
    pub fn reject(self: &Arc<Self>) {
        match &self.owner {
            OwnerRef::Manager(manager) => match manager.upgrade() {
                Some(manager) => manager.on_rejected_notification(self),
                None => self.cancel(),
            },
            OwnerRef::Endpoint => self.cancel(),
        }
    }

    /// Cancels the relation and completes its exchange.
    ///
    /// Only the first call has an effect.
    pub fn cancel(self: &Arc<Self>) {
        self.cancel_with(true);
    }

    /// Cancels all relations of this relation's peer.
    pub fn cancel_all(&self) {
        if let Some(endpoint) = self.endpoint.get() {
            endpoint.cancel_all();
        }
    }

    fn cancel_with(
        self: &Arc<Self>,
        complete: bool,
    ) {
        let established = {
            let mut state = self.state.lock();
            if state.canceled {
                return;
            }
            state.canceled = true;
            std::mem::replace(&mut state.established, false)
        };

        debug!("Canceling observe relation {} with {}", self.key, self.resource.uri());
        if established {
            self.resource.remove_observe_relation(self);
        }
        match &self.owner {
            OwnerRef::Manager(manager) => match manager.upgrade() {
                Some(manager) => manager.remove_observe_relation(self),
                None => self.remove_from_endpoint(),
            },
            OwnerRef::Endpoint => self.remove_from_endpoint(),
        }
        if complete {
            self.exchange.execute_complete();
        }
    }

    fn remove_from_endpoint(&self) {
        if let Some(endpoint) = self.endpoint.get() {
            endpoint.remove_observe_relation(self);
        }
    }

    /// Key of the relation an observe or cancel request refers to.
    pub fn key_token(exchange: &dyn Exchange) -> Option<KeyToken> {
        exchange.request().key_token()
    }
}

impl fmt::Debug for ObserveRelation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ObserveRelation")
            .field("id", &self.id)
            .field("key", &self.key.to_string())
            .field("request_type", &self.request_type)
            .finish()
    }
}
