use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use paneline_common::{new_correlation_id, SessionId};
use paneline_config::schema::RepeatReadyPolicy;
use paneline_config::PanelineConfig;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bus::{Role, Subscription};
use crate::envelope::{Envelope, MessageKind};
use crate::error::{BusError, DialogError, SessionError};
use crate::lock;
use crate::manager::{DialogManager, DialogOptions, DialogState};
use crate::store::PayloadStore;
use crate::transport::{LaunchTarget, TransportSelector};

use super::{HandshakeState, UpdateOutcome};

/// One open → close span of the dialog.
struct Cycle {
    /// Short id used to correlate log lines of one cycle.
    id: String,
    state: HandshakeState,
    /// Latest payload; what `initialize` carries.
    payload: Value,
    staged: Option<SessionId>,
    /// Set while one thread is publishing to the child. Other senders queue
    /// into `outbox` so the child sees messages in order.
    sending: bool,
    outbox: VecDeque<Envelope>,
}

struct SessionInner {
    manager: DialogManager,
    transport: TransportSelector,
    store: Arc<dyn PayloadStore>,
    options: DialogOptions,
    repeat_ready: RepeatReadyPolicy,
    store_max_age: Duration,
    cycle: Mutex<Option<Cycle>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Parent side of the handshake for one dialog manager.
///
/// Clones share the same session.
#[derive(Clone)]
pub struct DialogSession {
    inner: Arc<SessionInner>,
}

impl DialogSession {
    /// Attach a session to `manager`, whose bus must be the parent side.
    pub fn new(
        manager: DialogManager,
        store: Arc<dyn PayloadStore>,
        config: &PanelineConfig,
    ) -> Result<Self, SessionError> {
        let bus = manager.bus().clone();
        if bus.role() != Role::Parent {
            return Err(BusError::WrongDirection {
                role: Role::Child,
                target: Role::Child,
            }
            .into());
        }

        let inner = Arc::new(SessionInner {
            manager,
            transport: TransportSelector::from_config(&config.transport),
            store,
            options: DialogOptions::from_config(&config.dialog),
            repeat_ready: config.handshake.repeat_ready,
            store_max_age: Duration::from_secs(u64::from(config.store.max_age_secs)),
            cycle: Mutex::new(None),
            subscriptions: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&inner);
        let ready = bus.listen(MessageKind::Ready, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.on_ready();
            }
        });
        let weak = Arc::downgrade(&inner);
        let closed = bus.listen(MessageKind::DialogClosed, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.on_closed();
            }
        });
        *lock(&inner.subscriptions) = vec![ready, closed];

        Ok(Self { inner })
    }

    /// Stage `payload` for `view` and open the dialog on it.
    ///
    /// Starts a fresh handshake cycle. If opening fails, the cycle is
    /// dropped and any staged store entry discarded.
    pub async fn open(&self, view: &str, payload: Value) -> Result<LaunchTarget, SessionError> {
        let inner = &self.inner;
        if inner.manager.state() != DialogState::Closed {
            warn!(view, "dialog already open; session open rejected");
            return Err(DialogError::AlreadyOpen.into());
        }

        match inner.store.reap_stale(inner.store_max_age) {
            Ok(0) => {}
            Ok(reaped) => debug!(reaped, "stale staged payloads removed"),
            Err(e) => warn!(error = %e, "failed to reap staged payloads"),
        }

        let target = inner
            .transport
            .stage(view, &payload, inner.store.as_ref())?;
        let staged = target.session_id().cloned();
        let id = new_correlation_id();
        {
            let mut cycle = lock(&inner.cycle);
            if cycle.is_some() {
                drop(cycle);
                inner.discard_staged(staged.as_ref());
                warn!(view, "handshake cycle already active; session open rejected");
                return Err(DialogError::AlreadyOpen.into());
            }
            *cycle = Some(Cycle {
                id: id.clone(),
                state: HandshakeState::AwaitingReady,
                payload,
                staged,
                sending: false,
                outbox: VecDeque::new(),
            });
        }

        // Drops the cycle if the open fails or this future is dropped.
        let mut guard = CycleGuard {
            inner,
            id: id.clone(),
            armed: true,
        };

        info!(view, cycle = %id, encoding = %target.encoding, "opening dialog session");
        inner.manager.open(&target.url, &inner.options).await?;
        guard.armed = false;

        Ok(target)
    }

    /// Deliver a new payload to the open dialog.
    ///
    /// Before the child is ready the payload replaces the one `initialize`
    /// will carry; afterwards it is sent as `update`. A payload that arrives
    /// while another message is still being published is queued behind it.
    pub fn update(&self, payload: Value) -> Result<UpdateOutcome, SessionError> {
        let (id, envelope) = {
            let mut guard = lock(&self.inner.cycle);
            let Some(cycle) = guard.as_mut() else {
                debug!("update with no open dialog session");
                return Err(SessionError::NotOpen);
            };
            if cycle.sending {
                cycle.payload = payload.clone();
                cycle.outbox.push_back(Envelope::Update(payload));
                debug!(cycle = %cycle.id, queued = cycle.outbox.len(), "update queued");
                return Ok(UpdateOutcome::Queued);
            }
            if cycle.state == HandshakeState::AwaitingReady {
                cycle.payload = payload;
                debug!(cycle = %cycle.id, "child not ready; update deferred to initialize");
                return Ok(UpdateOutcome::Deferred);
            }
            cycle.payload = payload.clone();
            cycle.sending = true;
            (cycle.id.clone(), Envelope::Update(payload))
        };

        self.inner.deliver(&id, envelope)?;
        debug!(cycle = %id, "update sent");
        Ok(UpdateOutcome::Sent)
    }

    /// Handshake progress of the current cycle, if one is open.
    pub fn handshake_state(&self) -> Option<HandshakeState> {
        lock(&self.inner.cycle).as_ref().map(|cycle| cycle.state)
    }

    pub fn is_open(&self) -> bool {
        lock(&self.inner.cycle).is_some()
    }

    pub fn manager(&self) -> &DialogManager {
        &self.inner.manager
    }

    /// Close the dialog from the parent side.
    pub fn close(&self) {
        self.inner.manager.close();
    }
}

impl fmt::Debug for DialogSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogSession")
            .field("dialog", &self.inner.manager.state())
            .field("handshake", &self.handshake_state())
            .finish()
    }
}

impl SessionInner {
    fn on_ready(&self) {
        let (id, envelope) = {
            let mut guard = lock(&self.cycle);
            let Some(cycle) = guard.as_mut() else {
                debug!("ready with no open dialog session dropped");
                return;
            };

            match (cycle.state, self.repeat_ready) {
                (HandshakeState::AwaitingReady, _) if cycle.sending => {
                    debug!(cycle = %cycle.id, "ready while initialize is in flight ignored");
                    return;
                }
                (HandshakeState::AwaitingReady, _) => {}
                (HandshakeState::DataSent, RepeatReadyPolicy::Resend) => {
                    debug!(cycle = %cycle.id, "repeated ready; re-sending initialize");
                }
                (HandshakeState::DataSent, RepeatReadyPolicy::Ignore) => {
                    debug!(cycle = %cycle.id, "repeated ready ignored");
                    return;
                }
            }

            let envelope = Envelope::Initialize(cycle.payload.clone());
            if cycle.sending {
                cycle.outbox.push_back(envelope);
                return;
            }
            cycle.sending = true;
            (cycle.id.clone(), envelope)
        };

        match self.deliver(&id, envelope) {
            Ok(()) => info!(cycle = %id, "child ready; initialize sent"),
            Err(e) => warn!(cycle = %id, error = %e, "failed to send initialize"),
        }
    }

    /// Publish `envelope` for cycle `id`, then drain whatever other senders
    /// queued meanwhile. The cycle lock is never held across a publish, so
    /// a host that calls back into the session from `message_child` cannot
    /// deadlock. Returns the result of publishing `envelope` itself.
    ///
    /// The caller must have set `sending` on the cycle.
    fn deliver(&self, id: &str, envelope: Envelope) -> Result<(), BusError> {
        let mut first: Option<Result<(), BusError>> = None;
        let mut next = envelope;
        loop {
            let result = self.manager.bus().publish_to_child(&next);

            let mut guard = lock(&self.cycle);
            let cycle = match guard.as_mut() {
                Some(cycle) if cycle.id == id => cycle,
                // Closed (or replaced) while publishing.
                _ => return first.unwrap_or(result),
            };
            match &result {
                Ok(()) => {
                    if matches!(next, Envelope::Initialize(_)) {
                        cycle.state = HandshakeState::DataSent;
                    }
                }
                Err(e) => {
                    if first.is_some() {
                        warn!(cycle = %id, kind = %next.kind(), error = %e, "queued message not delivered");
                    }
                    if cycle.state == HandshakeState::AwaitingReady {
                        // Nothing may follow a lost initialize; the next
                        // ready carries the latest payload instead.
                        cycle.outbox.clear();
                    }
                }
            }
            if first.is_none() {
                first = Some(result);
            }

            match cycle.outbox.pop_front() {
                Some(queued) => next = queued,
                None => {
                    cycle.sending = false;
                    return first.unwrap_or(Ok(()));
                }
            }
        }
    }

    fn on_closed(&self) {
        // Cleanup moves the manager to closed before broadcasting, so an
        // open manager means this did not come from a real close.
        if self.manager.is_open() {
            debug!("dialog_closed while the dialog is open ignored");
            return;
        }
        let Some(cycle) = lock(&self.cycle).take() else {
            return;
        };
        self.discard_staged(cycle.staged.as_ref());
        info!(cycle = %cycle.id, state = %cycle.state, "dialog session ended");
    }

    /// Drop the cycle `id` after a failed or abandoned open.
    fn abandon(&self, id: &str) {
        let cycle = {
            let mut guard = lock(&self.cycle);
            match guard.as_ref() {
                Some(cycle) if cycle.id == id => guard.take(),
                _ => None,
            }
        };
        if let Some(cycle) = cycle {
            self.discard_staged(cycle.staged.as_ref());
            debug!(cycle = %cycle.id, "dialog session open abandoned");
        }
    }

    fn discard_staged(&self, staged: Option<&SessionId>) {
        let Some(id) = staged else {
            return;
        };
        match self.store.discard(id) {
            Ok(true) => debug!(session_id = %id, "unclaimed staged payload discarded"),
            Ok(false) => {}
            Err(e) => warn!(session_id = %id, error = %e, "failed to discard staged payload"),
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        for subscription in lock(&self.subscriptions).drain(..) {
            subscription.unsubscribe();
        }
    }
}

struct CycleGuard<'a> {
    inner: &'a SessionInner,
    id: String,
    armed: bool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.abandon(&self.id);
        }
    }
}
