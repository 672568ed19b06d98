use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bus::{MessageBus, Role, Subscription};
use crate::envelope::{Envelope, MessageKind};
use crate::error::{BusError, SessionError};
use crate::store::PayloadStore;
use crate::transport::LaunchParams;

use super::ChildViewState;

/// Child side of the handshake: what the view inside a dialog renders.
pub struct ChildSession {
    bus: Arc<MessageBus>,
    view: Option<String>,
    state: Arc<watch::Sender<ChildViewState>>,
    subscriptions: Vec<Subscription>,
}

impl ChildSession {
    /// Resolve the launch payload, start listening for parent data, and
    /// announce `ready`.
    ///
    /// A launch payload that cannot be obtained leaves the view `Failed`;
    /// no `ready` is sent in that case.
    pub fn boot(
        bus: Arc<MessageBus>,
        params: &LaunchParams,
        store: &dyn PayloadStore,
    ) -> Result<Self, SessionError> {
        if bus.role() != Role::Child {
            return Err(BusError::WrongDirection {
                role: Role::Parent,
                target: Role::Parent,
            }
            .into());
        }

        let initial = match params.resolve(store) {
            Ok(Some(payload)) => {
                debug!(view = ?params.view, "launch payload resolved");
                ChildViewState::Loaded {
                    payload,
                    revision: 0,
                }
            }
            Ok(None) => ChildViewState::Loading,
            Err(e) => {
                warn!(view = ?params.view, error = %e, "launch payload unavailable");
                ChildViewState::Failed(e.to_string())
            }
        };
        let failed = matches!(initial, ChildViewState::Failed(_));

        let (state, _) = watch::channel(initial);
        let mut session = Self {
            bus,
            view: params.view.clone(),
            state: Arc::new(state),
            subscriptions: Vec::new(),
        };
        if failed {
            return Ok(session);
        }

        for kind in [MessageKind::Initialize, MessageKind::Update] {
            let state = session.state.clone();
            let subscription = session
                .bus
                .listen(kind, move |envelope| apply_payload(&state, envelope));
            session.subscriptions.push(subscription);
        }

        match session.bus.publish_to_parent(&Envelope::Ready) {
            Ok(()) => info!(view = ?session.view, "child ready"),
            Err(e) => warn!(error = %e, "failed to announce ready"),
        }
        Ok(session)
    }

    /// Wait until the view has a payload.
    ///
    /// On timeout a still-loading view becomes `TimedOut`; it recovers if a
    /// payload arrives later.
    pub async fn wait_for_payload(&self, timeout: Duration) -> Result<Value, SessionError> {
        let mut rx = self.state.subscribe();
        let wait = async {
            loop {
                {
                    let current = rx.borrow_and_update();
                    match &*current {
                        ChildViewState::Loaded { payload, .. } => return Ok(payload.clone()),
                        ChildViewState::Failed(reason) => {
                            return Err(SessionError::LaunchFailed(reason.clone()))
                        }
                        ChildViewState::Loading | ChildViewState::TimedOut => {}
                    }
                }
                if rx.changed().await.is_err() {
                    return Err(SessionError::LaunchFailed("view state dropped".into()));
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => {
                self.state.send_if_modified(|state| {
                    if matches!(state, ChildViewState::Loading) {
                        *state = ChildViewState::TimedOut;
                        true
                    } else {
                        false
                    }
                });
                warn!(?timeout, view = ?self.view, "no payload from parent in time");
                Err(SessionError::ReadyTimeout(timeout))
            }
        }
    }

    pub fn state(&self) -> ChildViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChildViewState> {
        self.state.subscribe()
    }

    /// The `view` launch parameter, if any.
    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }
}

impl fmt::Debug for ChildSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildSession")
            .field("view", &self.view)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl Drop for ChildSession {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

/// Apply an `initialize` or `update` to the view. The first payload is
/// revision 0; each later one increments it.
fn apply_payload(state: &watch::Sender<ChildViewState>, envelope: &Envelope) {
    let kind = envelope.kind();
    let Some(payload) = envelope.payload() else {
        return;
    };
    state.send_if_modified(|current| {
        let revision = match current {
            ChildViewState::Failed(_) => {
                debug!(%kind, "payload after failed launch ignored");
                return false;
            }
            ChildViewState::Loaded { revision, .. } => *revision + 1,
            ChildViewState::Loading | ChildViewState::TimedOut => 0,
        };
        *current = ChildViewState::Loaded {
            payload: payload.clone(),
            revision,
        };
        debug!(%kind, revision, "view payload applied");
        true
    });
}
