//! Directional publish/subscribe bus over the platform string channel.
//!
//! A process is either the parent panel or a child window, decided once
//! when the bus is built. Outbound publishing checks that role; inbound
//! strings enter through [`MessageBus::receive_raw`] and are dispatched
//! synchronously to the listeners registered for their kind.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, error, info, warn};

use crate::envelope::{Decoded, DropReason, Envelope, MessageKind};
use crate::error::BusError;
use crate::lock;
use crate::platform::{ChildWindow, HostProbe, ParentChannel};

mod registry;


pub use registry::{Listener, ListenerId};

use registry::ListenerRegistry;

/// Which side of the dialog this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Parent,
    Child,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Parent => f.write_str("parent"),
            Role::Child => f.write_str("child"),
        }
    }
}

enum Side {
    Parent {
        /// Outbound route, lent by the dialog manager while a child is open.
        child: Mutex<Option<Arc<dyn ChildWindow>>>,
    },
    Child {
        parent: Arc<dyn ParentChannel>,
    },
}

/// What [`MessageBus::receive_raw`] did with an inbound string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Delivered { kind: MessageKind, listeners: usize },
    Dropped(DropReason),
}

/// Handle returned by [`MessageBus::listen`]; removes exactly that
/// registration when [`Subscription::unsubscribe`] is called.
///
/// Dropping the handle keeps the listener registered.
pub struct Subscription {
    registry: Weak<Mutex<ListenerRegistry>>,
    kind: MessageKind,
    id: ListenerId,
}

impl Subscription {
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the registration. Returns false if it was already gone or the
    /// bus no longer exists.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => lock(&registry).remove(self.kind, self.id),
            None => false,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

/// Typed message bus for one side of a dialog.
pub struct MessageBus {
    side: Side,
    registry: Arc<Mutex<ListenerRegistry>>,
}

impl MessageBus {
    /// Probe the host once and build the bus for the detected role.
    pub fn detect(probe: &dyn HostProbe) -> Self {
        match probe.parent_channel() {
            Some(parent) => {
                info!("host parent messaging detected; running as child window");
                Self::child(parent)
            }
            None => {
                info!("no host parent messaging; running as parent panel");
                Self::parent()
            }
        }
    }

    pub fn parent() -> Self {
        Self {
            side: Side::Parent {
                child: Mutex::new(None),
            },
            registry: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    pub fn child(parent: Arc<dyn ParentChannel>) -> Self {
        Self {
            side: Side::Child { parent },
            registry: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    pub fn role(&self) -> Role {
        match self.side {
            Side::Parent { .. } => Role::Parent,
            Side::Child { .. } => Role::Child,
        }
    }

    // -- outbound routing ---------------------------------------------------

    /// Route `publish_to_child` through `handle`. Returns false on a child bus.
    pub fn attach_child(&self, handle: Arc<dyn ChildWindow>) -> bool {
        match &self.side {
            Side::Parent { child } => {
                *lock(child) = Some(handle);
                true
            }
            Side::Child { .. } => {
                warn!("attach_child called on a child-side bus; ignored");
                false
            }
        }
    }

    pub fn detach_child(&self) -> Option<Arc<dyn ChildWindow>> {
        match &self.side {
            Side::Parent { child } => lock(child).take(),
            Side::Child { .. } => None,
        }
    }

    pub fn has_child(&self) -> bool {
        match &self.side {
            Side::Parent { child } => lock(child).is_some(),
            Side::Child { .. } => false,
        }
    }

    // -- publishing ---------------------------------------------------------

    pub fn publish_to_child(&self, envelope: &Envelope) -> Result<(), BusError> {
        let child = match &self.side {
            Side::Parent { child } => lock(child).clone(),
            Side::Child { .. } => {
                warn!(kind = %envelope.kind(), "publish_to_child from a child window; dropped");
                return Err(BusError::WrongDirection {
                    role: Role::Child,
                    target: Role::Child,
                });
            }
        };
        let Some(child) = child else {
            debug!(kind = %envelope.kind(), "publish_to_child with no child window");
            return Err(BusError::NoChildWindow);
        };

        let raw = envelope.to_json();
        child.message_child(&raw).map_err(|e| {
            warn!(kind = %envelope.kind(), error = %e, "failed to message child");
            BusError::Platform(e)
        })?;
        debug!(kind = %envelope.kind(), bytes = raw.len(), "message sent to child");
        Ok(())
    }

    pub fn publish_to_parent(&self, envelope: &Envelope) -> Result<(), BusError> {
        let parent = match &self.side {
            Side::Child { parent } => parent,
            Side::Parent { .. } => {
                warn!(kind = %envelope.kind(), "publish_to_parent from the parent panel; dropped");
                return Err(BusError::WrongDirection {
                    role: Role::Parent,
                    target: Role::Parent,
                });
            }
        };

        let raw = envelope.to_json();
        parent.message_parent(&raw).map_err(|e| {
            warn!(kind = %envelope.kind(), error = %e, "failed to message parent");
            BusError::Platform(e)
        })?;
        debug!(kind = %envelope.kind(), bytes = raw.len(), "message sent to parent");
        Ok(())
    }

    // -- subscriptions ------------------------------------------------------

    pub fn listen<F>(&self, kind: MessageKind, callback: F) -> Subscription
    where
        F: Fn(&Envelope) + Send + Sync + 'static,
    {
        self.listen_arc(kind, Arc::new(callback))
    }

    /// Register an already shared listener. The same `Arc` may be
    /// registered several times and is then invoked once per registration.
    pub fn listen_arc(&self, kind: MessageKind, listener: Listener) -> Subscription {
        let id = lock(&self.registry).insert(kind, listener);
        debug!(%kind, listener = id.0, "listener registered");
        Subscription {
            registry: Arc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    pub fn listener_count(&self, kind: MessageKind) -> usize {
        lock(&self.registry).count(kind)
    }

    // -- inbound ------------------------------------------------------------

    /// Single entry point for strings arriving from the other side.
    ///
    /// Malformed input and unknown kinds are dropped without side effects.
    pub fn receive_raw(&self, raw: &str) -> Dispatch {
        let envelope = match Envelope::decode(raw) {
            Ok(Decoded::Known(envelope)) => envelope,
            Ok(Decoded::Unknown { kind }) => {
                debug!(kind = %kind, "inbound message of unknown kind dropped");
                return Dispatch::Dropped(DropReason::UnknownKind(kind));
            }
            Err(reason) => {
                debug!(%reason, bytes = raw.len(), "inbound message dropped");
                return Dispatch::Dropped(reason);
            }
        };

        let listeners = self.dispatch(&envelope);
        Dispatch::Delivered {
            kind: envelope.kind(),
            listeners,
        }
    }

    /// Deliver an envelope to local listeners only. Returns how many ran.
    pub fn broadcast(&self, envelope: &Envelope) -> usize {
        self.dispatch(envelope)
    }

    fn dispatch(&self, envelope: &Envelope) -> usize {
        let kind = envelope.kind();
        let snapshot = lock(&self.registry).snapshot(kind);
        let mut delivered = 0;

        for (id, listener) in snapshot {
            // An earlier listener may have unsubscribed this one.
            if !lock(&self.registry).contains(kind, id) {
                continue;
            }
            delivered += 1;
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(envelope))) {
                error!(
                    %kind,
                    listener = id.0,
                    reason = panic_message(panic.as_ref()),
                    "listener panicked; continuing delivery"
                );
            }
        }

        debug!(%kind, listeners = delivered, "message dispatched");
        delivered
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("role", &self.role())
            .field("has_child", &self.has_child())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
