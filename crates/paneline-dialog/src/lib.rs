//! Cross-window dialog core for Paneline.
//!
//! Coordinates a parent panel with one isolated child window that can only
//! exchange UTF-8 strings over a platform channel:
//! - Typed message envelopes and a directional pub/sub bus
//! - Launch transport that inlines small payloads into the open URL and
//!   stages large ones in a shared store keyed by session id
//! - A single-child dialog lifecycle manager
//! - The ready / initialize / update handshake on both sides
//! - An in-process loopback platform for tooling and tests

pub mod bus;
pub mod envelope;
pub mod error;
pub mod events;
pub mod loopback;
pub mod manager;
pub mod platform;
pub mod session;
pub mod store;
pub mod transport;

pub use bus::{Dispatch, MessageBus, Role, Subscription};
pub use envelope::{Decoded, DropReason, Envelope, MessageKind};
pub use error::{BusError, DialogError, SessionError, StoreError, TransportError};
pub use events::LifecycleEvent;
pub use manager::{DialogManager, DialogOptions, DialogState};
pub use platform::{ChildWindow, HostProbe, ParentChannel, WindowOpener};
pub use session::{ChildSession, ChildViewState, DialogSession, HandshakeState, UpdateOutcome};
pub use store::{FilePayloadStore, MemoryPayloadStore, PayloadStore};
pub use transport::{LaunchEncoding, LaunchParams, LaunchTarget, PayloadSource, TransportSelector};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
