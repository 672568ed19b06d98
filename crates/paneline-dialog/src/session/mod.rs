//! The ready / initialize / update handshake.
//!
//! Parent side ([`DialogSession`]): stage the payload, open the dialog, and
//! answer the child's `ready` with `initialize`. Later payloads go out as
//! `update`, but never before `initialize` in the same open cycle.
//!
//! Child side ([`ChildSession`]): resolve the launch payload, announce
//! `ready` once, and track what the view should show.

use std::fmt;

use serde_json::Value;

mod child;
mod parent;


pub use child::ChildSession;
pub use parent::DialogSession;

/// Parent-side progress of the current open cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Dialog opened (or opening); the child has not said `ready` yet.
    AwaitingReady,
    /// `initialize` went out; further payloads are sent as `update`.
    DataSent,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::AwaitingReady => f.write_str("awaiting ready"),
            HandshakeState::DataSent => f.write_str("data sent"),
        }
    }
}

/// What [`DialogSession::update`] did with a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Published to the child as `update`.
    Sent,
    /// Held back; the pending `initialize` will carry it.
    Deferred,
    /// Another message to the child was still being published; this one
    /// goes out as `update` right after it.
    Queued,
}

/// What a child view should currently render.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildViewState {
    /// Waiting for the parent to send data.
    Loading,
    /// `revision` is 0 for the first payload applied (usually the launch
    /// payload) and increments with each later one.
    Loaded { payload: Value, revision: u64 },
    /// The launch payload could not be obtained. Terminal.
    Failed(String),
    /// Nothing arrived within the wait window. Recovers on a later payload.
    TimedOut,
}

impl ChildViewState {
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ChildViewState::Loaded { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ChildViewState::Loaded { .. })
    }
}
