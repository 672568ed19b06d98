//! Dialog lifecycle management.
//!
//! `DialogManager` owns the single child-window slot of a parent panel:
//! it opens the window through the platform, lends the handle to the bus
//! for outbound routing, and tears everything down when the platform
//! reports a lifecycle event or the dialog is closed programmatically.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::bus::MessageBus;
use crate::lock;
use crate::platform::{ChildWindow, WindowOpener};

mod handlers;
mod lifecycle;
mod types;


pub use types::{DialogOptions, DialogState};

/// Slot contents. `generation` identifies the open cycle that produced the
/// current `Opening`/`Open` state.
pub(crate) struct Slot {
    pub(crate) state: SlotState,
    pub(crate) generation: u64,
}

pub(crate) enum SlotState {
    Closed,
    Opening,
    Open(Arc<dyn ChildWindow>),
}

pub(crate) struct ManagerInner {
    pub(crate) bus: Arc<MessageBus>,
    pub(crate) opener: Arc<dyn WindowOpener>,
    pub(crate) slot: Mutex<Slot>,
}

/// Owner of the at-most-one child window. Clones share the same slot.
#[derive(Clone)]
pub struct DialogManager {
    pub(crate) inner: Arc<ManagerInner>,
}

impl DialogManager {
    pub fn new(bus: Arc<MessageBus>, opener: Arc<dyn WindowOpener>) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                bus,
                opener,
                slot: Mutex::new(Slot {
                    state: SlotState::Closed,
                    generation: 0,
                }),
            }),
        }
    }

    pub fn state(&self) -> DialogState {
        match lock(&self.inner.slot).state {
            SlotState::Closed => DialogState::Closed,
            SlotState::Opening => DialogState::Opening,
            SlotState::Open(_) => DialogState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == DialogState::Open
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.inner.bus
    }

    /// Number of open cycles started so far.
    pub fn generation(&self) -> u64 {
        lock(&self.inner.slot).generation
    }
}

impl fmt::Debug for DialogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogManager")
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish()
    }
}
