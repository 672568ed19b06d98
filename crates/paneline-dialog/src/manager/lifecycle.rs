use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::envelope::Envelope;
use crate::error::DialogError;
use crate::lock;

use super::types::DialogOptions;
use super::{DialogManager, ManagerInner, Slot, SlotState};

impl DialogManager {
    /// Open the child window at `url`.
    ///
    /// Rejected with [`DialogError::AlreadyOpen`] unless the slot is closed,
    /// without touching the platform. A platform failure leaves the slot
    /// closed again and is returned unchanged.
    pub async fn open(&self, url: &str, options: &DialogOptions) -> Result<(), DialogError> {
        let generation = {
            let mut slot = lock(&self.inner.slot);
            if !matches!(slot.state, SlotState::Closed) {
                warn!(url, generation = slot.generation, "dialog already open; rejecting open");
                return Err(DialogError::AlreadyOpen);
            }
            slot.generation += 1;
            slot.state = SlotState::Opening;
            slot.generation
        };

        // Reverts `Opening` if the platform fails or this future is dropped.
        let mut guard = OpeningGuard {
            slot: &self.inner.slot,
            generation,
            armed: true,
        };

        info!(url, generation, "opening dialog");
        let handle = match self.inner.opener.open_window(url, options).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(url, code = e.code, error = %e, "platform failed to open dialog");
                return Err(DialogError::Platform(e));
            }
        };

        {
            let mut slot = lock(&self.inner.slot);
            slot.state = SlotState::Open(handle.clone());
            self.inner.bus.attach_child(handle.clone());
        }
        guard.armed = false;

        self.attach_handlers(&handle, generation);
        info!(url, generation, "dialog open");
        Ok(())
    }

    /// Close the dialog from the parent side. No-op unless open.
    pub fn close(&self) {
        let (handle, generation) = {
            let slot = lock(&self.inner.slot);
            match &slot.state {
                SlotState::Open(handle) => (handle.clone(), slot.generation),
                _ => {
                    debug!("close requested with no open dialog");
                    return;
                }
            }
        };

        info!(generation, "closing dialog");
        handle.close();
        self.inner.cleanup(generation);
    }
}

impl ManagerInner {
    /// Whether `generation` is the cycle currently holding an open window.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        let slot = lock(&self.slot);
        slot.generation == generation && matches!(slot.state, SlotState::Open(_))
    }

    /// Tear down the open cycle `generation`. Repeated or stale calls do
    /// nothing and return false.
    pub(crate) fn cleanup(&self, generation: u64) -> bool {
        {
            let mut slot = lock(&self.slot);
            if slot.generation != generation || !matches!(slot.state, SlotState::Open(_)) {
                debug!(
                    generation,
                    current = slot.generation,
                    "cleanup for a cycle that is no longer open ignored"
                );
                return false;
            }
            slot.state = SlotState::Closed;
            self.bus.detach_child();
        }

        let listeners = self.bus.broadcast(&Envelope::DialogClosed);
        info!(generation, listeners, "dialog closed");
        true
    }
}

struct OpeningGuard<'a> {
    slot: &'a Mutex<Slot>,
    generation: u64,
    armed: bool,
}

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slot = lock(self.slot);
        if slot.generation == self.generation && matches!(slot.state, SlotState::Opening) {
            slot.state = SlotState::Closed;
            debug!(generation = self.generation, "open abandoned; slot closed");
        }
    }
}
