//! Platform callbacks installed on a freshly opened child window.
//!
//! Both handlers hold weak references and carry the open generation they
//! were installed for, so callbacks from a window that has since been
//! closed (or outlived its manager) are dropped.

use std::sync::{Arc, Weak};

use tracing::{debug, info, warn};

use crate::events::LifecycleEvent;
use crate::platform::ChildWindow;

use super::{DialogManager, ManagerInner};

impl DialogManager {
    pub(super) fn attach_handlers(&self, handle: &Arc<dyn ChildWindow>, generation: u64) {
        let inner = Arc::downgrade(&self.inner);
        handle.on_message(Box::new(move |raw| forward_message(&inner, generation, &raw)));

        let inner = Arc::downgrade(&self.inner);
        handle.on_event(Box::new(move |code| {
            if let Some(inner) = inner.upgrade() {
                inner.handle_lifecycle(generation, code);
            }
        }));
    }
}

fn forward_message(inner: &Weak<ManagerInner>, generation: u64, raw: &str) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    if !inner.is_current(generation) {
        debug!(generation, bytes = raw.len(), "message from a closed dialog dropped");
        return;
    }
    inner.bus.receive_raw(raw);
}

impl ManagerInner {
    pub(crate) fn handle_lifecycle(&self, generation: u64, code: i32) {
        let event = LifecycleEvent::from_code(code);
        if event.is_expected() {
            info!(code, generation, "{event}");
        } else {
            warn!(code, generation, "dialog lifecycle event: {event}; closing");
        }
        self.cleanup(generation);
    }
}
