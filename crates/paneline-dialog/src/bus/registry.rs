use std::collections::HashMap;
use std::sync::Arc;

use crate::envelope::{Envelope, MessageKind};

/// Callback invoked with every envelope of the kind it was registered for.
pub type Listener = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Identity of one registration. Registering the same closure twice yields
/// two identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Per-kind listeners in registration order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    by_kind: HashMap<MessageKind, Vec<(ListenerId, Listener)>>,
}

impl ListenerRegistry {
    pub(crate) fn insert(&mut self, kind: MessageKind, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_kind.entry(kind).or_default().push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, kind: MessageKind, id: ListenerId) -> bool {
        let Some(listeners) = self.by_kind.get_mut(&kind) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.by_kind.remove(&kind);
        }
        removed
    }

    pub(crate) fn contains(&self, kind: MessageKind, id: ListenerId) -> bool {
        self.by_kind
            .get(&kind)
            .is_some_and(|listeners| listeners.iter().any(|(existing, _)| *existing == id))
    }

    /// Clone out the current listeners so they can run without the lock.
    pub(crate) fn snapshot(&self, kind: MessageKind) -> Vec<(ListenerId, Listener)> {
        self.by_kind.get(&kind).cloned().unwrap_or_default()
    }

    pub(crate) fn count(&self, kind: MessageKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }
}
