//! Role-keyed DOM listeners.
//!
//! Elements inside the swapped region are replaced on every partial re-render,
//! so their listeners are re-attached each time. Keying by role means a rebind
//! drops (and unregisters) the previous listener instead of stacking another.

use std::collections::HashMap;

use gloo::events::EventListener;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: HashMap<&'static str, EventListener>,
}

impl ListenerRegistry {
    /// Attach `listener` under `role`. Returns `true` when an older listener was replaced.
    pub(crate) fn bind(&mut self, role: &'static str, listener: EventListener) -> bool {
        self.listeners.insert(role, listener).is_some()
    }

    pub(crate) fn unbind(&mut self, role: &'static str) -> bool {
        self.listeners.remove(role).is_some()
    }
}
