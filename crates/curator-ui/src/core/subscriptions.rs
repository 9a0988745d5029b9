//! Role-keyed handler registry.
//!
//! Binding a key that is already bound replaces the previous handler, so code
//! that re-runs after every partial re-render never stacks duplicates.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Handlers keyed by the role they serve.
pub struct Subscriptions<K, E> {
    handlers: BTreeMap<K, Rc<dyn Fn(&E)>>,
}

impl<K: Ord, E> Subscriptions<K, E> {
    /// Empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Bind `handler` under `key`. Returns `true` when an older handler was replaced.
    pub fn bind(&mut self, key: K, handler: impl Fn(&E) + 'static) -> bool {
        self.handlers.insert(key, Rc::new(handler)).is_some()
    }

    /// Remove the handler under `key`.
    pub fn unbind(&mut self, key: &K) -> bool {
        self.handlers.remove(key).is_some()
    }

    /// Deliver `event` to every handler in key order.
    pub fn emit(&self, event: &E) {
        for handler in self.handlers.values() {
            handler(event);
        }
    }

    /// Number of bound handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<K: Ord, E> Default for Subscriptions<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, E> fmt::Debug for Subscriptions<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("keys", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
