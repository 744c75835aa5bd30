//! Process-wide table from native handle value to its live wrapper.
//!
//! Entries are weak, so the table never keeps a handle open. Dead entries are
//! pruned lazily on lookup and registration.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::handle::{IdInner, ObjectId};
use crate::sync::with_registry;
use crate::sys::hid_t;

#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<hid_t, Weak<IdInner>>,
}

impl Registry {
    /// Registered wrapper state for `id`, whatever its state.
    ///
    /// Returned as the raw `Arc` so the caller drops it after the registry borrow ends.
    pub(crate) fn lookup(&mut self, id: hid_t) -> Option<Arc<IdInner>> {
        let inner = self.entries.get(&id)?.upgrade();
        if inner.is_none() {
            self.entries.remove(&id);
        }
        inner
    }

    pub(crate) fn register(&mut self, id: hid_t, inner: &Arc<IdInner>) {
        if self.entries.len() > 64 && self.entries.len().is_power_of_two() {
            self.prune();
        }
        self.entries.insert(id, Arc::downgrade(inner));
    }

    /// Remove the entry for `id` if it belongs to `inner` (or is dead).
    pub(crate) fn unregister(&mut self, id: hid_t, inner: *const IdInner) {
        let owned = self
            .entries
            .get(&id)
            .is_some_and(|weak| weak.as_ptr() == inner || weak.strong_count() == 0);
        if owned {
            self.entries.remove(&id);
        }
    }

    pub(crate) fn prune(&mut self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
    }

    pub(crate) fn live_count(&self) -> usize {
        self.entries.values().filter(|weak| weak.strong_count() > 0).count()
    }
}

/// Number of live wrappers currently registered.
pub fn live_count() -> usize {
    with_registry(|registry| registry.live_count())
}

/// Registered wrapper for a raw handle value, if one is alive and open.
pub fn lookup(id: hid_t) -> Option<ObjectId> {
    with_registry(|registry| registry.lookup(id))
        .filter(|inner| inner.is_open())
        .map(ObjectId::from_inner)
}
