//! # Subscription registry: capability → ordered observer entries.
//!
//! ```text
//! HashMap<CapabilityId, Vec<Entry>>
//!   dyn Ping ─► [ S1(Weak<dyn Ping>), S2(Weak<dyn Ping>) ]    (registration order)
//!   dyn Pong ─► [ S2(Weak<dyn Pong>) ]
//! ```
//!
//! ## Rules
//! - An observer appears at most once per capability; re-registering replaces the
//!   entry in place (it keeps its position).
//! - Entries whose observer was dropped are pruned on every mutation and snapshot.
//! - The registry never calls user code; the publisher runs hooks and deliveries
//!   after releasing the lock.

use std::collections::HashMap;
use std::sync::Arc;

use crate::publish::{CapabilityId, ObserverId};
use crate::publish::capability::CapabilityView;

struct Entry {
    observer: ObserverId,
    view: CapabilityView,
}

#[derive(Default)]
pub(crate) struct Registry {
    by_capability: HashMap<CapabilityId, Vec<Entry>>,
}

impl Registry {
    /// Registers `view` for `observer`. Returns `true` if it replaced an existing entry.
    pub(crate) fn insert(&mut self, observer: &ObserverId, view: CapabilityView) -> bool {
        let entries = self.by_capability.entry(view.id).or_default();
        entries.retain(|e| e.observer.is_alive());

        match entries.iter_mut().find(|e| e.observer == *observer) {
            Some(entry) => {
                entry.view = view;
                true
            }
            None => {
                entries.push(Entry {
                    observer: observer.clone(),
                    view,
                });
                false
            }
        }
    }

    /// Removes `observer` from every capability; returns the capabilities it was removed from.
    pub(crate) fn remove_observer(&mut self, observer: &ObserverId) -> Vec<CapabilityId> {
        let mut removed = Vec::new();
        for (id, entries) in self.by_capability.iter_mut() {
            entries.retain(|e| e.observer.is_alive());
            let before = entries.len();
            entries.retain(|e| e.observer != *observer);
            if entries.len() != before {
                removed.push(*id);
            }
        }
        self.by_capability.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Removes `observer` from the capabilities not in `keep`.
    pub(crate) fn retain_for(&mut self, observer: &ObserverId, keep: &[CapabilityId]) {
        for (id, entries) in self.by_capability.iter_mut() {
            if !keep.contains(id) {
                entries.retain(|e| e.observer != *observer);
            }
        }
        self.by_capability.retain(|_, entries| !entries.is_empty());
    }

    /// Live observers of `C`, in registration order.
    pub(crate) fn snapshot<C>(&mut self) -> Vec<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let id = CapabilityId::of::<C>();
        let Some(entries) = self.by_capability.get_mut(&id) else {
            return Vec::new();
        };
        entries.retain(|e| e.observer.is_alive());
        entries.iter().filter_map(|e| e.view.upgrade::<C>()).collect()
    }

    pub(crate) fn count(&self, id: CapabilityId) -> usize {
        self.by_capability
            .get(&id)
            .map(|entries| entries.iter().filter(|e| e.observer.is_alive()).count())
            .unwrap_or(0)
    }

    pub(crate) fn contains(&self, observer: &ObserverId) -> bool {
        self.by_capability
            .values()
            .flatten()
            .any(|e| e.observer == *observer && e.observer.is_alive())
    }
}
