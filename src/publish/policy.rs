use crate::publish::{CapabilityId, ObserverId};

/// Decides which capabilities a [`Publisher`](crate::Publisher) accepts and
/// vets each registration.
///
/// Hooks run outside the registry lock and may call back into the publisher.
pub trait SubscriptionPolicy: Send + Sync + 'static {
    /// Capabilities this publisher broadcasts through.
    fn subscribe_keys(&self) -> Vec<CapabilityId>;

    /// Called once per candidate capability; `false` excludes that capability only.
    fn on_subscribe(&self, _observer: &ObserverId, _capability: CapabilityId) -> bool {
        true
    }

    /// Called once per removed capability. Advisory: `false` is logged, the removal stands.
    fn on_unsubscribe(&self, _observer: &ObserverId, _capability: CapabilityId) -> bool {
        true
    }
}

/// Policy accepting every observer for a fixed list of capabilities.
#[derive(Clone, Debug, Default)]
pub struct KeyList {
    keys: Vec<CapabilityId>,
}

impl KeyList {
    pub fn new(keys: Vec<CapabilityId>) -> Self {
        Self { keys }
    }

    /// Adds capability `C` to the list.
    pub fn with<C: ?Sized + 'static>(mut self) -> Self {
        let id = CapabilityId::of::<C>();
        if !self.keys.contains(&id) {
            self.keys.push(id);
        }
        self
    }
}

impl From<Vec<CapabilityId>> for KeyList {
    fn from(keys: Vec<CapabilityId>) -> Self {
        Self::new(keys)
    }
}

impl SubscriptionPolicy for KeyList {
    fn subscribe_keys(&self) -> Vec<CapabilityId> {
        self.keys.clone()
    }
}
