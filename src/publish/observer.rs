use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::publish::CapabilitySet;

/// An object that can be registered with a [`Publisher`](crate::Publisher).
///
/// The capabilities are enumerated once per registration; an observer that starts
/// implementing more capabilities later must re-subscribe to expose them.
pub trait Observer: Send + Sync + 'static {
    /// Capability views this observer offers (see [`capabilities!`](crate::capabilities)).
    fn capabilities(this: &Arc<Self>) -> CapabilitySet
    where
        Self: Sized;
}

/// Identity of a registered observer (its allocation), as seen by subscription hooks.
///
/// Ids compare by address. The registry drops entries of dead observers before
/// comparing, so a reused address is never mistaken for an old registration.
#[derive(Clone)]
pub struct ObserverId {
    addr: usize,
    type_name: &'static str,
    anchor: Weak<dyn Any + Send + Sync>,
}

impl ObserverId {
    pub(crate) fn of<O: Observer>(observer: &Arc<O>) -> Self {
        let strong = Arc::clone(observer);
        let strong: Arc<dyn Any + Send + Sync> = strong;
        let anchor: Weak<dyn Any + Send + Sync> = Arc::downgrade(&strong);
        Self {
            addr: Arc::as_ptr(observer) as *const () as usize,
            type_name: std::any::type_name::<O>(),
            anchor,
        }
    }

    /// Type name of the observer.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True while the observer is still alive.
    pub fn is_alive(&self) -> bool {
        self.anchor.strong_count() > 0
    }
}

impl PartialEq for ObserverId {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for ObserverId {}

impl Hash for ObserverId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.type_name, self.addr)
    }
}
