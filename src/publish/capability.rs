//! # Capability identity and per-observer capability views.
//!
//! A capability is a trait (with `Send + Sync` supertraits) that observers implement
//! and publishers broadcast through. [`CapabilityId`] identifies one at runtime;
//! [`CapabilitySet`] carries the weak `dyn Capability` views of one observer.
//!
//! ```text
//! Arc<Logger> ──capabilities!──► CapabilitySet
//!                                   ├─ (CapabilityId::of::<dyn Ping>(), Weak<dyn Ping>)
//!                                   └─ (CapabilityId::of::<dyn Pong>(), Weak<dyn Pong>)
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Weak;

/// Runtime identifier of a capability trait.
///
/// Two ids are equal iff they name the same type; the name is informational.
#[derive(Clone, Copy)]
pub struct CapabilityId {
    type_id: TypeId,
    name: &'static str,
}

impl CapabilityId {
    /// Id of `C`, usually written `CapabilityId::of::<dyn MyTrait>()`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// Type name of the capability (for logs and errors).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One type-erased capability view: a boxed `Weak<C>`.
pub(crate) struct CapabilityView {
    pub(crate) id: CapabilityId,
    pub(crate) weak: Box<dyn Any + Send + Sync>,
}

impl CapabilityView {
    /// Upgrades the view if it is a live `Weak<C>`.
    pub(crate) fn upgrade<C>(&self) -> Option<std::sync::Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.weak.downcast_ref::<Weak<C>>().and_then(Weak::upgrade)
    }
}

/// The capability views one observer exposes.
///
/// Built once per registration by [`Observer::capabilities`](crate::Observer::capabilities),
/// usually via the [`capabilities!`](crate::capabilities) macro.
#[derive(Default)]
pub struct CapabilitySet {
    views: Vec<CapabilityView>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the view `weak` under capability `C`. A repeated capability replaces the earlier view.
    pub fn with<C>(mut self, weak: Weak<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let id = CapabilityId::of::<C>();
        let view = CapabilityView {
            id,
            weak: Box::new(weak),
        };
        match self.views.iter_mut().find(|v| v.id == id) {
            Some(slot) => *slot = view,
            None => self.views.push(view),
        }
        self
    }

    /// Ids of the declared capabilities, in declaration order.
    pub fn ids(&self) -> Vec<CapabilityId> {
        self.views.iter().map(|v| v.id).collect()
    }

    pub fn contains(&self, id: CapabilityId) -> bool {
        self.views.iter().any(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub(crate) fn into_views(self) -> Vec<CapabilityView> {
        self.views
    }
}

/// Builds a [`CapabilitySet`] from an `&Arc<Observer>` and the capability traits it implements.
///
/// ```rust
/// use std::sync::Arc;
/// use taskline::{capabilities, CapabilityId, CapabilitySet, Observer};
///
/// trait Ping: Send + Sync { fn ping(&self); }
///
/// struct Listener;
/// impl Ping for Listener { fn ping(&self) {} }
/// impl Observer for Listener {
///     fn capabilities(this: &Arc<Self>) -> CapabilitySet {
///         capabilities!(this => dyn Ping)
///     }
/// }
///
/// let set = Listener::capabilities(&Arc::new(Listener));
/// assert!(set.contains(CapabilityId::of::<dyn Ping>()));
/// ```
#[macro_export]
macro_rules! capabilities {
    ($this:expr => $($cap:ty),+ $(,)?) => {{
        let this = $this;
        $crate::CapabilitySet::new()
            $(.with::<$cap>({
                let strong = ::std::sync::Arc::clone(this);
                let strong: ::std::sync::Arc<$cap> = strong;
                ::std::sync::Arc::downgrade(&strong)
            }))+
    }};
}
