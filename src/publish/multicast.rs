//! # Multicast proxies: one value that forwards calls to every observer.
//!
//! [`Multicast<C>`] is a live view over a publisher's registry for capability `C`.
//! Each call snapshots the current live observers (in registration order), releases
//! the lock, and invokes them one by one on the calling thread.
//!
//! The [`multicast!`](crate::multicast) macro declares a capability trait and
//! implements it for `Multicast<dyn Trait>`, so a broadcast reads like a plain call:
//!
//! ```rust
//! use std::sync::Arc;
//! use taskline::{capabilities, multicast, CapabilitySet, KeyList, Observer, Publisher};
//!
//! multicast! {
//!     pub trait Ping {
//!         fn ping(&self, n: u32);
//!     }
//! }
//!
//! struct Printer;
//! impl Ping for Printer {
//!     fn ping(&self, n: u32) { println!("ping {n}"); }
//! }
//! impl Observer for Printer {
//!     fn capabilities(this: &Arc<Self>) -> CapabilitySet { capabilities!(this => dyn Ping) }
//! }
//!
//! let publisher = Publisher::new(KeyList::default().with::<dyn Ping>());
//! let printer = Arc::new(Printer);
//! publisher.subscribe_observer(&printer).unwrap();
//!
//! publisher.publisher_for_observers_using::<dyn Ping>().ping(1);
//! ```

use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::publish::CapabilityId;
use crate::publish::registry::Registry;

/// Live broadcast proxy for capability `C`.
///
/// Zero observers makes every call a silent no-op.
pub struct Multicast<C: ?Sized> {
    registry: Arc<Mutex<Registry>>,
    bus: Option<Bus>,
    _capability: PhantomData<fn() -> Box<C>>,
}

impl<C> Multicast<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn new(registry: Arc<Mutex<Registry>>, bus: Option<Bus>) -> Self {
        Self {
            registry,
            bus,
            _capability: PhantomData,
        }
    }

    /// Calls `f` once per live observer, in registration order.
    ///
    /// A panicking observer is reported and skipped; the others still receive the call.
    /// Returns the number of observers that returned normally.
    pub fn each<F>(&self, f: F) -> usize
    where
        F: Fn(&C),
    {
        let observers = self.registry.lock().snapshot::<C>();
        deliver(&observers, &f, self.bus.as_ref())
    }

    /// Number of live observers right now.
    pub fn len(&self) -> usize {
        self.registry.lock().count(CapabilityId::of::<C>())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: ?Sized> Clone for Multicast<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            bus: self.bus.clone(),
            _capability: PhantomData,
        }
    }
}

impl<C: ?Sized> std::fmt::Debug for Multicast<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multicast")
            .field("capability", &std::any::type_name::<C>())
            .finish()
    }
}

/// Invokes `f` on each observer with panic isolation.
pub(crate) fn deliver<C, F>(observers: &[Arc<C>], f: &F, bus: Option<&Bus>) -> usize
where
    C: ?Sized + Send + Sync + 'static,
    F: Fn(&C),
{
    let mut reached = 0;
    for observer in observers {
        match catch_unwind(AssertUnwindSafe(|| f(observer.as_ref()))) {
            Ok(()) => reached += 1,
            Err(panic_err) => report_panic::<C>(&panic_message(panic_err.as_ref()), bus),
        }
    }
    reached
}

fn report_panic<C: ?Sized + 'static>(message: &str, bus: Option<&Bus>) {
    let capability = CapabilityId::of::<C>();
    tracing::warn!(target: "taskline", %capability, panic = message, "observer panicked during delivery");
    if let Some(bus) = bus {
        bus.publish(
            Event::new(EventKind::DeliveryPanicked)
                .with_reason(format!("{capability}: {message}")),
        );
    }
}

/// Declares a capability trait and implements it for [`Multicast<dyn Trait>`](Multicast).
///
/// Every method must take `&self`, return `()`, and have `Clone` arguments
/// (each observer receives its own clone).
#[macro_export]
macro_rules! multicast {
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident {
            $(
                $(#[$fmeta:meta])*
                fn $method:ident(&self $(, $arg:ident : $ty:ty)*);
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $name: ::std::marker::Send + ::std::marker::Sync {
            $(
                $(#[$fmeta])*
                fn $method(&self $(, $arg: $ty)*);
            )*
        }

        impl $name for $crate::Multicast<dyn $name> {
            $(
                fn $method(&self $(, $arg: $ty)*) {
                    self.each(|observer| observer.$method($(::std::clone::Clone::clone(&$arg)),*));
                }
            )*
        }
    };
}
