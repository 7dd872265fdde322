//! # Publisher: subscription management and broadcast.
//!
//! ## Subscribe flow
//! ```text
//! subscribe_observer(&Arc<O>)
//!   O::capabilities(o) ∩ policy.subscribe_keys()      → candidates
//!   for each candidate: policy.on_subscribe(o, cap)   (no lock held)
//!     ├─ false → excluded, SubscriptionRejected event
//!     └─ true  → accepted
//!   accepted empty? → Err(SubscriptionRejected)
//!   lock: insert / replace accepted, drop the rest of o's old registration
//! ```
//!
//! ## Broadcast paths
//! - [`Publisher::publisher_for_observers_using`] returns a live [`Multicast`] proxy.
//! - [`Publisher::publish_to_observers_using`] calls a closure per observer, inline.
//! - [`Publisher::publish_to_observers_using_queue`] submits one task per observer to a queue.
//!
//! Every path snapshots the live observers under the lock and delivers after
//! releasing it, so observers may (un)subscribe from inside a delivery.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ScheduleError, SubscribeError};
use crate::events::{Bus, Event, EventKind};
use crate::publish::multicast::deliver;
use crate::publish::registry::Registry;
use crate::publish::{CapabilityId, KeyList, Multicast, Observer, ObserverId, SubscriptionPolicy};
use crate::queue::TaskQueue;
use crate::tasks::TaskHandle;

/// Outcome of a successful [`Publisher::subscribe_observer`].
#[derive(Clone, Debug)]
pub struct Subscription {
    /// Identity the observer is registered under.
    pub observer: ObserverId,
    /// Capabilities the observer now receives broadcasts through.
    pub capabilities: Vec<CapabilityId>,
    /// Capabilities excluded by [`SubscriptionPolicy::on_subscribe`].
    pub rejected: Vec<CapabilityId>,
}

/// Registry of observers keyed by capability, plus broadcast helpers.
pub struct Publisher {
    policy: Arc<dyn SubscriptionPolicy>,
    registry: Arc<Mutex<Registry>>,
    bus: Option<Bus>,
}

impl Publisher {
    /// Creates a publisher governed by `policy`.
    pub fn new(policy: impl SubscriptionPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            registry: Arc::new(Mutex::new(Registry::default())),
            bus: None,
        }
    }

    /// Publisher accepting every observer for `keys`.
    pub fn with_keys(keys: Vec<CapabilityId>) -> Self {
        Self::new(KeyList::new(keys))
    }

    /// Reports (un)subscriptions and delivery faults on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Capabilities this publisher accepts.
    pub fn subscribe_keys(&self) -> Vec<CapabilityId> {
        self.policy.subscribe_keys()
    }

    /// Registers `observer` for every capability it declares that this publisher accepts.
    ///
    /// Re-subscribing replaces the previous registration in place. Fails only if no
    /// capability remains after the `on_subscribe` hook; an earlier registration of
    /// the observer is then dropped as well.
    pub fn subscribe_observer<O: Observer>(
        &self,
        observer: &Arc<O>,
    ) -> Result<Subscription, SubscribeError> {
        let id = ObserverId::of(observer);
        let keys = self.policy.subscribe_keys();
        let declared = O::capabilities(observer).into_views();

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for view in declared.into_iter().filter(|v| keys.contains(&v.id)) {
            if self.policy.on_subscribe(&id, view.id) {
                accepted.push(view);
            } else {
                rejected.push(view.id);
                self.publish(
                    Event::new(EventKind::SubscriptionRejected).with_reason(view.id.name()),
                );
            }
        }

        if accepted.is_empty() {
            self.registry.lock().retain_for(&id, &[]);
            tracing::debug!(target: "taskline", observer = ?id, ?rejected, "subscription rejected");
            return Err(SubscribeError::SubscriptionRejected {
                capabilities: rejected.iter().map(CapabilityId::name).collect(),
            });
        }

        let capabilities: Vec<CapabilityId> = accepted.iter().map(|v| v.id).collect();
        {
            let mut reg = self.registry.lock();
            reg.retain_for(&id, &capabilities);
            for view in accepted {
                reg.insert(&id, view);
            }
        }

        self.publish(
            Event::new(EventKind::ObserverSubscribed).with_reason(join_names(&capabilities)),
        );
        Ok(Subscription {
            observer: id,
            capabilities,
            rejected,
        })
    }

    /// Removes `observer` from every capability. Returns `false` if it was not registered.
    ///
    /// `on_unsubscribe` runs after the removal; a `false` from it is only logged.
    pub fn unsubscribe_observer<O: Observer>(&self, observer: &Arc<O>) -> bool {
        let id = ObserverId::of(observer);
        let removed = self.registry.lock().remove_observer(&id);
        if removed.is_empty() {
            return false;
        }

        for capability in &removed {
            if !self.policy.on_unsubscribe(&id, *capability) {
                tracing::warn!(
                    target: "taskline",
                    observer = ?id,
                    %capability,
                    "unsubscribe hook objected; observer removed anyway"
                );
            }
        }
        self.publish(
            Event::new(EventKind::ObserverUnsubscribed).with_reason(join_names(&removed)),
        );
        true
    }

    /// Live multicast proxy for capability `C`.
    pub fn publisher_for_observers_using<C>(&self) -> Multicast<C>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Multicast::new(Arc::clone(&self.registry), self.bus.clone())
    }

    /// Calls `f` once per live observer of `C`, inline and in registration order.
    ///
    /// Returns the number of observers that returned normally.
    pub fn publish_to_observers_using<C, F>(&self, f: F) -> usize
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&C),
    {
        let observers = self.registry.lock().snapshot::<C>();
        deliver(&observers, &f, self.bus.as_ref())
    }

    /// Submits one async task per live observer of `C` to `queue`.
    ///
    /// On a serial queue the observers run in registration order. An observer dropped
    /// before its task runs is skipped. If the queue rejects a submission, the tasks
    /// already submitted by this call are cancelled before the error is returned.
    pub fn publish_to_observers_using_queue<C, F>(
        &self,
        queue: &TaskQueue,
        f: F,
    ) -> Result<Vec<TaskHandle>, ScheduleError>
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&C) + Send + Sync + 'static,
    {
        let observers = self.registry.lock().snapshot::<C>();
        let f = Arc::new(f);
        let mut handles = Vec::with_capacity(observers.len());

        for observer in observers {
            let weak = Arc::downgrade(&observer);
            drop(observer);
            let f = Arc::clone(&f);
            let bus = self.bus.clone();
            let submitted = queue.submit_async(move || {
                if let Some(observer) = weak.upgrade() {
                    deliver(std::slice::from_ref(&observer), f.as_ref(), bus.as_ref());
                }
            });
            match submitted {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    for handle in &handles {
                        handle.cancel();
                    }
                    return Err(err);
                }
            }
        }
        Ok(handles)
    }

    /// Number of live observers registered for `C`.
    pub fn subscriber_count<C>(&self) -> usize
    where
        C: ?Sized + 'static,
    {
        self.registry.lock().count(CapabilityId::of::<C>())
    }

    /// True if `observer` is registered for at least one capability.
    pub fn is_subscribed<O: Observer>(&self, observer: &Arc<O>) -> bool {
        self.registry.lock().contains(&ObserverId::of(observer))
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("keys", &self.policy.subscribe_keys())
            .finish()
    }
}

fn join_names(ids: &[CapabilityId]) -> String {
    ids.iter().map(CapabilityId::name).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::CapabilitySet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    trait Ping: Send + Sync {
        fn ping(&self);
    }
    trait Pong: Send + Sync {
        fn pong(&self);
    }

    #[derive(Default)]
    struct Both {
        pings: AtomicUsize,
        pongs: AtomicUsize,
    }
    impl Ping for Both {
        fn ping(&self) {
            self.pings.fetch_add(1, Ordering::SeqCst);
        }
    }
    impl Pong for Both {
        fn pong(&self) {
            self.pongs.fetch_add(1, Ordering::SeqCst);
        }
    }
    impl Observer for Both {
        fn capabilities(this: &Arc<Self>) -> CapabilitySet {
            crate::capabilities!(this => dyn Ping, dyn Pong)
        }
    }

    /// Accepts both capabilities but vetoes `Pong`.
    struct NoPong {
        unsubscribed: AtomicUsize,
    }
    impl SubscriptionPolicy for NoPong {
        fn subscribe_keys(&self) -> Vec<CapabilityId> {
            vec![CapabilityId::of::<dyn Ping>(), CapabilityId::of::<dyn Pong>()]
        }
        fn on_subscribe(&self, _observer: &ObserverId, capability: CapabilityId) -> bool {
            capability != CapabilityId::of::<dyn Pong>()
        }
        fn on_unsubscribe(&self, _observer: &ObserverId, _capability: CapabilityId) -> bool {
            self.unsubscribed.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    #[test]
    fn test_only_accepted_keys_are_registered() {
        let p = Publisher::with_keys(vec![CapabilityId::of::<dyn Ping>()]);
        let obs = Arc::new(Both::default());

        let sub = p.subscribe_observer(&obs).unwrap();
        assert_eq!(sub.capabilities, vec![CapabilityId::of::<dyn Ping>()]);
        assert_eq!(p.subscriber_count::<dyn Ping>(), 1);
        assert_eq!(p.subscriber_count::<dyn Pong>(), 0);
    }

    #[test]
    fn test_hook_excludes_single_capability() {
        let p = Publisher::new(NoPong {
            unsubscribed: AtomicUsize::new(0),
        });
        let obs = Arc::new(Both::default());

        let sub = p.subscribe_observer(&obs).unwrap();
        assert_eq!(sub.rejected, vec![CapabilityId::of::<dyn Pong>()]);

        p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping());
        p.publish_to_observers_using::<dyn Pong, _>(|o| o.pong());
        assert_eq!(obs.pings.load(Ordering::SeqCst), 1);
        assert_eq!(obs.pongs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_rejected_is_an_error() {
        let p = Publisher::new(NoPong {
            unsubscribed: AtomicUsize::new(0),
        });

        struct PongOnly;
        impl Pong for PongOnly {
            fn pong(&self) {}
        }
        impl Observer for PongOnly {
            fn capabilities(this: &Arc<Self>) -> CapabilitySet {
                crate::capabilities!(this => dyn Pong)
            }
        }

        let err = p.subscribe_observer(&Arc::new(PongOnly)).unwrap_err();
        assert_eq!(err.as_label(), "subscription_rejected");
    }

    #[test]
    fn test_resubscribe_does_not_duplicate() {
        let p = Publisher::with_keys(vec![CapabilityId::of::<dyn Ping>()]);
        let obs = Arc::new(Both::default());
        p.subscribe_observer(&obs).unwrap();
        p.subscribe_observer(&obs).unwrap();

        assert_eq!(p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping()), 1);
        assert_eq!(obs.pings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_hook_is_advisory() {
        let p = Publisher::new(NoPong {
            unsubscribed: AtomicUsize::new(0),
        });
        let obs = Arc::new(Both::default());
        p.subscribe_observer(&obs).unwrap();

        assert!(p.unsubscribe_observer(&obs));
        assert!(!p.is_subscribed(&obs));
        assert!(!p.unsubscribe_observer(&obs));
        assert_eq!(p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping()), 0);
    }

    /// Accepts `Ping` while `open` is set.
    struct Gate {
        open: AtomicBool,
    }
    impl SubscriptionPolicy for Gate {
        fn subscribe_keys(&self) -> Vec<CapabilityId> {
            vec![CapabilityId::of::<dyn Ping>()]
        }
        fn on_subscribe(&self, _observer: &ObserverId, _capability: CapabilityId) -> bool {
            self.open.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_vetoed_resubscribe_drops_old_registration() {
        let gate = Arc::new(Gate {
            open: AtomicBool::new(true),
        });
        struct Shared(Arc<Gate>);
        impl SubscriptionPolicy for Shared {
            fn subscribe_keys(&self) -> Vec<CapabilityId> {
                self.0.subscribe_keys()
            }
            fn on_subscribe(&self, observer: &ObserverId, capability: CapabilityId) -> bool {
                self.0.on_subscribe(observer, capability)
            }
        }

        let p = Publisher::new(Shared(Arc::clone(&gate)));
        let obs = Arc::new(Both::default());
        p.subscribe_observer(&obs).unwrap();
        assert!(p.is_subscribed(&obs));

        gate.open.store(false, Ordering::SeqCst);
        assert!(p.subscribe_observer(&obs).is_err());

        assert!(!p.is_subscribed(&obs));
        assert_eq!(p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping()), 0);
        assert_eq!(obs.pings.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_removes_every_capability() {
        let p = Publisher::with_keys(vec![
            CapabilityId::of::<dyn Ping>(),
            CapabilityId::of::<dyn Pong>(),
        ]);
        let obs = Arc::new(Both::default());
        let sub = p.subscribe_observer(&obs).unwrap();
        assert_eq!(sub.capabilities.len(), 2);
        assert_eq!(p.subscriber_count::<dyn Ping>(), 1);
        assert_eq!(p.subscriber_count::<dyn Pong>(), 1);

        assert!(p.unsubscribe_observer(&obs));
        assert_eq!(p.subscriber_count::<dyn Ping>(), 0);
        assert_eq!(p.subscriber_count::<dyn Pong>(), 0);
        assert_eq!(p.publish_to_observers_using::<dyn Pong, _>(|o| o.pong()), 0);
        assert_eq!(obs.pongs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropped_observer_is_skipped() {
        let p = Publisher::with_keys(vec![CapabilityId::of::<dyn Ping>()]);
        let a = Arc::new(Both::default());
        let b = Arc::new(Both::default());
        p.subscribe_observer(&a).unwrap();
        p.subscribe_observer(&b).unwrap();

        drop(a);
        assert_eq!(p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping()), 1);
        assert_eq!(b.pings.load(Ordering::SeqCst), 1);
    }
}
