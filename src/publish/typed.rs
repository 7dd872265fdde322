use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ScheduleError, SubscribeError};
use crate::events::Bus;
use crate::publish::{CapabilityId, KeyList, Multicast, Observer, Publisher, Subscription};
use crate::queue::TaskQueue;
use crate::tasks::TaskHandle;

/// [`Publisher`] fixed to a single capability `C`.
///
/// Broadcast calls need no capability argument:
/// `typed.publisher().ping()` instead of `publisher.publisher_for_observers_using::<dyn Ping>().ping()`.
pub struct TypedPublisher<C: ?Sized> {
    inner: Publisher,
    _capability: PhantomData<fn() -> Box<C>>,
}

impl<C> TypedPublisher<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Publisher::new(KeyList::new(vec![CapabilityId::of::<C>()])),
            _capability: PhantomData,
        }
    }

    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.inner = self.inner.with_bus(bus);
        self
    }

    pub fn subscribe<O: Observer>(&self, observer: &Arc<O>) -> Result<Subscription, SubscribeError> {
        self.inner.subscribe_observer(observer)
    }

    pub fn unsubscribe<O: Observer>(&self, observer: &Arc<O>) -> bool {
        self.inner.unsubscribe_observer(observer)
    }

    /// Live multicast proxy for `C`.
    pub fn publisher(&self) -> Multicast<C> {
        self.inner.publisher_for_observers_using::<C>()
    }

    pub fn publish<F: Fn(&C)>(&self, f: F) -> usize {
        self.inner.publish_to_observers_using::<C, F>(f)
    }

    pub fn publish_on<F>(&self, queue: &TaskQueue, f: F) -> Result<Vec<TaskHandle>, ScheduleError>
    where
        F: Fn(&C) + Send + Sync + 'static,
    {
        self.inner.publish_to_observers_using_queue::<C, F>(queue, f)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count::<C>()
    }

    /// The untyped publisher underneath.
    pub fn as_publisher(&self) -> &Publisher {
        &self.inner
    }
}

impl<C> Default for TypedPublisher<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::CapabilitySet;
    use parking_lot::Mutex;

    crate::multicast! {
        trait Tick {
            fn tick(&self, n: u32);
        }
    }

    #[derive(Default)]
    struct Clock {
        ticks: Mutex<Vec<u32>>,
    }
    impl Tick for Clock {
        fn tick(&self, n: u32) {
            self.ticks.lock().push(n);
        }
    }
    impl Observer for Clock {
        fn capabilities(this: &Arc<Self>) -> CapabilitySet {
            crate::capabilities!(this => dyn Tick)
        }
    }

    #[test]
    fn test_typed_broadcast() {
        let typed = TypedPublisher::<dyn Tick>::new();
        let c = Arc::new(Clock::default());
        typed.subscribe(&c).unwrap();

        typed.publisher().tick(1);
        assert_eq!(typed.publish(|t| t.tick(2)), 1);
        assert_eq!(typed.subscriber_count(), 1);
        assert_eq!(*c.ticks.lock(), vec![1, 2]);

        assert!(typed.unsubscribe(&c));
        typed.publisher().tick(3);
        assert_eq!(*c.ticks.lock(), vec![1, 2]);
    }
}
