use std::sync::Arc;

use parking_lot::Mutex;
use taskline::{
    CapabilityId, CapabilitySet, KeyList, Observer, ObserverId, Publisher, Scheduler,
    SchedulerConfig, SubscriptionPolicy, TaskState, TypedPublisher, capabilities, multicast,
};

multicast! {
    /// Receives pings.
    pub trait Ping {
        fn ping(&self, from: &'static str);
    }
}

multicast! {
    pub trait Status {
        fn status(&self, up: bool);
    }
}

type Journal = Arc<Mutex<Vec<String>>>;

struct Subscriber {
    name: &'static str,
    journal: Journal,
}

impl Subscriber {
    fn new(name: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
        })
    }
}

impl Ping for Subscriber {
    fn ping(&self, from: &'static str) {
        self.journal.lock().push(format!("{}<-{}", self.name, from));
    }
}

impl Status for Subscriber {
    fn status(&self, up: bool) {
        self.journal.lock().push(format!("{}:{}", self.name, up));
    }
}

impl Observer for Subscriber {
    fn capabilities(this: &Arc<Self>) -> CapabilitySet {
        capabilities!(this => dyn Ping, dyn Status)
    }
}

fn ping_publisher() -> Publisher {
    Publisher::new(KeyList::default().with::<dyn Ping>())
}

#[test]
fn multicast_reaches_subscribers_in_registration_order() -> anyhow::Result<()> {
    let journal = Journal::default();
    let p = ping_publisher();
    let s1 = Subscriber::new("s1", &journal);
    let s2 = Subscriber::new("s2", &journal);
    p.subscribe_observer(&s1)?;
    p.subscribe_observer(&s2)?;

    let proxy = p.publisher_for_observers_using::<dyn Ping>();
    proxy.ping("p");
    assert_eq!(*journal.lock(), vec!["s1<-p", "s2<-p"]);

    assert!(p.unsubscribe_observer(&s1));
    journal.lock().clear();
    proxy.ping("p");
    assert_eq!(*journal.lock(), vec!["s2<-p"]);
    Ok(())
}

#[test]
fn closure_publish_follows_registration_order() -> anyhow::Result<()> {
    let journal = Journal::default();
    let p = ping_publisher();
    let s1 = Subscriber::new("s1", &journal);
    let s2 = Subscriber::new("s2", &journal);
    p.subscribe_observer(&s1)?;
    p.subscribe_observer(&s2)?;

    assert_eq!(p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping("f")), 2);
    assert_eq!(*journal.lock(), vec!["s1<-f", "s2<-f"]);

    assert!(p.unsubscribe_observer(&s1));
    journal.lock().clear();
    assert_eq!(p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping("f")), 1);
    assert_eq!(*journal.lock(), vec!["s2<-f"]);
    Ok(())
}

#[test]
fn unsubscribe_clears_every_capability_at_once() -> anyhow::Result<()> {
    let journal = Journal::default();
    let p = Publisher::new(
        KeyList::default()
            .with::<dyn Ping>()
            .with::<dyn Status>(),
    );
    let s = Subscriber::new("s", &journal);
    let sub = p.subscribe_observer(&s)?;
    assert_eq!(sub.capabilities.len(), 2);

    assert!(p.unsubscribe_observer(&s));
    assert_eq!(p.subscriber_count::<dyn Ping>(), 0);
    assert_eq!(p.subscriber_count::<dyn Status>(), 0);

    p.publisher_for_observers_using::<dyn Ping>().ping("p");
    p.publisher_for_observers_using::<dyn Status>().status(true);
    assert!(journal.lock().is_empty());
    Ok(())
}

#[test]
fn capabilities_outside_subscribe_keys_are_ignored() -> anyhow::Result<()> {
    let journal = Journal::default();
    let p = ping_publisher();
    let s = Subscriber::new("s", &journal);

    let sub = p.subscribe_observer(&s)?;
    assert_eq!(sub.capabilities, vec![CapabilityId::of::<dyn Ping>()]);

    p.publisher_for_observers_using::<dyn Status>().status(true);
    assert!(journal.lock().is_empty());
    Ok(())
}

#[test]
fn dropped_observer_is_skipped_silently() -> anyhow::Result<()> {
    let journal = Journal::default();
    let p = ping_publisher();
    let gone = Subscriber::new("gone", &journal);
    let kept = Subscriber::new("kept", &journal);
    p.subscribe_observer(&gone)?;
    p.subscribe_observer(&kept)?;

    drop(gone);
    assert_eq!(p.publish_to_observers_using::<dyn Ping, _>(|o| o.ping("p")), 1);
    assert_eq!(*journal.lock(), vec!["kept<-p"]);
    Ok(())
}

struct Picky;

impl SubscriptionPolicy for Picky {
    fn subscribe_keys(&self) -> Vec<CapabilityId> {
        vec![CapabilityId::of::<dyn Ping>(), CapabilityId::of::<dyn Status>()]
    }

    fn on_subscribe(&self, observer: &ObserverId, capability: CapabilityId) -> bool {
        assert!(observer.type_name().ends_with("Subscriber"));
        capability == CapabilityId::of::<dyn Status>()
    }
}

#[test]
fn on_subscribe_rejection_excludes_only_that_capability() -> anyhow::Result<()> {
    let journal = Journal::default();
    let p = Publisher::new(Picky);
    let s = Subscriber::new("s", &journal);

    let sub = p.subscribe_observer(&s)?;
    assert_eq!(sub.rejected, vec![CapabilityId::of::<dyn Ping>()]);
    assert_eq!(p.subscriber_count::<dyn Ping>(), 0);
    assert_eq!(p.subscriber_count::<dyn Status>(), 1);

    p.publisher_for_observers_using::<dyn Ping>().ping("p");
    p.publisher_for_observers_using::<dyn Status>().status(false);
    assert_eq!(*journal.lock(), vec!["s:false"]);
    Ok(())
}

#[test]
fn queue_routed_publish_runs_one_task_per_observer() -> anyhow::Result<()> {
    let scheduler = Scheduler::builder(SchedulerConfig::default()).build()?;
    let journal = Journal::default();
    let p = scheduler.publisher(KeyList::default().with::<dyn Ping>());
    let subs: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|n| Subscriber::new(n, &journal))
        .collect();
    for s in &subs {
        p.subscribe_observer(s)?;
    }

    let q = scheduler.new_queue("delivery");
    let handles = p.publish_to_observers_using_queue::<dyn Ping, _>(&q, |o| o.ping("q"))?;
    assert_eq!(handles.len(), 3);
    for h in &handles {
        assert_eq!(h.wait(), TaskState::Completed);
    }
    assert_eq!(*journal.lock(), vec!["a<-q", "b<-q", "c<-q"]);

    q.release();
    assert!(
        p.publish_to_observers_using_queue::<dyn Ping, _>(&q, |o| o.ping("q"))
            .is_err()
    );
    assert_eq!(q.pending_len(), 0);
    assert_eq!(journal.lock().len(), 3);
    Ok(())
}

#[test]
fn observer_may_unsubscribe_itself_during_delivery() -> anyhow::Result<()> {
    let journal = Journal::default();
    let p = Arc::new(ping_publisher());
    let s = Subscriber::new("s", &journal);
    p.subscribe_observer(&s)?;

    let inner = p.clone();
    let me = s.clone();
    p.publish_to_observers_using::<dyn Ping, _>(move |_| {
        inner.unsubscribe_observer(&me);
    });
    assert!(!p.is_subscribed(&s));
    Ok(())
}

#[test]
fn typed_publisher_on_main_queue() -> anyhow::Result<()> {
    let scheduler = Scheduler::builder(SchedulerConfig::default()).build()?;
    let journal = Journal::default();
    let typed = TypedPublisher::<dyn Status>::new().with_bus(scheduler.bus().clone());
    let s = Subscriber::new("s", &journal);
    typed.subscribe(&s)?;

    let handles = typed.publish_on(&scheduler.main_queue(), |o| o.status(true))?;
    for h in handles {
        assert_eq!(h.wait(), TaskState::Completed);
    }
    typed.publisher().status(false);

    assert_eq!(*journal.lock(), vec!["s:true", "s:false"]);
    Ok(())
}
