//! # Example: multicast
//!
//! Demonstrates capability-keyed publish/subscribe.
//!
//! Shows how to:
//! - Declare capabilities with [`multicast!`] and expose them with [`capabilities!`].
//! - Broadcast inline through a live [`Multicast`] proxy.
//! - Broadcast through a queue, one task per observer.
//! - Veto a capability in [`SubscriptionPolicy::on_subscribe`].
//!
//! ## Run
//! ```bash
//! cargo run --example multicast
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use taskline::{
    CapabilityId, CapabilitySet, Observer, ObserverId, Scheduler, SchedulerConfig,
    SubscriptionPolicy, capabilities, multicast,
};

multicast! {
    /// Connectivity notifications.
    pub trait Network {
        fn online(&self, iface: &'static str);
        fn offline(&self);
    }
}

multicast! {
    /// Debug chatter.
    pub trait Chatter {
        fn say(&self, line: String);
    }
}

struct Widget {
    name: &'static str,
}

impl Network for Widget {
    fn online(&self, iface: &'static str) {
        println!("[{}] online via {iface}", self.name);
    }
    fn offline(&self) {
        println!("[{}] offline", self.name);
    }
}

impl Chatter for Widget {
    fn say(&self, line: String) {
        println!("[{}] {line}", self.name);
    }
}

impl Observer for Widget {
    fn capabilities(this: &Arc<Self>) -> CapabilitySet {
        capabilities!(this => dyn Network, dyn Chatter)
    }
}

/// Accepts `Network` from everyone and `Chatter` only from the first observer.
#[derive(Default)]
struct Policy {
    chatter_taken: AtomicBool,
}

impl SubscriptionPolicy for Policy {
    fn subscribe_keys(&self) -> Vec<CapabilityId> {
        vec![CapabilityId::of::<dyn Network>(), CapabilityId::of::<dyn Chatter>()]
    }

    fn on_subscribe(&self, observer: &ObserverId, capability: CapabilityId) -> bool {
        let accepted = capability != CapabilityId::of::<dyn Chatter>()
            || !self.chatter_taken.swap(true, Ordering::SeqCst);
        println!("on_subscribe {observer:?} {capability} -> {accepted}");
        accepted
    }
}

fn main() -> anyhow::Result<()> {
    let scheduler = Scheduler::builder(SchedulerConfig::default()).build()?;
    let publisher = scheduler.publisher(Policy::default());

    let console = Arc::new(Widget { name: "console" });
    let status_bar = Arc::new(Widget { name: "status-bar" });
    publisher.subscribe_observer(&console)?;
    publisher.subscribe_observer(&status_bar)?;

    let network = publisher.publisher_for_observers_using::<dyn Network>();
    network.online("wlan0");

    let handles = publisher
        .publish_to_observers_using_queue::<dyn Chatter, _>(&scheduler.main_queue(), |c| {
            c.say("hello from the main queue".to_string())
        })?;
    for h in handles {
        h.wait();
    }

    publisher.unsubscribe_observer(&status_bar);
    network.offline();

    drop(console);
    println!("network observers left: {}", network.len());
    Ok(())
}
