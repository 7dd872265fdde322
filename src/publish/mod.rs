//! # Publish/subscribe by capability.
//!
//! Observers declare the capability traits they implement; publishers keep, per
//! capability, an ordered list of weakly held observers and broadcast through them.
//!
//! - [`CapabilityId`], [`CapabilitySet`], [`capabilities!`](crate::capabilities) - capability identity and views
//! - [`Observer`], [`ObserverId`] - what can be registered, and its identity
//! - [`SubscriptionPolicy`], [`KeyList`] - accepted keys and subscribe/unsubscribe hooks
//! - [`Publisher`], [`Subscription`] - registration and broadcast
//! - [`Multicast`], [`multicast!`](crate::multicast) - live broadcast proxies
//! - [`TypedPublisher`] - single-capability publisher

mod capability;
mod multicast;
mod observer;
mod policy;
mod publisher;
mod registry;
mod typed;

pub use capability::{CapabilityId, CapabilitySet};
pub use multicast::Multicast;
pub use observer::{Observer, ObserverId};
pub use policy::{KeyList, SubscriptionPolicy};
pub use publisher::{Publisher, Subscription};
pub use typed::TypedPublisher;
