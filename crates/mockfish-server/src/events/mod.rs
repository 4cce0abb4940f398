//! Event subscriptions and the in-process event bus.

pub mod bus;
pub mod subscription;

pub use bus::{EventBus, EventRecord};
pub use subscription::{Subscription, SubscriptionError, SubscriptionRequest, SubscriptionStore};
