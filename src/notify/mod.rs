//! Reload-on-change support.
//!
//! Provides directory watching and subscriber notifications after a reload.

pub mod subscriber;
pub mod watcher;

pub use subscriber::{SubscriberRegistry, SubscriptionHandle};
pub use watcher::ConfigWatcher;
