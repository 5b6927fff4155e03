//! Subscriber callbacks run after a successful reload.

use std::sync::Arc;
use tokio::sync::RwLock;

type Callback = Box<dyn Fn(&config::Config) + Send + Sync>;

/// Handle for a subscription that can be dropped to unsubscribe.
///
/// When the handle is dropped, the subscription is removed.
pub struct SubscriptionHandle {
    id: u64,
    registry: Arc<RwLock<Subscribers>>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        let id = self.id;
        if let Ok(mut inner) = self.registry.try_write() {
            inner.remove(id);
            return;
        }

        // A notification is in flight; finish the removal once it releases the lock.
        let registry = Arc::clone(&self.registry);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                registry.write().await.remove(id);
            });
        }
    }
}

#[derive(Default)]
struct Subscribers {
    callbacks: Vec<(u64, Callback)>,
    next_id: u64,
}

impl Subscribers {
    fn remove(&mut self, id: u64) {
        self.callbacks.retain(|(sub_id, _)| *sub_id != id);
    }
}

/// Registry of callbacks interested in configuration changes.
///
/// Each callback receives the freshly loaded snapshot.
///
/// # Examples
///
/// ```rust,no_run
/// use secret_kv_config::notify::SubscriberRegistry;
///
/// # async fn example() {
/// let registry = SubscriberRegistry::new();
///
/// let handle = registry
///     .subscribe(|config| {
///         println!("password is now {:?}", config.get_string("db.password"));
///     })
///     .await;
///
/// registry.notify_all(&config::Config::default()).await;
///
/// // Unsubscribe by dropping the handle
/// drop(handle);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<RwLock<Subscribers>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it stays registered until the handle is dropped.
    pub async fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&config::Config) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.callbacks.push((id, Box::new(callback)));

        SubscriptionHandle {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Call every subscriber, in subscription order, with `snapshot`.
    pub async fn notify_all(&self, snapshot: &config::Config) {
        let inner = self.inner.read().await;
        for (_id, callback) in &inner.callbacks {
            callback(snapshot);
        }
    }

    /// Get the number of active subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.inner.read().await.callbacks.len()
    }
}
