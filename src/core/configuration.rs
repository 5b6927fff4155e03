//! The configuration handle providing lock-free access to merged values.

use crate::core::ConfigLoader;
use crate::error::{ConfigError, Result};
use crate::sources::properties::normalize_key;
use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, PoisonError};

#[cfg(feature = "file-watch")]
use crate::notify::{ConfigWatcher, SubscriberRegistry, SubscriptionHandle};

/// State shared with the background reload task.
struct Shared {
    current: ArcSwap<config::Config>,
    loader: ConfigLoader,
    /// Held across load and store so reloads land in the order they read.
    reload_lock: Mutex<()>,
    #[cfg(feature = "file-watch")]
    subscribers: SubscriberRegistry,
}

impl Shared {
    async fn reload(&self) -> Result<()> {
        {
            let _guard = self
                .reload_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let fresh = self.loader.load()?;
            self.current.store(Arc::new(fresh));
        }
        tracing::info!("configuration reloaded");

        #[cfg(feature = "file-watch")]
        self.subscribers.notify_all(&self.current.load_full()).await;

        Ok(())
    }
}

/// Merged configuration from every registered source.
///
/// Reads go through an `arc-swap` snapshot and never block a reload. Keys
/// are normalized like parsed keys, so `Db:Password` and `db.password` are
/// the same lookup.
///
/// # Examples
///
/// ```rust,no_run
/// use secret_kv_config::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let config = ConfigBuilder::new()
///     .add_secret_key_value_file("/vault/secrets")
///     .build()
///     .await?;
///
/// let password: String = config.get("Db:Password")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Configuration {
    shared: Arc<Shared>,
    #[cfg(feature = "file-watch")]
    watcher: Option<Arc<ConfigWatcher>>,
}

impl Configuration {
    pub(crate) fn new(initial: config::Config, loader: ConfigLoader) -> Self {
        Self {
            shared: Arc::new(Shared {
                current: ArcSwap::from_pointee(initial),
                loader,
                reload_lock: Mutex::new(()),
                #[cfg(feature = "file-watch")]
                subscribers: SubscriberRegistry::new(),
            }),
            #[cfg(feature = "file-watch")]
            watcher: None,
        }
    }

    /// Get the current snapshot of all values.
    pub fn snapshot(&self) -> Arc<config::Config> {
        self.shared.current.load_full()
    }

    /// Read `key` as `T`.
    ///
    /// Values from properties files are strings; numeric and boolean targets
    /// are parsed from them.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if no source provided `key`, or
    /// `DeserializationError` if the value does not convert to `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let key = normalize_key(key);
        self.shared.current.load().get::<T>(&key).map_err(|e| match e {
            config::ConfigError::NotFound(_) => ConfigError::KeyNotFound(key),
            other => ConfigError::DeserializationError(other.to_string()),
        })
    }

    /// Read `key` as a string, or `None` if it is absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.shared
            .current
            .load()
            .get_string(&normalize_key(key))
            .ok()
    }

    /// Whether any source provided `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.shared
            .current
            .load()
            .get::<config::Value>(&normalize_key(key))
            .is_ok()
    }

    /// Deserialize the whole configuration into `T`.
    ///
    /// Field names must match the normalized (lowercase) keys.
    ///
    /// # Errors
    ///
    /// Returns `DeserializationError` if the values do not fit `T`.
    pub fn try_deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        self.snapshot()
            .as_ref()
            .clone()
            .try_deserialize::<T>()
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Names of the sources in merge order.
    pub fn source_names(&self) -> Vec<String> {
        self.shared.loader.source_names()
    }

    /// Re-read every source and swap in the result.
    ///
    /// If any source fails, the previous values are kept and the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the first source or merge error.
    pub async fn reload(&self) -> Result<()> {
        self.shared.reload().await
    }

    /// Register a callback run with the new snapshot after every successful
    /// reload. Drop the returned handle to unsubscribe.
    #[cfg(feature = "file-watch")]
    pub async fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&config::Config) + Send + Sync + 'static,
    {
        self.shared.subscribers.subscribe(callback).await
    }

    /// Whether any source is being watched for changes.
    #[cfg(feature = "file-watch")]
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Watch every source that asked for reload-on-change.
    ///
    /// Directories that do not exist are skipped. When nothing ends up
    /// watched, the configuration is returned unchanged.
    #[cfg(feature = "file-watch")]
    pub(crate) async fn start_watching(mut self) -> Result<Self> {
        let targets = self.shared.loader.watch_targets();
        let Some(debounce) = targets.iter().map(|t| t.debounce).min() else {
            return Ok(self);
        };

        let (watcher, mut rx) = ConfigWatcher::new(debounce)?;
        let mut watching = 0;
        for target in &targets {
            if !target.directory.is_dir() {
                tracing::warn!(
                    directory = %target.directory.display(),
                    "cannot watch missing directory, reload-on-change disabled for it"
                );
                continue;
            }
            watcher.watch(&target.directory, &target.file_name).await?;
            watching += 1;
        }
        if watching == 0 {
            return Ok(self);
        }

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                if let Err(e) = shared.reload().await {
                    tracing::warn!(
                        error = %e,
                        "reload after file change failed, keeping previous configuration"
                    );
                }
            }
        });

        self.watcher = Some(Arc::new(watcher));
        Ok(self)
    }
}
