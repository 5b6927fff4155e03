//! Directory watching for reload-on-change.

use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Watches the directories holding secrets files and signals reloads.
///
/// The containing directory is watched rather than the file itself, so a
/// file that is deleted and recreated (as secret sidecars commonly do) keeps
/// triggering. Only events touching a registered file name are forwarded,
/// and a burst of them yields a single signal once the debounce duration has
/// passed since the first.
///
/// # Examples
///
/// ```rust,no_run
/// use secret_kv_config::notify::ConfigWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(250))?;
/// watcher.watch("/vault/secrets", "application.properties").await?;
///
/// while let Some(()) = rx.recv().await {
///     println!("secrets changed, reload triggered");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcher {
    watcher: tokio::sync::Mutex<RecommendedWatcher>,
    debounce_duration: Duration,
    watched_files: Arc<RwLock<Vec<PathBuf>>>,
}

impl ConfigWatcher {
    /// Create a watcher and the channel its reload signals arrive on.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying file watcher cannot be created.
    pub fn new(debounce_duration: Duration) -> Result<(Self, mpsc::Receiver<()>)> {
        let (tx, rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        let watched_files: Arc<RwLock<Vec<PathBuf>>> = Arc::new(RwLock::new(Vec::new()));
        let files = Arc::clone(&watched_files);

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "file watcher error");
                    return;
                }
            };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }
            let relevant = files
                .read()
                .map(|files| event.paths.iter().any(|p| files.contains(p)))
                .unwrap_or(false);
            if relevant {
                let _ = event_tx.send(event);
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        // Wait for the writer to settle, then fold the burst into one reload.
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                tracing::debug!(paths = ?event.paths, kind = ?event.kind, "secrets file changed");

                sleep(debounce_duration).await;
                while event_rx.try_recv().is_ok() {}

                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });

        Ok((
            Self {
                watcher: tokio::sync::Mutex::new(watcher),
                debounce_duration,
                watched_files,
            },
            rx,
        ))
    }

    /// Watch `file_name` inside `directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or cannot be watched.
    pub async fn watch(&self, directory: impl AsRef<Path>, file_name: &str) -> Result<()> {
        let directory = directory
            .as_ref()
            .canonicalize()
            .map_err(|e| ConfigError::WatchError(format!("Failed to resolve path: {}", e)))?;

        let mut watcher = self.watcher.lock().await;
        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;

        let file = directory.join(file_name);
        let mut files = self
            .watched_files
            .write()
            .map_err(|_| ConfigError::WatchError("watched file list poisoned".to_string()))?;
        if !files.contains(&file) {
            tracing::info!(file = %file.display(), "watching secrets file for changes");
            files.push(file);
        }

        Ok(())
    }

    /// Get the debounce duration for this watcher.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Files currently watched, as canonical paths.
    pub fn watched_files(&self) -> Vec<PathBuf> {
        self.watched_files
            .read()
            .map(|files| files.clone())
            .unwrap_or_default()
    }
}
