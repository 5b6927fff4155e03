//! Configuration source trait.

use crate::error::Result;
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trait for configuration sources.
///
/// Implement this trait to plug additional sources into a
/// [`ConfigBuilder`](crate::core::ConfigBuilder).
pub trait ConfigSource: Send + Sync {
    /// Load configuration as a flat key-value map.
    ///
    /// Keys are config-rs paths (`database.url`). The returned map is merged
    /// with other sources according to precedence rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or parsed.
    fn load(&self) -> Result<HashMap<String, config::Value>>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Get the priority of this source (higher = takes precedence).
    ///
    /// Sources with equal priority are merged in registration order, so a
    /// later registration overrides an earlier one.
    fn priority(&self) -> i32 {
        100
    }

    /// Fill in anything left unset at registration time.
    ///
    /// Called once by the builder before the first load, with the builder's
    /// base path.
    fn ensure_defaults(&mut self, _base_path: &Path) {}

    /// The file this source wants watched for changes, if any.
    fn watch_target(&self) -> Option<WatchTarget> {
        None
    }

    /// Access the concrete source type.
    fn as_any(&self) -> &dyn Any;
}

/// A file a source asks to be watched for reload-on-change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Directory containing the file
    pub directory: PathBuf,
    /// File name inside `directory`
    pub file_name: String,
    /// Delay between a change and the reload it triggers
    pub debounce: Duration,
}
