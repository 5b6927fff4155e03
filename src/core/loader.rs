//! Configuration loader that merges multiple sources.

use crate::error::{ConfigError, Result};
use crate::sources::{ConfigSource, WatchTarget};
use config::{Map, Value, ValueKind};

/// Loads and merges configuration from multiple sources.
///
/// The loader handles precedence by sorting sources by priority and merging them
/// in order (lower priority first, higher priority sources override). The sort
/// is stable, so among equal priorities the later registration wins.
///
/// Dotted keys are expanded into nested tables before they reach `config`.
/// When one source sets `db` and another sets `db.password`, the later
/// source replaces the whole entry: a scalar overwrites a table and a nested
/// key turns an earlier scalar into a table.
pub struct ConfigLoader {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigLoader {
    /// Create a loader over already-defaulted sources.
    pub fn new(sources: Vec<Box<dyn ConfigSource>>) -> Self {
        Self { sources }
    }

    /// Load and merge configuration from all sources.
    ///
    /// An empty loader yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns the first source error unchanged, or a `LoadError` if a key
    /// cannot be merged.
    pub fn load(&self) -> Result<config::Config> {
        let mut merged = Map::new();

        for source in self.sorted() {
            let values = source.load().inspect_err(|e| {
                tracing::warn!(
                    source = %source.name(),
                    error = %e,
                    "failed to load configuration source"
                );
            })?;
            tracing::debug!(
                source = %source.name(),
                keys = values.len(),
                "merging configuration source"
            );

            let mut values: Vec<_> = values.into_iter().collect();
            values.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in values {
                insert_path(&mut merged, &key, value);
            }
        }

        let mut builder = config::Config::builder();
        for (key, value) in merged {
            builder = builder.set_override(&key, value).map_err(|e| {
                ConfigError::LoadError(format!("Failed to merge key '{}': {}", key, e))
            })?;
        }

        builder
            .build()
            .map_err(|e| ConfigError::LoadError(format!("Failed to build configuration: {}", e)))
    }

    /// Get the list of source names in merge order.
    pub fn source_names(&self) -> Vec<String> {
        self.sorted().iter().map(|s| s.name()).collect()
    }

    /// Files the sources asked to have watched.
    #[cfg_attr(not(feature = "file-watch"), allow(dead_code))]
    pub fn watch_targets(&self) -> Vec<WatchTarget> {
        self.sources.iter().filter_map(|s| s.watch_target()).collect()
    }

    fn sorted(&self) -> Vec<&dyn ConfigSource> {
        let mut sorted: Vec<&dyn ConfigSource> =
            self.sources.iter().map(|s| s.as_ref()).collect();
        sorted.sort_by_key(|s| s.priority());
        sorted
    }
}

/// Place `value` at the dotted `key`, replacing whatever is in its way.
fn insert_path(table: &mut Map<String, Value>, key: &str, value: Value) {
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };

    let mut current = table;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::new(None, ValueKind::Table(Map::new())));
        if !matches!(entry.kind, ValueKind::Table(_)) {
            entry.kind = ValueKind::Table(Map::new());
        }
        let ValueKind::Table(next) = &mut entry.kind else {
            return;
        };
        current = next;
    }

    current.insert(leaf.to_string(), value);
}
