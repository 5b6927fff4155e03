//! Builder for assembling the ordered list of configuration sources.

use crate::core::{ConfigLoader, Configuration};
use crate::error::Result;
use crate::sources::ConfigSource;
use std::path::PathBuf;

/// Ordered registry of configuration sources.
///
/// Sources are registered during startup and merged by [`build`](Self::build);
/// with equal priority, later registrations override earlier ones.
///
/// # Examples
///
/// ```rust,no_run
/// use secret_kv_config::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let config = ConfigBuilder::new()
///     .with_base_path("/srv/app")
///     .add_secret_key_value_file_optional("/etc/app/defaults", true)
///     .add_secret_key_value_file_with_reload(DEFAULT_SECRETS_DIRECTORY, false, true)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigBuilder {
    base_path: Option<PathBuf>,
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            base_path: None,
            sources: Vec::new(),
        }
    }

    /// Set the directory used by sources that have no file provider bound.
    ///
    /// Defaults to the process working directory.
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Append a configuration source.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        tracing::debug!(source = %source.name(), "registered configuration source");
        self.sources.push(Box::new(source));
        self
    }

    /// Registered sources, in registration order.
    pub fn sources(&self) -> &[Box<dyn ConfigSource>] {
        &self.sources
    }

    /// The source at `index`, if it is an `S`.
    pub fn source<S: ConfigSource + 'static>(&self, index: usize) -> Option<&S> {
        self.sources.get(index)?.as_any().downcast_ref::<S>()
    }

    /// The base path sources will fall back to.
    pub fn base_path(&self) -> PathBuf {
        match &self.base_path {
            Some(path) => path.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Load every source and produce the merged configuration.
    ///
    /// Sources without a file provider are bound to the base path first.
    /// With the `file-watch` feature, sources asking for reload-on-change are
    /// watched from here on.
    ///
    /// # Errors
    ///
    /// Returns an error if any source fails to load (for example a required
    /// file that does not exist) or a watcher cannot be started.
    pub async fn build(self) -> Result<Configuration> {
        let base_path = self.base_path();
        let mut sources = self.sources;
        for source in &mut sources {
            source.ensure_defaults(&base_path);
        }

        let loader = ConfigLoader::new(sources);
        let initial = loader.load()?;
        tracing::info!(sources = ?loader.source_names(), "configuration loaded");

        let configuration = Configuration::new(initial, loader);

        #[cfg(feature = "file-watch")]
        let configuration = configuration.start_watching().await?;

        Ok(configuration)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
