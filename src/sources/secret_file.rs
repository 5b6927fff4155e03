//! Key/value secrets file configuration source.

use super::properties;
use super::{ConfigSource, FileProvider, PhysicalFileProvider, WatchTarget};
use crate::error::{ConfigError, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// File read from the secrets directory unless configured otherwise.
pub const DEFAULT_FILE_NAME: &str = "application.properties";

/// Debounce applied to change events before a reload.
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(250);

/// Descriptor for a key/value properties file living in a directory.
///
/// Usually created through
/// [`SecretKeyValueFileExt`](crate::extensions::SecretKeyValueFileExt);
/// fields are public so a configurator closure can set any of them.
///
/// When `file_provider` is left unset, the builder binds one rooted at its
/// base path before the first load. `directory_path` is then informational
/// only and is not consulted for reading.
#[derive(Clone)]
pub struct SecretKeyValueFileSource {
    /// Directory expected to contain the file
    pub directory_path: PathBuf,
    /// Provider the file is read through
    pub file_provider: Option<Arc<dyn FileProvider>>,
    /// Name of the file inside the provider root
    pub file_name: String,
    /// Whether a missing file is tolerated
    pub optional: bool,
    /// Whether the file is watched and reloaded when it changes
    pub reload_on_change: bool,
    /// Debounce for change events when `reload_on_change` is set
    pub reload_delay: Duration,
}

impl SecretKeyValueFileSource {
    /// Create a descriptor with every field at its default.
    pub fn new() -> Self {
        Self {
            directory_path: PathBuf::new(),
            file_provider: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            optional: false,
            reload_on_change: false,
            reload_delay: DEFAULT_RELOAD_DELAY,
        }
    }

    /// Root of the bound provider, if any.
    pub fn provider_root(&self) -> Option<&Path> {
        self.file_provider.as_deref().map(|p| p.root())
    }

    /// Full path of the file this source reads, once a provider is bound.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.provider_root().map(|root| root.join(&self.file_name))
    }
}

impl Default for SecretKeyValueFileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretKeyValueFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKeyValueFileSource")
            .field("directory_path", &self.directory_path)
            .field("provider_root", &self.provider_root())
            .field("file_name", &self.file_name)
            .field("optional", &self.optional)
            .field("reload_on_change", &self.reload_on_change)
            .field("reload_delay", &self.reload_delay)
            .finish()
    }
}

// Providers compare by root; two descriptors bound to the same directory are
// interchangeable.
impl PartialEq for SecretKeyValueFileSource {
    fn eq(&self, other: &Self) -> bool {
        self.directory_path == other.directory_path
            && self.provider_root() == other.provider_root()
            && self.file_name == other.file_name
            && self.optional == other.optional
            && self.reload_on_change == other.reload_on_change
            && self.reload_delay == other.reload_delay
    }
}

impl ConfigSource for SecretKeyValueFileSource {
    fn load(&self) -> Result<HashMap<String, config::Value>> {
        let provider = self.file_provider.as_ref().ok_or_else(|| {
            ConfigError::LoadError(format!(
                "No file provider bound for '{}'",
                self.file_name
            ))
        })?;
        let path = provider.root().join(&self.file_name);

        let Some(content) = provider.read_to_string(&self.file_name)? else {
            if self.optional {
                tracing::debug!(
                    path = %path.display(),
                    "optional secrets file not found, skipping"
                );
                return Ok(HashMap::new());
            }
            return Err(ConfigError::MissingRequiredSource { path });
        };

        let entries = properties::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            line: e.line,
            reason: e.reason,
        })?;

        tracing::debug!(path = %path.display(), keys = entries.len(), "loaded secrets file");

        let origin = path.display().to_string();
        Ok(entries
            .into_iter()
            .map(|(key, value)| (key, config::Value::new(Some(&origin), value)))
            .collect())
    }

    fn name(&self) -> String {
        match self.resolved_path() {
            Some(path) => format!("secrets:{}", path.display()),
            None => format!("secrets:{}", self.directory_path.join(&self.file_name).display()),
        }
    }

    fn ensure_defaults(&mut self, base_path: &Path) {
        if self.file_provider.is_none() {
            tracing::debug!(
                directory = %self.directory_path.display(),
                base_path = %base_path.display(),
                "no file provider bound, falling back to base path"
            );
            self.file_provider = Some(Arc::new(PhysicalFileProvider::new(base_path)));
        }
    }

    fn watch_target(&self) -> Option<WatchTarget> {
        if !self.reload_on_change {
            return None;
        }
        Some(WatchTarget {
            directory: self.provider_root()?.to_path_buf(),
            file_name: self.file_name.clone(),
            debounce: self.reload_delay,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
