//! Registration of key/value secrets files with a [`ConfigBuilder`].
//!
//! Adds configuration from a key/value file (`application.properties`) found
//! in a directory such as `/vault/secrets`, where secret sidecars commonly
//! render their output.

use crate::core::ConfigBuilder;
use crate::sources::{PhysicalFileProvider, SecretKeyValueFileSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Where secret-injection sidecars conventionally mount their files.
///
/// Nothing enforces this path; any directory may be registered.
pub const DEFAULT_SECRETS_DIRECTORY: &str = "/vault/secrets";

/// Registers [`SecretKeyValueFileSource`]s on a builder.
///
/// Each method appends exactly one source and hands the builder back for
/// chaining. None of them fail: a missing directory or malformed file is
/// reported when the builder loads.
pub trait SecretKeyValueFileExt: Sized {
    /// Add a required key/value file from `directory_path`.
    ///
    /// Same as [`add_secret_key_value_file_optional`](Self::add_secret_key_value_file_optional)
    /// with `optional = false`.
    fn add_secret_key_value_file(self, directory_path: impl Into<PathBuf>) -> Self {
        self.add_secret_key_value_file_optional(directory_path, false)
    }

    /// Add a key/value file from `directory_path`.
    ///
    /// Same as [`add_secret_key_value_file_with_reload`] with
    /// `reload_on_change = false`.
    ///
    /// [`add_secret_key_value_file_with_reload`]: Self::add_secret_key_value_file_with_reload
    fn add_secret_key_value_file_optional(
        self,
        directory_path: impl Into<PathBuf>,
        optional: bool,
    ) -> Self {
        self.add_secret_key_value_file_with_reload(directory_path, optional, false)
    }

    /// Add a key/value file from `directory_path`.
    ///
    /// A provider rooted at `directory_path` is bound only when the source is
    /// required *and* the directory exists. An optional source is always left
    /// unbound, even if the directory is present, and so falls back to the
    /// builder's base path at load time.
    ///
    /// * `optional` - whether a missing file is tolerated
    /// * `reload_on_change` - whether the file is reloaded when it is
    ///   created, changed or removed
    fn add_secret_key_value_file_with_reload(
        self,
        directory_path: impl Into<PathBuf>,
        optional: bool,
        reload_on_change: bool,
    ) -> Self {
        let directory_path = directory_path.into();
        self.configure_secret_key_value_file(move |source| {
            // Only bind a provider when the source is required and the directory exists.
            if !optional && directory_path.is_dir() {
                source.file_provider = Some(Arc::new(PhysicalFileProvider::new(&directory_path)));
            }
            source.directory_path = directory_path;
            source.optional = optional;
            source.reload_on_change = reload_on_change;
        })
    }

    /// Add a key/value file configured entirely by `configure`.
    ///
    /// `configure` receives a default [`SecretKeyValueFileSource`] and may
    /// set any field; nothing else is filled in.
    fn configure_secret_key_value_file<F>(self, configure: F) -> Self
    where
        F: FnOnce(&mut SecretKeyValueFileSource);
}

impl SecretKeyValueFileExt for ConfigBuilder {
    fn configure_secret_key_value_file<F>(self, configure: F) -> Self
    where
        F: FnOnce(&mut SecretKeyValueFileSource),
    {
        let mut source = SecretKeyValueFileSource::new();
        configure(&mut source);
        self.with_source(source)
    }
}
