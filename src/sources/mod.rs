//! Configuration source implementations.

mod config_source;
mod file_provider;
pub mod properties;
mod secret_file;

pub use config_source::{ConfigSource, WatchTarget};
pub use file_provider::{FileProvider, PhysicalFileProvider};
pub use secret_file::{DEFAULT_FILE_NAME, DEFAULT_RELOAD_DELAY, SecretKeyValueFileSource};
