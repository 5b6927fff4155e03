//! # secret-kv-config
//!
//! Configuration from key/value properties files mounted in a secrets
//! directory.
//!
//! ## Overview
//!
//! Secret-injection sidecars (Vault Agent and friends) render secrets as a
//! plain `application.properties` file in a shared volume, typically
//! `/vault/secrets`. This crate registers that file as a configuration
//! source:
//! - `key=value` lines become configuration keys (`Db:Password` and
//!   `db.password` address the same entry)
//! - required or optional sources, with missing-file errors deferred to load
//! - optional reload-on-change with subscriber notifications
//! - lock-free reads of the merged values using `arc-swap`
//!
//! The crate never fetches, decrypts or rotates secrets itself; it only reads
//! what is already on disk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use secret_kv_config::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Database {
//!     user: String,
//!     password: String,
//! }
//!
//! # async fn example() -> secret_kv_config::error::Result<()> {
//! let config = ConfigBuilder::new()
//!     .add_secret_key_value_file_with_reload(DEFAULT_SECRETS_DIRECTORY, false, true)
//!     .build()
//!     .await?;
//!
//! let db: Database = config.get("database")?;
//! println!("connecting as {}", db.user);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): reload-on-change via `notify` and `tokio`.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extensions;
pub mod sources;

#[cfg(feature = "file-watch")]
pub mod notify;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigBuilder, Configuration};
    pub use crate::error::{ConfigError, Result};
    pub use crate::extensions::{DEFAULT_SECRETS_DIRECTORY, SecretKeyValueFileExt};
    pub use crate::sources::{ConfigSource, SecretKeyValueFileSource};
}
