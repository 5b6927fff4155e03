//! Error types for secret-kv-config.

use std::path::PathBuf;

/// Result type alias for secret-kv-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or reading configuration.
///
/// Registration never fails; every variant here surfaces from `build`,
/// `reload` or a typed read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to load or merge configuration from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// A required source resolved to a file that does not exist.
    #[error("The configuration file '{}' was not found and is not optional", .path.display())]
    MissingRequiredSource {
        /// Fully resolved path of the missing file
        path: PathBuf,
    },

    /// A key/value file contained a malformed line.
    #[error("Failed to parse '{}' at line {line}: {reason}", .path.display())]
    ParseError {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// No source provided the requested key.
    #[error("Configuration key not found: {0}")]
    KeyNotFound(String),

    /// Failed to deserialize configuration into the requested type.
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),

    /// File watching failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}
