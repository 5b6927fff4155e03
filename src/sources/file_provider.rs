//! File access abstraction used by file-backed sources.

use crate::error::Result;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read access to files beneath a root directory.
///
/// Sources resolve their file through a provider instead of touching the
/// filesystem directly, so the root can be bound at registration time or
/// defaulted later by the builder.
pub trait FileProvider: Send + Sync + fmt::Debug {
    /// The directory this provider is rooted at.
    fn root(&self) -> &Path;

    /// Read `subpath` as UTF-8.
    ///
    /// Returns `Ok(None)` when the file (or the root directory itself) does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for any other I/O failure, such as missing
    /// permissions or invalid UTF-8.
    fn read_to_string(&self, subpath: &str) -> Result<Option<String>>;
}

/// A [`FileProvider`] backed by the local filesystem.
///
/// Construction never touches the disk; a provider rooted at a missing
/// directory simply reports every file as absent.
///
/// # Examples
///
/// ```rust
/// use secret_kv_config::sources::{FileProvider, PhysicalFileProvider};
///
/// let provider = PhysicalFileProvider::new("/vault/secrets");
/// assert_eq!(provider.root().to_str(), Some("/vault/secrets"));
/// // Paths never escape the root.
/// assert_eq!(provider.read_to_string("../etc/passwd").unwrap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalFileProvider {
    root: PathBuf,
}

impl PhysicalFileProvider {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map `subpath` onto the root, rejecting anything that could leave it.
    fn resolve(&self, subpath: &str) -> Option<PathBuf> {
        let relative = Path::new(subpath.trim_start_matches(['/', '\\']));
        if relative.as_os_str().is_empty() {
            return None;
        }

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }

        Some(self.root.join(relative))
    }
}

impl FileProvider for PhysicalFileProvider {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read_to_string(&self, subpath: &str) -> Result<Option<String>> {
        let Some(path) = self.resolve(subpath) else {
            return Ok(None);
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            // A directory where the file should be counts as absent.
            Err(_) if path.is_dir() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("application.properties"), "foo=bar").unwrap();

        let provider = PhysicalFileProvider::new(temp_dir.path());
        assert_eq!(
            provider.read_to_string("application.properties").unwrap(),
            Some("foo=bar".to_string())
        );
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let provider = PhysicalFileProvider::new(temp_dir.path());

        assert_eq!(provider.read_to_string("application.properties").unwrap(), None);
    }

    #[test]
    fn test_missing_root_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let provider = PhysicalFileProvider::new(temp_dir.path().join("missing"));

        assert_eq!(provider.read_to_string("application.properties").unwrap(), None);
    }

    #[test]
    fn test_directory_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("application.properties")).unwrap();

        let provider = PhysicalFileProvider::new(temp_dir.path());
        assert_eq!(provider.read_to_string("application.properties").unwrap(), None);
    }

    #[test]
    fn test_parent_components_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let inner = temp_dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(temp_dir.path().join("outside.properties"), "a=b").unwrap();

        let provider = PhysicalFileProvider::new(&inner);
        assert_eq!(provider.read_to_string("../outside.properties").unwrap(), None);
    }

    #[test]
    fn test_leading_separator_stays_under_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("app.properties"), "a=b").unwrap();

        let provider = PhysicalFileProvider::new(temp_dir.path());
        assert_eq!(
            provider.read_to_string("/app.properties").unwrap(),
            Some("a=b".to_string())
        );
    }

    #[test]
    fn test_empty_subpath() {
        let provider = PhysicalFileProvider::new("/tmp");
        assert_eq!(provider.read_to_string("").unwrap(), None);
    }
}
