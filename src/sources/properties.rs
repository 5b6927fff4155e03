//! Parser for `key=value` properties files.
//!
//! The accepted format is deliberately small:
//!
//! ```text
//! # comment
//! ! also a comment
//! database.url = postgres://db:5432/app
//! ConnectionStrings:Default=Server=db;User=app
//! ```
//!
//! Each line splits on its first `=`. Keys are trimmed, lowercased and have
//! `:` mapped to `.`, so `ConnectionStrings:Default` becomes
//! `connectionstrings.default`. Values are trimmed and kept verbatim
//! otherwise.
//!
//! Every `.`-separated key segment must be non-empty and made of ASCII
//! letters, digits, `_` or `-`. When a key repeats, the last occurrence wins.
//! A key may not be both a value and the parent of other keys (`db` next to
//! `db.password`); that is reported on the later of the two lines.

use std::collections::BTreeMap;

/// A malformed line in a properties file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct SyntaxError {
    /// 1-based line number
    pub line: usize,
    /// What was wrong with the line
    pub reason: String,
}

/// Parse properties-file content into normalized key/value pairs.
///
/// # Errors
///
/// Returns a [`SyntaxError`] for a non-comment line with no `=`, an empty
/// key, a key with an unsupported character or empty segment, or a key that
/// collides with an entry nested under it (or above it).
///
/// # Examples
///
/// ```rust
/// use secret_kv_config::sources::properties;
///
/// let entries = properties::parse("# secrets\nDb:Password = hunter2\n").unwrap();
/// assert_eq!(entries.get("db.password").map(String::as_str), Some("hunter2"));
///
/// let err = properties::parse("db=primary\ndb.password=hunter2\n").unwrap_err();
/// assert_eq!(err.line, 2);
/// ```
pub fn parse(content: &str) -> Result<BTreeMap<String, String>, SyntaxError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    // key -> (line, value)
    let mut entries: BTreeMap<String, (usize, String)> = BTreeMap::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| SyntaxError {
            line,
            reason: "expected 'key=value'".to_string(),
        })?;

        let key = normalize_key(key);
        if key.is_empty() {
            return Err(SyntaxError {
                line,
                reason: "key is empty".to_string(),
            });
        }
        validate_key(&key).map_err(|reason| SyntaxError { line, reason })?;

        if let Some((other, other_line)) = nesting_conflict(&entries, &key) {
            return Err(SyntaxError {
                line,
                reason: format!(
                    "key '{}' conflicts with '{}' on line {}: values cannot have nested keys",
                    key, other, other_line
                ),
            });
        }

        entries.insert(key, (line, value.trim().to_string()));
    }

    Ok(entries
        .into_iter()
        .map(|(key, (_, value))| (key, value))
        .collect())
}

/// Check every segment against the characters config paths accept.
fn validate_key(key: &str) -> Result<(), String> {
    for segment in key.split('.') {
        if segment.is_empty() {
            return Err(format!("key '{}' has an empty segment", key));
        }
        let invalid = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'));
        if let Some(c) = invalid {
            return Err(format!("invalid character '{}' in key '{}'", c, key));
        }
    }
    Ok(())
}

/// Find an existing key that is an ancestor or descendant of `key`.
fn nesting_conflict<'a>(
    entries: &'a BTreeMap<String, (usize, String)>,
    key: &str,
) -> Option<(&'a str, usize)> {
    let ancestor = key
        .match_indices('.')
        .find_map(|(i, _)| entries.get_key_value(&key[..i]));
    if let Some((other, (line, _))) = ancestor {
        return Some((other.as_str(), *line));
    }

    // Descendants of `key` sort directly after `key.`.
    let prefix = format!("{}.", key);
    entries
        .range(prefix.clone()..)
        .next()
        .filter(|(other, _)| other.starts_with(&prefix))
        .map(|(other, (line, _))| (other.as_str(), *line))
}

/// Normalize a key the same way parsed keys are normalized.
///
/// Lookups on [`Configuration`](crate::core::Configuration) go through this,
/// so `Db:Password`, `DB.PASSWORD` and `db.password` all address the same
/// entry.
pub fn normalize_key(key: &str) -> String {
    key.trim().replace(':', ".").to_lowercase()
}
