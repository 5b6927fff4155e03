//! Integration tests for loading key/value secrets files.

use secret_kv_config::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_properties(dir: &Path, content: &str) {
    fs::write(dir.join("application.properties"), content).unwrap();
}

#[tokio::test]
async fn test_required_source_resolves_keys() {
    let secrets = TempDir::new().unwrap();
    write_properties(secrets.path(), "foo=bar\n");

    let config = ConfigBuilder::new()
        .add_secret_key_value_file_with_reload(secrets.path(), false, false)
        .build()
        .await
        .unwrap();

    assert_eq!(config.get_string("foo"), Some("bar".to_string()));
}

#[tokio::test]
async fn test_optional_missing_directory_loads_nothing() {
    let secrets = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();

    let config = ConfigBuilder::new()
        .with_base_path(base.path())
        .add_secret_key_value_file_with_reload(secrets.path().join("missing"), true, false)
        .build()
        .await
        .unwrap();

    assert!(!config.contains_key("foo"));
    assert_eq!(config.source_names().len(), 1);
}

#[tokio::test]
async fn test_required_missing_directory_fails_at_build() {
    let secrets = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();

    let result = ConfigBuilder::new()
        .with_base_path(base.path())
        .add_secret_key_value_file(secrets.path().join("missing"))
        .build()
        .await;

    match result {
        Err(ConfigError::MissingRequiredSource { path }) => {
            // The unbound source fell back to the base path.
            assert_eq!(path, base.path().join("application.properties"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a missing required source error"),
    }
}

#[tokio::test]
async fn test_required_existing_directory_without_file_fails() {
    let secrets = TempDir::new().unwrap();

    let result = ConfigBuilder::new()
        .add_secret_key_value_file(secrets.path())
        .build()
        .await;

    let expected = secrets.path().join("application.properties");
    assert!(matches!(
        result,
        Err(ConfigError::MissingRequiredSource { path }) if path == expected
    ));
}

#[tokio::test]
async fn test_optional_existing_directory_reads_from_base_path() {
    let secrets = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    write_properties(secrets.path(), "origin=secrets\n");
    write_properties(base.path(), "origin=base\n");

    let config = ConfigBuilder::new()
        .with_base_path(base.path())
        .add_secret_key_value_file_optional(secrets.path(), true)
        .build()
        .await
        .unwrap();

    // An optional registration never binds its own directory.
    assert_eq!(config.get_string("origin"), Some("base".to_string()));
}

#[tokio::test]
async fn test_configured_source_reads_custom_file() {
    let secrets = TempDir::new().unwrap();
    fs::write(secrets.path().join("db.properties"), "db.user=app\n").unwrap();
    let dir = secrets.path().to_path_buf();

    let config = ConfigBuilder::new()
        .configure_secret_key_value_file(move |source| {
            source.file_provider = Some(std::sync::Arc::new(
                secret_kv_config::sources::PhysicalFileProvider::new(&dir),
            ));
            source.file_name = "db.properties".to_string();
        })
        .build()
        .await
        .unwrap();

    assert_eq!(config.get_string("db.user"), Some("app".to_string()));
}

#[tokio::test]
async fn test_malformed_file_reports_line() {
    let secrets = TempDir::new().unwrap();
    write_properties(secrets.path(), "# header\nvalid=1\nthis line is broken\n");

    let result = ConfigBuilder::new()
        .add_secret_key_value_file(secrets.path())
        .build()
        .await;

    assert!(matches!(result, Err(ConfigError::ParseError { line: 3, .. })));
}

#[tokio::test]
async fn test_value_and_nested_key_in_one_file_is_rejected() {
    let secrets = TempDir::new().unwrap();
    write_properties(secrets.path(), "db=primary\ndb.password=s3cret\n");

    for _ in 0..10 {
        let result = ConfigBuilder::new()
            .add_secret_key_value_file(secrets.path())
            .build()
            .await;

        match result {
            Err(ConfigError::ParseError { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("'db' on line 1"), "{}", reason);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("conflicting keys were accepted"),
        }
    }
}

#[tokio::test]
async fn test_nested_keys_in_later_directory_replace_value() {
    let shared = TempDir::new().unwrap();
    let service = TempDir::new().unwrap();
    write_properties(shared.path(), "db=primary\n");
    write_properties(service.path(), "db.password=s3cret\n");

    for _ in 0..10 {
        let config = ConfigBuilder::new()
            .add_secret_key_value_file(shared.path())
            .add_secret_key_value_file(service.path())
            .build()
            .await
            .unwrap();

        assert_eq!(config.get_string("db.password"), Some("s3cret".to_string()));
        assert_eq!(config.get_string("db"), None);
    }
}

#[tokio::test]
async fn test_unsupported_key_characters_report_line() {
    for (key, bad) in [("spring/datasource", '/'), ("api@key", '@'), ("a[b", '[')] {
        let secrets = TempDir::new().unwrap();
        write_properties(secrets.path(), &format!("# header\nok=1\n{}=v\n", key));

        let result = ConfigBuilder::new()
            .add_secret_key_value_file(secrets.path())
            .build()
            .await;

        match result {
            Err(ConfigError::ParseError { line, reason, .. }) => {
                assert_eq!(line, 3, "{}", key);
                assert!(
                    reason.contains(&format!("invalid character '{}'", bad)),
                    "{}",
                    reason
                );
            }
            Err(e) => panic!("unexpected error for '{}': {}", key, e),
            Ok(_) => panic!("key '{}' was accepted", key),
        }
    }
}

#[tokio::test]
async fn test_later_directory_overrides_earlier() {
    let shared = TempDir::new().unwrap();
    let service = TempDir::new().unwrap();
    write_properties(shared.path(), "db.host=shared-db\ndb.user=shared\n");
    write_properties(service.path(), "db.user=service\n");

    let config = ConfigBuilder::new()
        .add_secret_key_value_file(shared.path())
        .add_secret_key_value_file(service.path())
        .build()
        .await
        .unwrap();

    assert_eq!(config.get_string("db.host"), Some("shared-db".to_string()));
    assert_eq!(config.get_string("db.user"), Some("service".to_string()));
}

#[tokio::test]
async fn test_typed_section() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Database {
        host: String,
        port: u16,
        password: String,
    }

    let secrets = TempDir::new().unwrap();
    write_properties(
        secrets.path(),
        r#"
# rendered by the secrets sidecar
Database:Host = db.internal
Database:Port = 5432
Database:Password = p@ss=word
"#,
    );

    let config = ConfigBuilder::new()
        .add_secret_key_value_file(secrets.path())
        .build()
        .await
        .unwrap();

    let db: Database = config.get("Database").unwrap();
    assert_eq!(
        db,
        Database {
            host: "db.internal".to_string(),
            port: 5432,
            password: "p@ss=word".to_string(),
        }
    );
}

#[tokio::test]
async fn test_manual_reload() {
    let secrets = TempDir::new().unwrap();
    write_properties(secrets.path(), "token=v1\n");

    let config = ConfigBuilder::new()
        .add_secret_key_value_file(secrets.path())
        .build()
        .await
        .unwrap();
    assert_eq!(config.get_string("token"), Some("v1".to_string()));

    write_properties(secrets.path(), "token=v2\n");
    config.reload().await.unwrap();
    assert_eq!(config.get_string("token"), Some("v2".to_string()));
}

#[tokio::test]
async fn test_reload_after_file_removed_keeps_old_values() {
    let secrets = TempDir::new().unwrap();
    write_properties(secrets.path(), "token=v1\n");

    let config = ConfigBuilder::new()
        .add_secret_key_value_file(secrets.path())
        .build()
        .await
        .unwrap();

    fs::remove_file(secrets.path().join("application.properties")).unwrap();
    assert!(config.reload().await.is_err());
    assert_eq!(config.get_string("token"), Some("v1".to_string()));
}
