//! Config file loading tests
//!
//! Exercises TOML and YAML files on disk, validation failures and IO errors.

use issueq_config::{ConfigError, ConfigLoader, QueryConfig};
use std::io::Write;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create config file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config file");
    path
}

#[tokio::test]
async fn test_load_toml_field_mappings() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "issueq.toml",
        r#"
[fields]
jira_defaults = false

[fields.mappings]
"id" = "id"
"fields.customfield_10800" = "cf[10800]"

[logging]
filter = "issueq_query=debug"
"#,
    );

    let config = ConfigLoader::load_from_file(&path).await.unwrap();

    assert!(!config.fields.jira_defaults);
    assert_eq!(config.fields.mappings.len(), 2);
    assert_eq!(
        config.fields.mappings.get("fields.customfield_10800"),
        Some(&"cf[10800]".to_string())
    );
}

#[tokio::test]
async fn test_load_yaml_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "issueq.yaml",
        r#"
fields:
  mappings:
    fields.epic.key: epic
logging:
  with_target: false
"#,
    );

    let config = ConfigLoader::load_from_file(&path).await.unwrap();

    assert!(config.fields.jira_defaults);
    assert_eq!(
        config.fields.mappings.get("fields.epic.key"),
        Some(&"epic".to_string())
    );
    assert!(!config.logging.with_target);
}

#[tokio::test]
async fn test_empty_file_yields_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "issueq.toml", "");

    let config = ConfigLoader::from_toml_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(config, QueryConfig::default());
}

#[tokio::test]
async fn test_invalid_mapping_fails_validation() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "issueq.toml",
        r#"
[fields.mappings]
"fields..name" = "assignee"
"#,
    );

    let result = ConfigLoader::load_from_file(&path).await;

    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[tokio::test]
async fn test_malformed_toml_reports_parse_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "issueq.toml", "[fields\njira_defaults = ");

    let result = ConfigLoader::load_from_file(&path).await;

    assert!(matches!(result, Err(ConfigError::Parse { format: "TOML", .. })));
}

#[tokio::test]
async fn test_missing_file_reports_io_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("absent.toml");

    let result = ConfigLoader::load_from_file(&path).await;

    match result {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected IO error, got {:?}", other),
    }
}
