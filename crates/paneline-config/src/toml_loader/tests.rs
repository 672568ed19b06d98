//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use crate::schema::RepeatReadyPolicy;
use paneline_common::ConfigError;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_paneline_config.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[transport]
inline_threshold = 1024

[dialog]
display_in_iframe = true
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.transport.inline_threshold, 1024);
    assert!(config.dialog.display_in_iframe);
    // Defaults preserved
    assert_eq!(config.dialog.height_percent, 60);
    assert_eq!(config.handshake.repeat_ready, RepeatReadyPolicy::Resend);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn load_config_with_invalid_values_is_returned_as_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[dialog]
width_percent = 150
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.dialog.width_percent, 150);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paneline").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.transport.inline_threshold, 2048);
    assert_eq!(config.store.max_age_secs, 300);
}

#[test]
fn default_template_parses_and_validates() {
    let content = template::default_config_toml();
    let config: crate::PanelineConfig = toml::from_str(&content).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_config_path_ends_with_config_toml() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("paneline/config.toml"));
    }
}
