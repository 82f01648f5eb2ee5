//! Integration tests for configuration loading and graceful degradation
//!
//! Tests cover:
//! - Missing config files do not prevent startup
//! - Malformed config files fall back to defaults
//! - Priority order for data folder resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that touch SHELF_DATA_FOLDER or SHELF_CONFIG are marked #[serial].

use serial_test::serial;
use shelf_common::config::{
    default_data_folder, resolve_data_folder, TomlConfig, CONFIG_FILE_ENV, DATA_FOLDER_ENV,
};
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(DATA_FOLDER_ENV);

    let folder = resolve_data_folder(None, &TomlConfig::default());
    assert_eq!(folder, default_data_folder());
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(DATA_FOLDER_ENV, "/tmp/shelf-env-folder");
    let config = TomlConfig {
        data_folder: Some(PathBuf::from("/tmp/shelf-toml-folder")),
        ..TomlConfig::default()
    };

    let folder = resolve_data_folder(None, &config);
    env::remove_var(DATA_FOLDER_ENV);

    assert_eq!(folder, PathBuf::from("/tmp/shelf-env-folder"));
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(DATA_FOLDER_ENV, "/tmp/shelf-env-folder");

    let folder = resolve_data_folder(Some(Path::new("/tmp/shelf-cli")), &TomlConfig::default());
    env::remove_var(DATA_FOLDER_ENV);

    assert_eq!(folder, PathBuf::from("/tmp/shelf-cli"));
}

#[test]
#[serial]
fn test_resolver_toml_used_without_env() {
    env::remove_var(DATA_FOLDER_ENV);
    let config = TomlConfig {
        data_folder: Some(PathBuf::from("/tmp/shelf-toml-folder")),
        ..TomlConfig::default()
    };

    assert_eq!(
        resolve_data_folder(None, &config),
        PathBuf::from("/tmp/shelf-toml-folder")
    );
}

#[test]
#[serial]
fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 6001\nworker_timeout_ms = 250\n").unwrap();

    let config = TomlConfig::load_or_default(Some(&path));
    assert_eq!(config.port, 6001);
    assert_eq!(config.worker_timeout_ms, 250);
}

#[test]
#[serial]
fn test_load_from_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelf.toml");
    std::fs::write(&path, "prefs_debounce_ms = 20\n").unwrap();

    env::set_var(CONFIG_FILE_ENV, &path);
    let config = TomlConfig::load_or_default(None);
    env::remove_var(CONFIG_FILE_ENV);

    assert_eq!(config.prefs_debounce_ms, 20);
}

#[test]
#[serial]
fn test_malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    let config = TomlConfig::load_or_default(Some(&path));
    assert_eq!(config.port, TomlConfig::default().port);
}

#[test]
#[serial]
fn test_malformed_file_reported_to_caller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let (config, warning) = TomlConfig::load(Some(&path));
    assert_eq!(config.port, TomlConfig::default().port);
    let warning = warning.expect("malformed file should produce a warning");
    assert!(warning.starts_with("Ignoring config file"));
    assert!(warning.contains("config.toml"));
}

#[test]
#[serial]
fn test_valid_file_has_no_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 6002\n").unwrap();

    let (config, warning) = TomlConfig::load(Some(&path));
    assert_eq!(config.port, 6002);
    assert!(warning.is_none());
}

#[test]
#[serial]
fn test_missing_explicit_file_falls_back_to_defaults() {
    let config = TomlConfig::load_or_default(Some(Path::new("/nonexistent/shelf/config.toml")));
    assert_eq!(config.cache_ttl_secs, 300);
}
