//! Tests for config module

use std::path::{Path, PathBuf};

use anuvad::config::Config;
use serial_test::serial;

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_config_toml_readable() {
    let content =
        std::fs::read_to_string("config.toml").expect("Should be able to read config.toml");

    assert!(
        content.contains("[engine]"),
        "config.toml should have [engine] section"
    );
    assert!(
        content.contains("[catalog]"),
        "config.toml should have [catalog] section"
    );
    assert!(
        content.contains("[signal]"),
        "config.toml should have [signal] section"
    );
    assert!(
        content.contains("[sync]"),
        "config.toml should have [sync] section"
    );
    assert!(
        content.contains("[logging]"),
        "config.toml should have [logging] section"
    );
}

#[test]
fn test_config_file_parses() {
    let config = Config::from_file(Path::new("config.toml")).unwrap();
    config.validate().unwrap();

    assert_eq!(config.engine.base_language.as_str(), "en");
    assert_eq!(config.engine.tag_attribute, "data-i18n");
    assert!(config
        .engine
        .attribute_allowlist
        .iter()
        .any(|a| a == "placeholder"));
    assert_eq!(config.catalog.directory, PathBuf::from("locales"));
    assert_eq!(config.catalog.base_url, None);
    assert_eq!(config.signal.poll_interval_ms, 500);
    assert_eq!(config.sync.route_settle_ms, 50);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_from_file_missing_path() {
    assert!(Config::from_file(Path::new("no-such-config.toml")).is_err());
}

#[test]
fn test_from_file_rejects_invalid_toml() {
    let dir = tempfile::TempDir::new().unwrap();

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "this is [ not toml").unwrap();
    assert!(Config::from_file(&broken).is_err());

    // Valid TOML, but missing required sections
    let partial = dir.path().join("partial.toml");
    std::fs::write(&partial, "[logging]\nlevel = \"info\"\nformat = \"text\"\n").unwrap();
    assert!(Config::from_file(&partial).is_err());
}

// ============================================================================
// Environment Tests
// ============================================================================

const ENV_VARS: [&str; 11] = [
    "ANUVAD_BASE_LANGUAGE",
    "ANUVAD_ATTRIBUTES",
    "ANUVAD_TAG_ATTRIBUTE",
    "ANUVAD_CATALOG_DIR",
    "ANUVAD_CATALOG_URL",
    "ANUVAD_REQUEST_TIMEOUT",
    "ANUVAD_STORE_PATH",
    "ANUVAD_POLL_INTERVAL_MS",
    "ANUVAD_ROUTE_SETTLE_MS",
    "ANUVAD_LOG_LEVEL",
    "ANUVAD_LOG_FORMAT",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    let defaults = Config::default();

    assert_eq!(config.engine.base_language.as_str(), "en");
    assert_eq!(
        config.engine.attribute_allowlist,
        defaults.engine.attribute_allowlist
    );
    assert_eq!(config.engine.tag_attribute, "data-i18n");
    assert_eq!(config.catalog.directory, defaults.catalog.directory);
    assert_eq!(config.catalog.base_url, None);
    assert_eq!(config.catalog.request_timeout_secs, 10);
    assert_eq!(config.signal.poll_interval_ms, 500);
    assert_eq!(config.sync.route_settle_ms, 50);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("ANUVAD_BASE_LANGUAGE", "HI");
    std::env::set_var("ANUVAD_ATTRIBUTES", "Placeholder, Alt");
    std::env::set_var("ANUVAD_TAG_ATTRIBUTE", "data-key");
    std::env::set_var("ANUVAD_CATALOG_DIR", "custom-locales");
    std::env::set_var("ANUVAD_CATALOG_URL", "https://cdn.example.com/locales");
    std::env::set_var("ANUVAD_REQUEST_TIMEOUT", "3");
    std::env::set_var("ANUVAD_STORE_PATH", "/tmp/anuvad/language.json");
    std::env::set_var("ANUVAD_POLL_INTERVAL_MS", "100");
    std::env::set_var("ANUVAD_ROUTE_SETTLE_MS", "5");
    std::env::set_var("ANUVAD_LOG_LEVEL", "debug");
    std::env::set_var("ANUVAD_LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    clear_env();

    // Language codes and attribute names normalize to lowercase
    assert_eq!(config.engine.base_language.as_str(), "hi");
    assert_eq!(
        config.engine.attribute_allowlist,
        vec!["placeholder".to_string(), "alt".to_string()]
    );
    assert_eq!(config.engine.tag_attribute, "data-key");
    assert_eq!(config.catalog.directory, PathBuf::from("custom-locales"));
    assert_eq!(
        config.catalog.base_url.as_deref(),
        Some("https://cdn.example.com/locales")
    );
    assert_eq!(config.catalog.request_timeout_secs, 3);
    assert_eq!(
        config.signal.store_path,
        PathBuf::from("/tmp/anuvad/language.json")
    );
    assert_eq!(config.signal.poll_interval_ms, 100);
    assert_eq!(config.sync.route_settle_ms, 5);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_ignores_unparseable_values() {
    clear_env();
    std::env::set_var("ANUVAD_BASE_LANGUAGE", "!!not a code!!");
    std::env::set_var("ANUVAD_REQUEST_TIMEOUT", "soon");
    std::env::set_var("ANUVAD_POLL_INTERVAL_MS", "-5");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.engine.base_language.as_str(), "en");
    assert_eq!(config.catalog.request_timeout_secs, 10);
    assert_eq!(config.signal.poll_interval_ms, 500);
}

#[test]
#[serial]
fn test_from_env_blank_attribute_list() {
    clear_env();
    std::env::set_var("ANUVAD_ATTRIBUTES", " , ,");

    let config = Config::from_env().unwrap();
    clear_env();

    // Nothing but separators means no attribute slots at all
    assert!(config.engine.attribute_allowlist.is_empty());
    assert!(config.validate().is_ok());
}
