//! Configuration management for the anuvad localization engine
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use crate::models::LanguageCode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Rewrite engine configuration
    pub engine: EngineConfig,

    /// Catalog source configuration
    pub catalog: CatalogConfig,

    /// Language signal configuration
    pub signal: SignalConfig,

    /// Synchronization controller configuration
    pub sync: SyncConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Rewrite engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base language; content authored in it is restored, never rewritten
    pub base_language: LanguageCode,

    /// Attribute names rewritten when present on any element
    pub attribute_allowlist: Vec<String>,

    /// Attribute carrying an explicit catalog lookup key
    pub tag_attribute: String,

    /// Elements whose subtrees are never visited
    pub skip_containers: Vec<String>,
}

/// Catalog source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding per-language JSON catalogs ({lang}.json)
    pub directory: PathBuf,

    /// Remote catalog root; when set, catalogs are fetched from
    /// {base_url}/{lang}.json instead of the directory
    pub base_url: Option<String>,

    /// Request timeout in seconds for remote fetches
    pub request_timeout_secs: u64,
}

/// Language signal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Path of the persisted language selection
    pub store_path: PathBuf,

    /// Poll interval in milliseconds for out-of-process signal changes
    pub poll_interval_ms: u64,
}

/// Synchronization controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Delay in milliseconds before re-running after a route change,
    /// letting freshly mounted content land first
    pub route_settle_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let base_language = std::env::var("ANUVAD_BASE_LANGUAGE")
            .ok()
            .and_then(|v| v.parse::<LanguageCode>().ok())
            .unwrap_or_else(LanguageCode::english);

        let attribute_allowlist = std::env::var("ANUVAD_ATTRIBUTES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| default_attribute_allowlist());

        let tag_attribute =
            std::env::var("ANUVAD_TAG_ATTRIBUTE").unwrap_or_else(|_| String::from("data-i18n"));

        let catalog_dir = std::env::var("ANUVAD_CATALOG_DIR")
            .unwrap_or_else(|_| String::from("locales"))
            .into();

        let catalog_url = std::env::var("ANUVAD_CATALOG_URL").ok();

        let request_timeout_secs = std::env::var("ANUVAD_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let store_path = std::env::var("ANUVAD_STORE_PATH")
            .unwrap_or_else(|_| String::from("data/language.json"))
            .into();

        let poll_interval_ms = std::env::var("ANUVAD_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(500);

        let route_settle_ms = std::env::var("ANUVAD_ROUTE_SETTLE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(50);

        let log_level = std::env::var("ANUVAD_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("ANUVAD_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            engine: EngineConfig {
                base_language,
                attribute_allowlist,
                tag_attribute,
                skip_containers: default_skip_containers(),
            },
            catalog: CatalogConfig {
                directory: catalog_dir,
                base_url: catalog_url,
                request_timeout_secs,
            },
            signal: SignalConfig {
                store_path,
                poll_interval_ms,
            },
            sync: SyncConfig { route_settle_ms },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.engine.tag_attribute.trim().is_empty() {
            anyhow::bail!("tag_attribute must not be empty");
        }

        if self.engine.attribute_allowlist.iter().any(|a| a.trim().is_empty()) {
            anyhow::bail!("attribute_allowlist must not contain empty names");
        }

        if self.catalog.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.signal.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.request_timeout_secs)
    }

    /// Get signal poll interval as Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.signal.poll_interval_ms)
    }

    /// Get route settle delay as Duration
    #[must_use]
    pub fn route_settle(&self) -> Duration {
        Duration::from_millis(self.sync.route_settle_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                base_language: LanguageCode::english(),
                attribute_allowlist: default_attribute_allowlist(),
                tag_attribute: String::from("data-i18n"),
                skip_containers: default_skip_containers(),
            },
            catalog: CatalogConfig {
                directory: PathBuf::from("locales"),
                base_url: None,
                request_timeout_secs: 10,
            },
            signal: SignalConfig {
                store_path: PathBuf::from("data/language.json"),
                poll_interval_ms: 500,
            },
            sync: SyncConfig { route_settle_ms: 50 },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

fn default_attribute_allowlist() -> Vec<String> {
    vec![
        String::from("placeholder"),
        String::from("title"),
        String::from("alt"),
        String::from("aria-label"),
    ]
}

fn default_skip_containers() -> Vec<String> {
    vec![
        String::from("script"),
        String::from("style"),
        String::from("noscript"),
        String::from("template"),
    ]
}
