//! Language catalogs and the degradation-first loader
//!
//! A catalog is an immutable map from base-language source strings (and
//! explicit lookup keys) to translated strings for one target language.
//! Loading never fails from the caller's point of view: a missing file, an
//! unreachable host, or a malformed payload all collapse into an empty
//! catalog, which downstream code treats as "no translations available".

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod error;
pub mod source;

pub use error::{CatalogError, CatalogResult};
pub use source::{CatalogSource, DirectorySource, HttpSource, StaticSource};

use crate::models::LanguageCode;
use crate::utils::{sha256_hex, truncate_text};

/// An immutable translation table for one language
#[derive(Debug, Clone)]
pub struct Catalog {
    language: LanguageCode,
    entries: HashMap<String, String>,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Build a catalog from already-validated entries
    pub fn new(language: LanguageCode, entries: HashMap<String, String>) -> Self {
        let fingerprint = fingerprint_entries(&entries);
        Self {
            language,
            entries,
            fingerprint,
            loaded_at: Utc::now(),
        }
    }

    /// The empty catalog: every lookup misses
    pub fn empty(language: LanguageCode) -> Self {
        Self::new(language, HashMap::new())
    }

    /// Decode a catalog from raw JSON
    ///
    /// The top level must be an object. Entries with blank keys, blank
    /// values, or non-string values are skipped with a warning; they never
    /// poison the rest of the catalog.
    pub fn from_value(language: LanguageCode, value: Value) -> CatalogResult<Self> {
        let Value::Object(map) = value else {
            return Err(CatalogError::invalid_shape("top-level JSON is not an object"));
        };

        let mut entries = HashMap::with_capacity(map.len());
        for (key, val) in map {
            if key.trim().is_empty() {
                warn!(language = %language, "Skipping catalog entry with blank key");
                continue;
            }
            match val {
                Value::String(s) if !s.trim().is_empty() => {
                    entries.insert(key, s);
                }
                Value::String(_) => {
                    warn!(
                        language = %language,
                        key = %truncate_text(&key, 60),
                        "Skipping catalog entry with blank translation"
                    );
                }
                other => {
                    warn!(
                        language = %language,
                        key = %truncate_text(&key, 60),
                        kind = json_kind(&other),
                        "Skipping non-string catalog entry"
                    );
                }
            }
        }

        Ok(Self::new(language, entries))
    }

    /// The language this catalog translates into
    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// Look up the translation for a source string or lookup key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of usable entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(source, translation)` pairs in arbitrary order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Content fingerprint, stable across entry ordering
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// When this catalog was constructed
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Loads catalogs from a source, degrading every failure to an empty catalog
///
/// The loader is the implementation of "localization must never break the
/// page": callers get a catalog back no matter what happened underneath.
#[derive(Clone)]
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Load the catalog for a language
    ///
    /// Never fails. A missing resource is routine (logged at debug); any
    /// other failure is logged at warn. Both produce an empty catalog.
    pub async fn load(&self, language: &LanguageCode) -> Catalog {
        let raw = match self.source.fetch(language).await {
            Ok(raw) => raw,
            Err(e) if e.is_missing() => {
                debug!(
                    language = %language,
                    source = %self.source.describe(),
                    "No catalog for language; using empty catalog"
                );
                return Catalog::empty(language.clone());
            }
            Err(e) => {
                warn!(
                    language = %language,
                    source = %self.source.describe(),
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Catalog load failed; using empty catalog"
                );
                return Catalog::empty(language.clone());
            }
        };

        match Catalog::from_value(language.clone(), raw) {
            Ok(catalog) => {
                debug!(
                    language = %language,
                    entries = catalog.len(),
                    fingerprint = %truncate_text(catalog.fingerprint(), 12),
                    "Catalog loaded"
                );
                catalog
            }
            Err(e) => {
                warn!(
                    language = %language,
                    source = %self.source.describe(),
                    error = %e,
                    "Catalog is malformed; using empty catalog"
                );
                Catalog::empty(language.clone())
            }
        }
    }

    /// Languages the underlying source can currently serve
    pub async fn languages(&self) -> CatalogResult<Vec<LanguageCode>> {
        self.source.languages().await
    }

    /// Description of the underlying source, for logs and CLI output
    pub fn describe_source(&self) -> String {
        self.source.describe()
    }
}

fn fingerprint_entries(entries: &HashMap<String, String>) -> String {
    let mut keys: Vec<_> = entries.keys().collect();
    keys.sort();

    let mut canonical = String::new();
    for key in keys {
        canonical.push_str(key);
        canonical.push('\u{1f}');
        canonical.push_str(&entries[key]);
        canonical.push('\u{1e}');
    }

    sha256_hex(canonical.as_bytes())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
