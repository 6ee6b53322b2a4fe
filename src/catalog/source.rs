//! Catalog sources: where per-language translation tables come from
//!
//! A source only hands back raw JSON; decoding and hygiene live in
//! [`Catalog::from_value`](crate::catalog::Catalog::from_value). Sources are
//! fallible, but the [`CatalogLoader`](crate::catalog::CatalogLoader) absorbs
//! every failure into an empty catalog, so a broken source degrades the page
//! to base-language content instead of taking anything down.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::models::LanguageCode;

/// Trait for catalog sources
///
/// Implement this trait to plug in a custom catalog backing store.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable identifier used in logs
    fn describe(&self) -> String;

    /// Fetch the raw catalog JSON for a language
    async fn fetch(&self, language: &LanguageCode) -> CatalogResult<Value>;

    /// List the languages this source can currently serve
    ///
    /// Sources that cannot enumerate (e.g. a remote CDN) return an empty list.
    async fn languages(&self) -> CatalogResult<Vec<LanguageCode>> {
        Ok(Vec::new())
    }
}

/// Catalog source backed by a directory of `{lang}.json` files
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the catalog file for a language
    fn catalog_path(&self, language: &LanguageCode) -> PathBuf {
        self.root.join(format!("{language}.json"))
    }
}

#[async_trait]
impl CatalogSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    async fn fetch(&self, language: &LanguageCode) -> CatalogResult<Value> {
        let path = self.catalog_path(language);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CatalogError::not_found(language.clone()));
            }
            Err(e) => return Err(CatalogError::io(path, e)),
        };

        Ok(serde_json::from_str(&content)?)
    }

    async fn languages(&self) -> CatalogResult<Vec<LanguageCode>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CatalogError::io(&self.root, e)),
        };

        let mut languages = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CatalogError::io(&self.root, e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            if let Ok(lang) = LanguageCode::parse(stem) {
                languages.push(lang);
            }
        }

        languages.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(languages)
    }
}

/// Catalog source backed by a remote HTTP root
///
/// Catalogs are fetched from `{base_url}/{lang}.json`.
#[derive(Debug)]
pub struct HttpSource {
    base_url: Url,
    client: Client,
}

impl HttpSource {
    /// Create a source for the given catalog root URL
    pub fn new(base_url: &str, timeout: Duration) -> CatalogResult<Self> {
        // Treat the root as a directory so Url::join keeps the last segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url =
            Url::parse(&normalized).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("anuvad/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url, client })
    }

    fn catalog_url(&self, language: &LanguageCode) -> CatalogResult<Url> {
        self.base_url
            .join(&format!("{language}.json"))
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn describe(&self) -> String {
        format!("http {}", self.base_url)
    }

    async fn fetch(&self, language: &LanguageCode) -> CatalogResult<Value> {
        let url = self.catalog_url(language)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Err(CatalogError::not_found(language.clone()));
        }
        if !status.is_success() {
            return Err(CatalogError::status(status.as_u16(), url.as_str()));
        }

        // Decode from text so malformed payloads surface as JSON errors
        // rather than transport errors
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// In-memory catalog source, mainly for tests and embedding
#[derive(Default)]
pub struct StaticSource {
    catalogs: HashMap<LanguageCode, Value>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog for a language
    pub fn with(mut self, language: LanguageCode, catalog: Value) -> Self {
        self.catalogs.insert(language, catalog);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    fn describe(&self) -> String {
        format!("static ({} languages)", self.catalogs.len())
    }

    async fn fetch(&self, language: &LanguageCode) -> CatalogResult<Value> {
        self.catalogs
            .get(language)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(language.clone()))
    }

    async fn languages(&self) -> CatalogResult<Vec<LanguageCode>> {
        let mut languages: Vec<_> = self.catalogs.keys().cloned().collect();
        languages.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(languages)
    }
}
