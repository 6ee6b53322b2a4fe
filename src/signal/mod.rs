//! The process-wide language signal
//!
//! The current language is a single persisted value: read at startup,
//! written only by the user-facing language switcher, and watchable for
//! out-of-process changes. [`LanguageStore`] abstracts the persistence so
//! the synchronization logic is testable without a real storage backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

pub mod watch;

pub use watch::SignalWatcher;

use crate::models::LanguageCode;
use crate::utils::error::StoreError;

/// Persistence seam for the language signal
#[async_trait]
pub trait LanguageStore: Send + Sync {
    /// Human-readable identifier used in logs
    fn describe(&self) -> String;

    /// Read the persisted language, if any was ever written
    async fn load(&self) -> Result<Option<LanguageCode>, StoreError>;

    /// Persist a new language selection
    async fn save(&self, language: &LanguageCode) -> Result<(), StoreError>;
}

/// On-disk payload of the persisted signal
#[derive(Debug, Serialize, Deserialize)]
struct StoredSignal {
    language: LanguageCode,
    updated_at: DateTime<Utc>,
}

/// Language store backed by a small JSON file
///
/// Writes go through a temp file and rename so a crash mid-write never
/// leaves a torn payload behind.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl LanguageStore for FileStore {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn load(&self) -> Result<Option<LanguageCode>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let signal: StoredSignal = serde_json::from_str(&content)?;
        Ok(Some(signal.language))
    }

    async fn save(&self, language: &LanguageCode) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let signal = StoredSignal {
            language: language.clone(),
            updated_at: Utc::now(),
        };
        let payload = serde_json::to_string_pretty(&signal)?;

        // Write to temp file first, then rename (atomic)
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, payload).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), language = %language, "Language signal saved");
        Ok(())
    }
}

/// In-memory language store, mainly for tests and embedding
#[derive(Default)]
pub struct MemoryStore {
    current: RwLock<Option<LanguageCode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a language already persisted
    pub fn with_language(language: LanguageCode) -> Self {
        Self {
            current: RwLock::new(Some(language)),
        }
    }
}

#[async_trait]
impl LanguageStore for MemoryStore {
    fn describe(&self) -> String {
        String::from("memory")
    }

    async fn load(&self) -> Result<Option<LanguageCode>, StoreError> {
        Ok(self.current.read().await.clone())
    }

    async fn save(&self, language: &LanguageCode) -> Result<(), StoreError> {
        *self.current.write().await = Some(language.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("language.json"));

        assert_eq!(store.load().await.unwrap(), None);

        store.save(&lang("hi")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(lang("hi")));

        store.save(&lang("ta")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(lang("ta")));
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("deep/nested/language.json"));

        store.save(&lang("hi")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(lang("hi")));
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("language.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let store = FileStore::new(&path);
        assert!(store.load().await.is_err());

        // Valid JSON, invalid language code
        tokio::fs::write(&path, r#"{"language": "not a code", "updated_at": "2026-01-01T00:00:00Z"}"#)
            .await
            .unwrap();
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_file_store_reads_externally_written_file() {
        // Another process writes the same JSON shape directly
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("language.json");
        tokio::fs::write(
            &path,
            r#"{"language": "pt-BR", "updated_at": "2026-03-15T09:30:00Z"}"#,
        )
        .await
        .unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.load().await.unwrap(), Some(lang("pt-BR")));
    }

    #[tokio::test]
    async fn test_file_store_leaves_no_temp_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("language.json"));
        store.save(&lang("hi")).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["language.json".to_string()]);
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&lang("hi")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(lang("hi")));

        let seeded = MemoryStore::with_language(lang("ta"));
        assert_eq!(seeded.load().await.unwrap(), Some(lang("ta")));
    }
}
