//! anuvad - In-place HTML text localization
//!
//! Rewrites the visible text of server-rendered HTML into a target language
//! and restores the original byte-exactly, driven by per-language JSON
//! catalogs and a persisted language signal shared across processes.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`dom`] - Parsed page plumbing and node-level reads and writes
//! - [`catalog`] - Per-language translation tables and their sources
//! - [`engine`] - Traversal, snapshot, rewrite, and restore passes
//! - [`signal`] - The persisted language signal and its polling watcher
//! - [`sync`] - The controller that keeps a page in the signalled language
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use anuvad::config::Config;
//! use anuvad::dom::Page;
//! use anuvad::models::LanguageCode;
//! use anuvad::sync::SyncController;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let page = Page::read_file("index.html").await?;
//!     let (mut controller, handle) = SyncController::from_config(&config, page)?;
//!
//!     let hindi = LanguageCode::parse("hi")?;
//!     let switcher = handle.clone();
//!     tokio::spawn(async move {
//!         let _ = switcher.set_language(hindi).await;
//!         switcher.shutdown();
//!     });
//!
//!     let stats = controller.run().await;
//!     println!("applies: {}", stats.applies);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod models;
pub mod signal;
pub mod sync;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{
        Catalog, CatalogLoader, CatalogSource, DirectorySource, HttpSource, StaticSource,
    };
    pub use crate::config::Config;
    pub use crate::dom::Page;
    pub use crate::engine::{Localizer, SnapshotStore};
    pub use crate::error::{AnuvadErrorTrait, Error, ErrorCategory, Result};
    pub use crate::models::{
        CoverageReport, LanguageCode, RewriteReport, SourceString, SyncState, UnitKind,
    };
    pub use crate::signal::{FileStore, LanguageStore, MemoryStore, SignalWatcher};
    pub use crate::sync::{Notification, SyncController, SyncEvent, SyncHandle};
}

// Direct re-exports for convenience
pub use models::{CoverageReport, LanguageCode, RewriteReport, SyncState};
