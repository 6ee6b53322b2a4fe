//! Unified error handling for the anuvad crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`AnuvadErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use anuvad::error::{Error, ErrorCategory, AnuvadErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Retrying: {}", err);
//!     } else {
//!         eprintln!("Fatal error: {}", err);
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::catalog::error::CatalogError;
pub use crate::models::InvalidLanguageCode;
pub use crate::utils::error::{PageError, StoreError, SyncError};

/// Common trait for all anuvad error types
///
/// This trait provides a unified interface for error handling across
/// all modules, enabling consistent error processing strategies.
pub trait AnuvadErrorTrait: std::error::Error {
    /// Check if this error is recoverable (retrying or waiting for the next
    /// trigger may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP fetch, timeout)
    Network,
    /// Catalog shape and decoding errors
    Catalog,
    /// Page tree and node addressing errors
    Page,
    /// Persisted signal and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Synchronization controller errors
    Sync,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Catalog => "catalog",
            Self::Page => "page",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Sync => "sync",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the anuvad crate
///
/// This enum wraps all domain-specific errors, providing a single error type
/// that can be used across module boundaries while preserving the detailed
/// error information.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog loading and decoding errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Page reading, writing, and node addressing errors
    #[error("Page error: {0}")]
    Page(#[from] PageError),

    /// Language signal store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Synchronization controller errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Language code validation errors
    #[error("Language error: {0}")]
    Language(#[from] InvalidLanguageCode),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnuvadErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_recoverable(),
            Self::Page(e) => e.is_recoverable(),
            Self::Store(e) => e.is_recoverable(),
            Self::Sync(e) => e.is_recoverable(),
            Self::Language(_) => false,
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Http(_) => true, // HTTP errors are often transient
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Catalog(e) => match e {
                CatalogError::Http(_) | CatalogError::Status { .. } => ErrorCategory::Network,
                CatalogError::Io { .. } => ErrorCategory::Storage,
                _ => ErrorCategory::Catalog,
            },
            Self::Page(_) => ErrorCategory::Page,
            Self::Store(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Sync(_) => ErrorCategory::Sync,
            Self::Language(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Json(_) => ErrorCategory::Catalog,
            Self::Http(_) => ErrorCategory::Network,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
