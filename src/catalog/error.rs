//! Error types for catalog loading

use crate::models::LanguageCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while fetching and decoding catalogs
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP transport failure
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Catalog fetch returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Catalog file access failed
    #[error("Catalog I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Resource exists but is not valid JSON
    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON decoded but does not have the expected shape
    #[error("Catalog has invalid shape: {reason}")]
    InvalidShape { reason: String },

    /// Catalog URL could not be constructed
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// No catalog resource exists for the language
    #[error("No catalog found for language '{language}'")]
    NotFound { language: LanguageCode },
}

impl CatalogError {
    /// Create a status error
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid shape error
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(language: LanguageCode) -> Self {
        Self::NotFound { language }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        // Transport can come back; malformed content will not fix itself
        match self {
            Self::Http(_) | Self::Io { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Json(_) | Self::InvalidShape { .. } | Self::InvalidUrl(_) => false,
            Self::NotFound { .. } => false,
        }
    }

    /// Whether this error means the resource simply does not exist
    pub fn is_missing(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Status { status, .. } => *status == 404,
            Self::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
