//! Error types shared across the localization pipeline
//!
//! This module defines custom error types used throughout the application.

use crate::models::InvalidLanguageCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing whole pages
#[derive(Error, Debug)]
pub enum PageError {
    /// Page file could not be read
    #[error("Failed to read page {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Page file could not be written
    #[error("Failed to write page {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Referenced node is no longer attached to the tree
    #[error("Node is no longer attached to the tree")]
    StaleNode,
}

impl PageError {
    /// Create a read error with path context
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error with path context
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        // File access may succeed on retry; a detached node never comes back
        !matches!(self, Self::StaleNode)
    }
}

/// Errors that can occur in the persisted language signal store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store file access failed
    #[error("Language store I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Store payload is not valid JSON
    #[error("Malformed language store payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored value is not a usable language code
    #[error("Stored language is invalid: {0}")]
    Language(#[from] InvalidLanguageCode),
}

impl StoreError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        // Malformed payloads stay malformed until some writer replaces them
        matches!(self, Self::Io(_))
    }
}

/// Errors raised by the synchronization controller
#[derive(Error, Debug)]
pub enum SyncError {
    /// Controller is already running
    #[error("Synchronization controller is already running")]
    AlreadyRunning,

    /// Controller has not been started
    #[error("Synchronization controller is not running")]
    NotRunning,

    /// Notification channel closed while the controller was live
    #[error("Notification channel closed")]
    ChannelClosed,

    /// Language signal store failure
    #[error("Language store failure: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::AlreadyRunning | Self::NotRunning => false,
            Self::ChannelClosed => false,
            Self::Store(e) => e.is_recoverable(),
        }
    }
}
