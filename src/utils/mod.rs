//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

use sha2::{Digest, Sha256};

pub mod error;

/// Split a raw string into leading whitespace, trimmed core, and trailing
/// whitespace, such that `leading + core + trailing == raw`.
///
/// Trimming is Unicode-aware. A whitespace-only input yields an empty core
/// with everything in `leading`.
pub fn split_padding(raw: &str) -> (&str, &str, &str) {
    if raw.trim().is_empty() {
        return (raw, "", "");
    }

    let start = raw.len() - raw.trim_start().len();
    let end = raw.trim_end().len();

    (&raw[..start], &raw[start..end], &raw[end..])
}

/// Check whether a string carries no visible content
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Compute the SHA-256 digest of a byte slice as lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Truncate text to a maximum length
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        let mut cut = max_len.saturating_sub(3);
        // Back off to a char boundary so multi-byte text cannot split
        while cut > 0 && !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &text[..cut])
    }
}
