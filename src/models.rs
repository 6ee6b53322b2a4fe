// Core data structures for the anuvad localization engine

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

// BCP-47-ish: primary subtag plus optional alphanumeric subtags
static LANGUAGE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,8}(-[A-Za-z0-9]{1,8})*$").unwrap());

/// Error returned when a string is not a usable language code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid language code: {0:?}")]
pub struct InvalidLanguageCode(pub String);

/// Opaque short identifier for a catalog language (e.g. "en", "hi", "pt-br")
///
/// Codes are trimmed and lowercased on construction. One designated value is
/// the *base language*: content authored in it is reached via restore rather
/// than rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and normalize a language code
    pub fn parse(code: &str) -> Result<Self, InvalidLanguageCode> {
        let normalized = code.trim().to_lowercase();
        if LANGUAGE_CODE_RE.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(InvalidLanguageCode(code.to_string()))
        }
    }

    /// Default base language when nothing is configured or persisted
    pub fn english() -> Self {
        Self("en".to_string())
    }

    /// The normalized code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = InvalidLanguageCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = InvalidLanguageCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Visible state of the tree with respect to localization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Content shown as authored
    Base,
    /// Content rewritten to the given language
    Localized(LanguageCode),
}

impl SyncState {
    pub fn is_base(&self) -> bool {
        matches!(self, Self::Base)
    }

    /// The target language, if localized
    pub fn language(&self) -> Option<&LanguageCode> {
        match self {
            Self::Base => None,
            Self::Localized(lang) => Some(lang),
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Localized(lang) => write!(f, "localized({lang})"),
        }
    }
}

/// Kinds of localizable units found in a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// A visible text node
    Text,
    /// An allowlisted attribute value
    Attribute,
    /// An element carrying a lookup-key marker
    Tagged,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Attribute => f.write_str("attribute"),
            Self::Tagged => f.write_str("tagged"),
        }
    }
}

/// One localizable source string extracted from a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceString {
    pub kind: UnitKind,
    /// Catalog key: trimmed text, raw attribute value, or tagged lookup key
    pub value: String,
}

/// Counts of mutations performed by a single rewrite pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    /// Text units replaced
    pub texts: usize,
    /// Attribute slots replaced
    pub attributes: usize,
    /// Tagged elements replaced
    pub tagged: usize,
    /// Units with no catalog entry
    pub misses: usize,
}

impl RewriteReport {
    /// Total replacements across all unit kinds
    pub fn total(&self) -> usize {
        self.texts + self.attributes + self.tagged
    }
}

/// Catalog coverage for a page: which source strings have translations
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub language: LanguageCode,
    /// Distinct source strings found in the page
    pub total: usize,
    /// Source strings with a catalog entry
    pub translated: usize,
    /// Source strings without a catalog entry, sorted
    pub missing: Vec<String>,
}

impl CoverageReport {
    /// Percentage of source strings covered by the catalog
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.translated as f64 / self.total as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Format as display string
    pub fn display(&self) -> String {
        let mut output = format!("Coverage for '{}'\n", self.language);
        output.push_str(&format!("{:-<40}\n", ""));
        output.push_str(&format!("Source strings: {}\n", self.total));
        output.push_str(&format!(
            "Translated: {} ({:.1}%)\n",
            self.translated,
            self.percent()
        ));
        if !self.missing.is_empty() {
            output.push_str("Missing:\n");
            for value in &self.missing {
                output.push_str(&format!("  - {value}\n"));
            }
        }
        output
    }
}

/// Counters accumulated by the synchronization controller
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Localize procedures that rewrote the tree
    pub applies: u64,
    /// Restore procedures run
    pub restores: u64,
    /// Loads that produced an empty catalog (missing or malformed resource)
    pub empty_catalogs: u64,
    /// When the tree was last mutated by the controller
    pub last_applied_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_normalization() {
        assert_eq!(LanguageCode::parse("EN").unwrap().as_str(), "en");
        assert_eq!(LanguageCode::parse("  hi ").unwrap().as_str(), "hi");
        assert_eq!(LanguageCode::parse("pt-BR").unwrap().as_str(), "pt-br");
    }

    #[test]
    fn test_language_code_rejects_garbage() {
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("e").is_err());
        assert!(LanguageCode::parse("en_US").is_err());
        assert!(LanguageCode::parse("en US").is_err());
        assert!(LanguageCode::parse("한국어").is_err());
    }

    #[test]
    fn test_language_code_serde_round_trip() {
        let code: LanguageCode = serde_json::from_str("\"HI\"").unwrap();
        assert_eq!(code.as_str(), "hi");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"hi\"");

        let bad: Result<LanguageCode, _> = serde_json::from_str("\"not a code\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_sync_state_display() {
        assert_eq!(SyncState::Base.to_string(), "base");
        let localized = SyncState::Localized(LanguageCode::parse("hi").unwrap());
        assert_eq!(localized.to_string(), "localized(hi)");
        assert!(!localized.is_base());
        assert_eq!(localized.language().unwrap().as_str(), "hi");
    }

    #[test]
    fn test_rewrite_report_total() {
        let report = RewriteReport {
            texts: 2,
            attributes: 1,
            tagged: 3,
            misses: 10,
        };
        assert_eq!(report.total(), 6);
    }

    #[test]
    fn test_coverage_percent() {
        let full = CoverageReport {
            language: LanguageCode::english(),
            total: 0,
            translated: 0,
            missing: Vec::new(),
        };
        assert_eq!(full.percent(), 100.0);
        assert!(full.is_complete());

        let partial = CoverageReport {
            language: LanguageCode::english(),
            total: 4,
            translated: 3,
            missing: vec!["Choose State".to_string()],
        };
        assert!((partial.percent() - 75.0).abs() < 0.001);
        assert!(!partial.is_complete());
        assert!(partial.display().contains("Choose State"));
    }
}
