//! Spec version tokens.
//!
//! Accepted syntax is the literal `latest` or `v` followed by one to three
//! dot-separated non-negative integers (`v1`, `v0.30`, `v0.31.2`). Numbers
//! have no leading zeros. Nothing else may appear, including trailing
//! whitespace.

use std::fmt;
use std::sync::OnceLock;

use mdspec_schema::SpecVersionEntry;
use regex::Regex;

use crate::error::CheckError;

/// Token that selects the newest indexed version.
pub const LATEST: &str = "latest";

const VERSION_PATTERN: &str = r"\Av(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*)){0,2}\z";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Pattern is a constant and always valid
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("valid regex pattern"))
}

/// Returns true if `input` is `latest` or a well-formed version token.
pub fn is_valid_version_syntax(input: &str) -> bool {
    input == LATEST || version_regex().is_match(input)
}

/// A validated version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecVersion {
    /// Newest version in the index.
    Latest,
    /// A specific version token, e.g. `v0.30`.
    Exact(String),
}

impl SpecVersion {
    /// Validate a version string.
    pub fn parse(input: &str) -> Result<Self, CheckError> {
        if !is_valid_version_syntax(input) {
            return Err(CheckError::InvalidVersionFormat(input.to_string()));
        }
        if input == LATEST {
            Ok(SpecVersion::Latest)
        } else {
            Ok(SpecVersion::Exact(input.to_string()))
        }
    }

    /// Whether resolving this version needs the version index.
    pub fn needs_index(&self) -> bool {
        matches!(self, SpecVersion::Latest)
    }

    /// Resolve to a concrete version token. `Latest` picks the first
    /// (newest) index entry; exact versions resolve to themselves.
    pub fn resolve(&self, index: &[SpecVersionEntry]) -> Option<String> {
        match self {
            SpecVersion::Latest => index.first().map(|e| e.version.clone()),
            SpecVersion::Exact(v) => Some(v.clone()),
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecVersion::Latest => write!(f, "{}", LATEST),
            SpecVersion::Exact(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // Syntax
    // ===========================================

    #[test]
    fn test_valid_versions() {
        for input in ["latest", "v0.14", "v0.31.2", "v1.14.0", "v1", "v0", "v10.200.3000"] {
            assert!(is_valid_version_syntax(input), "{:?} should be valid", input);
        }
    }

    #[test]
    fn test_invalid_versions() {
        for input in [
            "0.14",
            "version 1.14",
            "vvvv1.14",
            "v0.14\n",
            " v0.14",
            "v0.14 ",
            "v0.1.2.3",
            "v0.",
            "v",
            "",
            "v01.2",
            "v1.2-pre",
            "Latest",
            "latest\n",
            "v0.1\t4",
        ] {
            assert!(!is_valid_version_syntax(input), "{:?} should be invalid", input);
        }
    }

    // ===========================================
    // SpecVersion
    // ===========================================

    #[test]
    fn test_parse_exact() {
        assert_eq!(
            SpecVersion::parse("v0.30").unwrap(),
            SpecVersion::Exact("v0.30".to_string())
        );
    }

    #[test]
    fn test_parse_latest() {
        let version = SpecVersion::parse("latest").unwrap();
        assert_eq!(version, SpecVersion::Latest);
        assert!(version.needs_index());
    }

    #[test]
    fn test_parse_invalid() {
        let err = SpecVersion::parse("version Unknown").unwrap_err();
        assert!(matches!(err, CheckError::InvalidVersionFormat(ref v) if v == "version Unknown"));
    }

    #[test]
    fn test_resolve_latest_uses_first_entry() {
        let index = vec![
            SpecVersionEntry::new("v0.31.2", "u", "2024-01-28"),
            SpecVersionEntry::new("v0.30", "u", "2021-06-19"),
        ];
        assert_eq!(SpecVersion::Latest.resolve(&index), Some("v0.31.2".to_string()));
        assert_eq!(SpecVersion::Latest.resolve(&[]), None);
    }

    #[test]
    fn test_resolve_exact_ignores_index() {
        let version = SpecVersion::Exact("v0.1".to_string());
        assert!(!version.needs_index());
        assert_eq!(version.resolve(&[]), Some("v0.1".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(SpecVersion::Latest.to_string(), "latest");
        assert_eq!(SpecVersion::Exact("v0.30".to_string()).to_string(), "v0.30");
    }
}
