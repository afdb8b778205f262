//! TestCase and SpecVersionEntry types.

use serde::{Deserialize, Serialize};

/// A single example from the CommonMark specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Markdown input. Tabs and newlines are significant.
    pub markdown: String,
    /// Expected HTML output, compared byte for byte.
    pub html: String,
    /// Spec section the example belongs to.
    pub section: String,
    pub start_line: u32,
    pub end_line: u32,
    /// Example number, unique within one spec version.
    #[serde(rename = "example")]
    pub example_number: u32,
}

impl TestCase {
    /// Create a test case with empty provenance.
    pub fn new(example_number: u32, section: &str, markdown: &str, html: &str) -> Self {
        Self {
            markdown: markdown.to_string(),
            html: html.to_string(),
            section: section.to_string(),
            start_line: 0,
            end_line: 0,
            example_number,
        }
    }

    /// Identifier used in diagnostics, e.g. `1_Tabs`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.example_number, self.section)
    }

    /// Deserialize a fixture file (a JSON array of examples).
    pub fn list_from_json(json: &[u8]) -> Result<Vec<Self>, SchemaError> {
        Ok(serde_json::from_slice(json)?)
    }
}

/// One published version of the specification, as listed in the index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecVersionEntry {
    /// Normalized version token, e.g. `v0.30`.
    pub version: String,
    /// Where the examples were downloaded from.
    pub url: String,
    /// Enactment date, `YYYY-MM-DD`.
    pub date: String,
}

impl SpecVersionEntry {
    pub fn new(version: &str, url: &str, date: &str) -> Self {
        Self {
            version: version.to_string(),
            url: url.to_string(),
            date: date.to_string(),
        }
    }

    /// Deserialize the version index. Order is preserved (newest first).
    pub fn list_from_json(json: &[u8]) -> Result<Vec<Self>, SchemaError> {
        Ok(serde_json::from_slice(json)?)
    }
}

/// Errors that can occur when decoding corpus records.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}
