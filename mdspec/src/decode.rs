//! Decoding corpus bytes into records.

use mdspec_schema::{SchemaError, SpecVersionEntry, TestCase};
use thiserror::Error;

/// Errors from decoding a corpus file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Custom(String),
}

/// Trait for turning corpus bytes into records.
/// Injected into the fixture store so tests can force decode failures.
pub trait Decoder: Send + Sync {
    /// Decode a `spec_<version>.json` fixture file.
    fn decode_test_cases(&self, data: &[u8]) -> Result<Vec<TestCase>, DecodeError>;

    /// Decode the version index file.
    fn decode_version_index(&self, data: &[u8]) -> Result<Vec<SpecVersionEntry>, DecodeError>;
}

/// Decoder for the JSON corpus format.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode_test_cases(&self, data: &[u8]) -> Result<Vec<TestCase>, DecodeError> {
        Ok(TestCase::list_from_json(data)?)
    }

    fn decode_version_index(&self, data: &[u8]) -> Result<Vec<SpecVersionEntry>, DecodeError> {
        Ok(SpecVersionEntry::list_from_json(data)?)
    }
}

/// Decoder that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingDecoder {
    message: String,
}

impl FailingDecoder {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Decoder for FailingDecoder {
    fn decode_test_cases(&self, _data: &[u8]) -> Result<Vec<TestCase>, DecodeError> {
        Err(DecodeError::Custom(self.message.clone()))
    }

    fn decode_version_index(&self, _data: &[u8]) -> Result<Vec<SpecVersionEntry>, DecodeError> {
        Err(DecodeError::Custom(self.message.clone()))
    }
}
