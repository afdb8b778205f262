//! Error types for spec checks.

use crate::decode::DecodeError;
use crate::source::SourceError;

/// Boxed error returned by a caller's conversion function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a single example failed.
///
/// Inputs and outputs are rendered with `{:?}` so tabs and newlines stay
/// visible in the message.
#[derive(Debug, thiserror::Error)]
pub enum TestFailure {
    #[error(
        "error {id}: the given function failed to parse markdown.\n\
         given markdown: {markdown:?}\nexpect HTML: {expected:?}\nactual HTML: \"\": {source}"
    )]
    FunctionError {
        id: String,
        markdown: String,
        expected: String,
        #[source]
        source: BoxError,
    },

    #[error(
        "error {id}: the given function did not return the expected HTML result.\n\
         given markdown: {markdown:?}\nexpect HTML: {expected:?}\nactual HTML: {actual:?}"
    )]
    Mismatch {
        id: String,
        markdown: String,
        expected: String,
        actual: String,
    },
}

impl TestFailure {
    /// Identifier of the failing example, e.g. `1_Tabs`.
    pub fn id(&self) -> &str {
        match self {
            TestFailure::FunctionError { id, .. } | TestFailure::Mismatch { id, .. } => id,
        }
    }

    /// Markdown input of the failing example.
    pub fn markdown(&self) -> &str {
        match self {
            TestFailure::FunctionError { markdown, .. } | TestFailure::Mismatch { markdown, .. } => {
                markdown
            }
        }
    }
}

/// Errors returned by the check entry points.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("invalid spec version format: {0:?}, it should be like 'v0.14'")]
    InvalidVersionFormat(String),

    #[error("spec file not found: {file}")]
    FixtureNotFound {
        file: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to parse spec file {file}: {source}")]
    FixtureMalformed {
        file: String,
        #[source]
        source: DecodeError,
    },

    #[error("failed to read list of supported spec versions: {file}")]
    IndexNotFound {
        file: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to parse list of supported spec versions: {source}")]
    IndexMalformed {
        file: String,
        #[source]
        source: DecodeError,
    },

    #[error("spec file {file} is unreadable: {source}")]
    Unreadable {
        file: String,
        #[source]
        source: SourceError,
    },

    #[error("no spec versions listed in {0}")]
    EmptyIndex(String),

    #[error("failed to read directory {dir}: {source}")]
    CorpusUnreadable {
        dir: String,
        #[source]
        source: SourceError,
    },

    #[error("test failed: {0}")]
    TestFailed(#[source] TestFailure),

    #[error("failed to run tests concurrently: {0}")]
    Concurrent(#[source] TestFailure),
}

impl CheckError {
    /// The example failure carried by this error, if any.
    pub fn failure(&self) -> Option<&TestFailure> {
        match self {
            CheckError::TestFailed(failure) | CheckError::Concurrent(failure) => Some(failure),
            _ => None,
        }
    }
}
