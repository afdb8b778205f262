//! Conformance checks for Markdown-to-HTML converters.
//!
//! Runs a caller-supplied conversion function against the CommonMark
//! example corpus of a given spec version and reports the first example
//! whose output differs from the expected HTML.
//!
//! ```no_run
//! fn to_html(markdown: &str) -> Result<String, std::io::Error> {
//!     // call the converter under test here
//!     Ok(markdown.to_string())
//! }
//!
//! if let Err(e) = mdspec::spec_check("v0.31.2", to_html) {
//!     eprintln!("{}", e);
//! }
//!
//! // One conversion at a time, in corpus order.
//! let result = mdspec::spec_check_with_concurrency("latest", to_html, mdspec::NO_CONCURRENCY);
//! # let _ = result;
//! ```
//!
//! The bundled corpus lives in `specs/` and is compiled into the crate.
//! [`SpecChecker`] exposes the same checks over other corpora, with
//! logging and a collect-all [`SpecChecker::report`] mode.

mod checker;
mod decode;
mod error;
mod logger;
mod runner;
mod scheduler;
mod source;
mod store;
mod version;

pub use checker::SpecChecker;
pub use decode::{DecodeError, Decoder, FailingDecoder, JsonDecoder};
pub use error::{BoxError, CheckError, TestFailure};
pub use logger::{LogEntry, Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use mdspec_schema::{SchemaError, SpecVersionEntry, TestCase};
pub use runner::{run_case, Converter, Verdict};
pub use scheduler::{
    available_parallelism, CancelFlag, CheckReport, Concurrency, RunStats, Scheduler,
    DEFAULT_CONCURRENCY, NO_CONCURRENCY,
};
pub use source::{DirectorySource, EmbeddedSource, FixtureSource, MockSource, SourceError};
pub use store::{
    FixtureLocation, FixtureStore, DEFAULT_FILE_PREFIX, DEFAULT_FILE_SUFFIX, DEFAULT_INDEX_FILE,
    DEFAULT_SPEC_DIR,
};
pub use version::{is_valid_version_syntax, SpecVersion, LATEST};

/// Check `f` against every example of `version` in the bundled corpus,
/// with up to [`available_parallelism`] conversions in flight.
///
/// `version` is `latest` or a token like `v0.30`.
pub fn spec_check<F, E>(version: &str, f: F) -> Result<(), CheckError>
where
    F: Fn(&str) -> Result<String, E> + Sync,
    E: Into<BoxError>,
{
    spec_check_with_concurrency(version, f, DEFAULT_CONCURRENCY)
}

/// Like [`spec_check`] with an explicit bound on in-flight conversions.
///
/// `-1` ([`NO_CONCURRENCY`]) runs examples one at a time in corpus order
/// and reports the first failing one. `0` uses the host's parallelism.
/// A positive value is the bound itself.
pub fn spec_check_with_concurrency<F, E>(
    version: &str,
    f: F,
    max_concurrency: i64,
) -> Result<(), CheckError>
where
    F: Fn(&str) -> Result<String, E> + Sync,
    E: Into<BoxError>,
{
    SpecChecker::bundled().check_with(version, f, Concurrency::from_raw(max_concurrency))
}

/// Spec versions listed in the bundled index, newest first.
pub fn list_versions() -> Result<Vec<String>, CheckError> {
    SpecChecker::bundled().list_versions()
}
