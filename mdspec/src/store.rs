//! Fixture store: loads test cases and the version index from a corpus.
//!
//! Nothing is cached. Every call re-reads and re-decodes its file, so a
//! broken corpus fails every call, not just the first.

use mdspec_schema::{SpecVersionEntry, TestCase};

use crate::decode::{Decoder, JsonDecoder};
use crate::error::CheckError;
use crate::source::{join_path, FixtureSource, SourceError};

/// Default corpus directory.
pub const DEFAULT_SPEC_DIR: &str = "specs";

/// Default version index file name.
pub const DEFAULT_INDEX_FILE: &str = "spec_list.json";

/// Default fixture file name prefix.
pub const DEFAULT_FILE_PREFIX: &str = "spec_";

/// Default fixture file name suffix.
pub const DEFAULT_FILE_SUFFIX: &str = ".json";

/// Where corpus files live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLocation {
    pub dir: String,
    pub index_file: String,
    pub file_prefix: String,
    pub file_suffix: String,
}

impl Default for FixtureLocation {
    fn default() -> Self {
        Self {
            dir: DEFAULT_SPEC_DIR.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
        }
    }
}

impl FixtureLocation {
    /// Builder: set the corpus directory.
    pub fn with_dir(mut self, dir: &str) -> Self {
        self.dir = dir.to_string();
        self
    }

    /// Builder: set the index file name.
    pub fn with_index_file(mut self, index_file: &str) -> Self {
        self.index_file = index_file.to_string();
        self
    }

    /// Builder: set the fixture file prefix.
    pub fn with_file_prefix(mut self, prefix: &str) -> Self {
        self.file_prefix = prefix.to_string();
        self
    }

    /// Fixture file name for a version, e.g. `spec_v0.30.json`.
    pub fn fixture_file(&self, version: &str) -> String {
        format!("{}{}{}", self.file_prefix, version, self.file_suffix)
    }

    /// Corpus path of a file in the corpus directory.
    pub fn path_of(&self, file: &str) -> String {
        join_path(&self.dir, file)
    }
}

/// Read-only access to the fixtures of one corpus.
#[derive(Debug, Clone)]
pub struct FixtureStore<S, D = JsonDecoder> {
    pub(crate) source: S,
    pub(crate) decoder: D,
    pub(crate) location: FixtureLocation,
}

impl<S: FixtureSource> FixtureStore<S, JsonDecoder> {
    /// Create a store reading JSON from `source` at the default location.
    pub fn new(source: S) -> Self {
        Self::with_parts(source, JsonDecoder, FixtureLocation::default())
    }
}

impl<S: FixtureSource, D: Decoder> FixtureStore<S, D> {
    /// Create a store from explicit parts.
    pub fn with_parts(source: S, decoder: D, location: FixtureLocation) -> Self {
        Self {
            source,
            decoder,
            location,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn location(&self) -> &FixtureLocation {
        &self.location
    }

    /// Load the test cases of one version. The version is substituted into
    /// the file name verbatim; there is no fuzzy matching.
    pub fn load_fixtures(&self, version: &str) -> Result<Vec<TestCase>, CheckError> {
        let file = self.location.fixture_file(version);
        let data = self.read(&file, |file, source| CheckError::FixtureNotFound { file, source })?;

        self.decoder
            .decode_test_cases(&data)
            .map_err(|e| CheckError::FixtureMalformed { file, source: e })
    }

    /// Load the version index, newest version first.
    pub fn load_version_index(&self) -> Result<Vec<SpecVersionEntry>, CheckError> {
        let file = self.location.index_file.clone();
        let data = self.read(&file, |file, source| CheckError::IndexNotFound { file, source })?;

        self.decoder
            .decode_version_index(&data)
            .map_err(|e| CheckError::IndexMalformed { file, source: e })
    }

    /// Paths of all files in the corpus directory.
    pub fn list_fixture_files(&self) -> Result<Vec<String>, CheckError> {
        self.source
            .list_entries(&self.location.dir)
            .map_err(|e| CheckError::CorpusUnreadable {
                dir: self.location.dir.clone(),
                source: e,
            })
    }

    /// Read a file from the corpus directory. A missing file is reported
    /// through `not_found`; any other failure is `Unreadable`.
    fn read(
        &self,
        file: &str,
        not_found: impl FnOnce(String, SourceError) -> CheckError,
    ) -> Result<Vec<u8>, CheckError> {
        match self.source.read_file(&self.location.path_of(file)) {
            Ok(data) => Ok(data),
            Err(e @ SourceError::NotFound(_)) => Err(not_found(file.to_string(), e)),
            Err(e) => Err(CheckError::Unreadable {
                file: file.to_string(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::FailingDecoder;
    use crate::source::{DirectorySource, MockSource};
    use std::fs;
    use tempfile::TempDir;

    const FIXTURE_JSON: &str = r#"[
        {"markdown":"\tfoo\n","html":"<pre><code>foo\n</code></pre>\n","section":"Tabs","start_line":1,"end_line":5,"example":1},
        {"markdown":"a\n","html":"<p>a</p>\n","section":"Paragraphs","start_line":6,"end_line":10,"example":2}
    ]"#;

    const INDEX_JSON: &str = r#"[
        {"version":"v0.30","url":"https://spec.commonmark.org/0.30/spec.json","date":"2021-06-19"},
        {"version":"v0.29","url":"https://spec.commonmark.org/0.29/spec.json","date":"2019-04-06"}
    ]"#;

    fn make_source() -> MockSource {
        let source = MockSource::new();
        source.add_file("specs/spec_list.json", INDEX_JSON);
        source.add_file("specs/spec_v0.30.json", FIXTURE_JSON);
        source
    }

    // ===========================================
    // FixtureLocation
    // ===========================================

    #[test]
    fn test_location_defaults() {
        let location = FixtureLocation::default();
        assert_eq!(location.fixture_file("v0.30"), "spec_v0.30.json");
        assert_eq!(location.path_of("spec_list.json"), "specs/spec_list.json");
    }

    #[test]
    fn test_location_builders() {
        let location = FixtureLocation::default()
            .with_dir("corpus")
            .with_index_file("versions.json")
            .with_file_prefix("cm_");
        assert_eq!(location.fixture_file("v1"), "cm_v1.json");
        assert_eq!(location.path_of(&location.index_file), "corpus/versions.json");
    }

    // ===========================================
    // load_fixtures
    // ===========================================

    #[test]
    fn test_load_fixtures() {
        let store = FixtureStore::new(make_source());
        let cases = store.load_fixtures("v0.30").unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].markdown, "\tfoo\n");
        assert_eq!(cases[1].id(), "2_Paragraphs");
    }

    #[test]
    fn test_load_fixtures_not_found() {
        let store = FixtureStore::new(make_source());
        let err = store.load_fixtures("v0.1").unwrap_err();
        assert!(matches!(err, CheckError::FixtureNotFound { ref file, .. } if file == "spec_v0.1.json"));
    }

    #[test]
    fn test_load_fixtures_malformed() {
        let source = make_source();
        source.add_file("specs/spec_v0.30.json", "not json");
        let store = FixtureStore::new(source);

        let err = store.load_fixtures("v0.30").unwrap_err();
        assert!(matches!(err, CheckError::FixtureMalformed { .. }));
        assert!(err.to_string().contains("spec_v0.30.json"));
    }

    #[test]
    fn test_load_fixtures_injected_decoder_error() {
        let store = FixtureStore::with_parts(
            make_source(),
            FailingDecoder::new("forced error"),
            FixtureLocation::default(),
        );
        let err = store.load_fixtures("v0.30").unwrap_err();
        assert!(err.to_string().contains("forced error"));
    }

    #[test]
    fn test_load_fixtures_rereads_every_call() {
        let source = make_source();
        let store = FixtureStore::new(source.clone());

        store.load_fixtures("v0.30").unwrap();
        store.load_fixtures("v0.30").unwrap();
        assert_eq!(source.read_count(), 2);
    }

    // ===========================================
    // load_version_index
    // ===========================================

    #[test]
    fn test_load_version_index() {
        let store = FixtureStore::new(make_source());
        let index = store.load_version_index().unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].version, "v0.30");
        assert_eq!(index[1].version, "v0.29");
    }

    #[test]
    fn test_load_version_index_missing_file() {
        let location = FixtureLocation::default().with_index_file("unknown");
        let store = FixtureStore::with_parts(make_source(), JsonDecoder, location);
        let err = store.load_version_index().unwrap_err();
        assert!(matches!(err, CheckError::IndexNotFound { .. }));
    }

    #[test]
    fn test_load_version_index_forced_error() {
        let store = FixtureStore::with_parts(
            make_source(),
            FailingDecoder::new("forced error"),
            FixtureLocation::default(),
        );
        let err = store.load_version_index().unwrap_err();
        assert!(err
            .to_string()
            .contains("failed to parse list of supported spec versions"));
        assert!(err.to_string().contains("forced error"));
    }

    // ===========================================
    // Listing
    // ===========================================

    #[test]
    fn test_list_fixture_files() {
        let store = FixtureStore::new(make_source());
        let files = store.list_fixture_files().unwrap();
        assert_eq!(files, vec!["specs/spec_list.json", "specs/spec_v0.30.json"]);
    }

    #[test]
    fn test_list_fixture_files_unknown_dir() {
        let location = FixtureLocation::default().with_dir("unknown");
        let store = FixtureStore::with_parts(make_source(), JsonDecoder, location);
        assert!(matches!(
            store.list_fixture_files(),
            Err(CheckError::CorpusUnreadable { .. })
        ));
    }

    // ===========================================
    // Read failures
    // ===========================================

    fn unreadable_corpus() -> TempDir {
        let temp = TempDir::new().unwrap();
        // Directories where files are expected: they exist but cannot be read.
        fs::create_dir_all(temp.path().join("specs/spec_v0.30.json")).unwrap();
        fs::create_dir_all(temp.path().join("specs/spec_list.json")).unwrap();
        temp
    }

    #[test]
    fn test_unreadable_fixture_is_not_reported_missing() {
        let temp = unreadable_corpus();
        let store = FixtureStore::new(DirectorySource::new(temp.path()));

        let err = store.load_fixtures("v0.30").unwrap_err();
        assert!(
            matches!(err, CheckError::Unreadable { ref file, source: SourceError::Io { .. } } if file == "spec_v0.30.json"),
            "unexpected error: {:?}",
            err
        );
        assert!(!err.to_string().contains("not found"));
    }

    #[test]
    fn test_unreadable_index_is_not_reported_missing() {
        let temp = unreadable_corpus();
        let store = FixtureStore::new(DirectorySource::new(temp.path()));

        let err = store.load_version_index().unwrap_err();
        assert!(matches!(err, CheckError::Unreadable { ref file, .. } if file == "spec_list.json"));
    }

    #[test]
    fn test_missing_file_on_disk_is_not_found() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("specs")).unwrap();
        let store = FixtureStore::new(DirectorySource::new(temp.path()));

        assert!(matches!(
            store.load_fixtures("v0.30"),
            Err(CheckError::FixtureNotFound { .. })
        ));
        assert!(matches!(
            store.load_version_index(),
            Err(CheckError::IndexNotFound { .. })
        ));
    }
}
