//! Read-only access to the spec corpus.
//!
//! The checker never assumes how the corpus is shipped. It reads through the
//! [`FixtureSource`] capability, which has three implementations:
//!
//! - [`EmbeddedSource`]: files compiled into the library by `build.rs`
//! - [`DirectorySource`]: a plain directory on disk
//! - [`MockSource`]: in-memory files for tests
//!
//! Paths are `/`-separated and relative to the corpus root, e.g.
//! `specs/spec_v0.30.json`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::store::DEFAULT_SPEC_DIR;

include!(concat!(env!("OUT_DIR"), "/embedded_specs.rs"));

/// Errors from corpus access.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("directory not found: {0}")]
    DirNotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Trait for reading corpus files.
/// Abstracted so the corpus can be embedded, on disk, or mocked.
pub trait FixtureSource: Send + Sync {
    /// List the files directly inside `dir`, as full paths.
    /// Subdirectories are skipped. An empty `dir` means the corpus root.
    fn list_entries(&self, dir: &str) -> Result<Vec<String>, SourceError>;

    /// Read the raw bytes of a file.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError>;
}

/// Join a directory and a file name into a corpus path.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = normalize_dir(dir);
    if dir == "." {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

fn normalize_dir(dir: &str) -> &str {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        "."
    } else {
        dir
    }
}

// ===========================================
// Embedded corpus
// ===========================================

/// Corpus compiled into the binary.
///
/// All files live in a single directory (`specs` for the bundled corpus).
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSource {
    dir: &'static str,
    files: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedSource {
    /// Create a source over a static `(name, bytes)` table stored under `dir`.
    pub fn new(dir: &'static str, files: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { dir, files }
    }

    /// The corpus bundled with this crate (everything in `specs/`).
    pub fn bundled() -> Self {
        Self::new(DEFAULT_SPEC_DIR, EMBEDDED_FILES)
    }
}

impl Default for EmbeddedSource {
    fn default() -> Self {
        Self::bundled()
    }
}

impl FixtureSource for EmbeddedSource {
    fn list_entries(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        match normalize_dir(dir) {
            // Only the corpus directory lives at the root.
            "." => Ok(Vec::new()),
            d if d == self.dir => Ok(self
                .files
                .iter()
                .map(|(name, _)| join_path(self.dir, name))
                .collect()),
            d => Err(SourceError::DirNotFound(d.to_string())),
        }
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let name = path
            .strip_prefix(self.dir)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| SourceError::NotFound(path.to_string()))?;

        self.files
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, data)| data.to_vec())
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }
}

// ===========================================
// Directory on disk
// ===========================================

/// Corpus read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The crate's own `specs/` checkout, rooted at the crate directory.
    pub fn crate_root() -> Self {
        Self::new(env!("CARGO_MANIFEST_DIR"))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match normalize_dir(path) {
            "." => self.root.clone(),
            p => self.root.join(p),
        }
    }
}

impl FixtureSource for DirectorySource {
    fn list_entries(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        let dir = normalize_dir(dir);
        let full = self.resolve(dir);
        if !full.is_dir() {
            return Err(SourceError::DirNotFound(dir.to_string()));
        }

        let entries = fs::read_dir(&full).map_err(|e| SourceError::Io {
            path: dir.to_string(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SourceError::Io {
                path: dir.to_string(),
                source: e,
            })?;

            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name() {
                names.push(join_path(dir, &name.to_string_lossy()));
            }
        }

        // read_dir order is platform dependent
        names.sort();
        Ok(names)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        fs::read(self.resolve(path)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_string()),
            _ => SourceError::Io {
                path: path.to_string(),
                source: e,
            },
        })
    }
}

// ===========================================
// In-memory corpus
// ===========================================

/// Mock corpus for testing.
/// Cloning creates a new handle to the same underlying files.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    reads: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file (for test setup).
    pub fn add_file(&self, path: &str, data: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), data.into());
    }

    /// Remove a file.
    pub fn remove_file(&self, path: &str) {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path);
    }

    /// Number of successful and failed `read_file` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl FixtureSource for MockSource {
    fn list_entries(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        let dir = normalize_dir(dir);
        let prefix = if dir == "." {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        let mut dir_exists = dir == ".";
        let mut names = Vec::new();

        for path in files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            dir_exists = true;
            // Nested paths belong to subdirectories.
            if !rest.contains('/') {
                names.push(path.clone());
            }
        }

        if !dir_exists {
            return Err(SourceError::DirNotFound(dir.to_string()));
        }
        Ok(names)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }
}
