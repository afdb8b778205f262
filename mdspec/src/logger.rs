//! Progress logging for spec checks.
//!
//! The checker reports through an injected [`Logger`]. Workers of a
//! concurrent check never log; only the thread driving the check does.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Level of a log line. Lower levels are always more important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// First failure of a check.
    Normal,
    /// Cases loaded, scheduling mode, completion.
    Verbose,
    /// How `latest` was resolved.
    Debug,
}

pub trait Logger: Send + Sync {
    fn log(&self, level: Verbosity, message: &str);

    fn info(&self, message: &str) {
        self.log(Verbosity::Normal, message);
    }

    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    fn debug(&self, message: &str) {
        self.log(Verbosity::Debug, message);
    }
}

/// Writes `mdspec: <message>` lines to stderr, up to a maximum level.
#[derive(Debug)]
pub struct StderrLogger {
    max_level: Verbosity,
}

impl StderrLogger {
    pub fn new(max_level: Verbosity) -> Self {
        Self { max_level }
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level > self.max_level {
            return;
        }
        let _ = writeln!(std::io::stderr().lock(), "mdspec: {}", message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Verbosity,
    pub message: String,
}

/// Records every line in memory. Clones append to the same record.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Verbosity, message: &str) {
        let entry = LogEntry {
            level,
            message: message.to_string(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }
}

/// Discards everything. Default for the free-function entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Verbosity, _message: &str) {}
}
