//! Bounded-concurrency execution of a batch of examples.
//!
//! Two modes:
//!
//! - **Sequential**: examples run one at a time in fixture order and the
//!   batch stops at the first failure.
//! - **Bounded**: a pool of scoped worker threads pulls examples from a
//!   shared cursor, so at most `bound` conversions are in flight. The first
//!   failure observed is kept, a cancel flag stops further dispatch, calls
//!   already running finish, and every worker is joined before returning.
//!
//! In bounded mode the reported failure is the first one *detected*, not
//! necessarily the first in fixture order.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

use mdspec_schema::TestCase;

use crate::error::{CheckError, TestFailure};
use crate::runner::{run_case, Converter, Verdict};

/// Raw concurrency value that disables concurrency.
pub const NO_CONCURRENCY: i64 = -1;

/// Raw concurrency value that picks the bound from the host.
pub const DEFAULT_CONCURRENCY: i64 = 0;

/// How many conversions may run at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One at a time, in fixture order.
    Sequential,
    /// Bound equals the host's available parallelism.
    #[default]
    Auto,
    /// Explicit bound.
    Limit(NonZeroUsize),
}

impl Concurrency {
    /// Map a raw value: `0` is [`Concurrency::Auto`], positive values are a
    /// limit, `-1` (and any other negative value) is sequential.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Concurrency::Auto,
            n if n < 0 => Concurrency::Sequential,
            n => NonZeroUsize::new(usize::try_from(n).unwrap_or(usize::MAX))
                .map_or(Concurrency::Auto, Concurrency::Limit),
        }
    }

    /// Maximum number of in-flight conversions, or `None` when sequential.
    pub fn bound(&self) -> Option<usize> {
        match self {
            Concurrency::Sequential => None,
            Concurrency::Auto => Some(available_parallelism()),
            Concurrency::Limit(n) => Some(n.get()),
        }
    }
}

/// Host parallelism with a floor of one.
pub fn available_parallelism() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Flag that stops further dispatch once set.
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Counters from a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Examples handed to the converter.
    pub executed: usize,
    /// Worker threads used (1 when sequential).
    pub workers: usize,
}

/// Result of a collect-all run.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Version the examples came from.
    pub version: String,
    /// Examples in the fixture set.
    pub total: usize,
    /// Examples handed to the converter.
    pub executed: usize,
    /// Every failure, in fixture order.
    pub failures: Vec<TestFailure>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty() && self.executed == self.total
    }

    pub fn pass_count(&self) -> usize {
        self.executed - self.failures.len()
    }
}

/// Runs batches of examples under a concurrency policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    concurrency: Concurrency,
}

impl Scheduler {
    pub fn new(concurrency: Concurrency) -> Self {
        Self { concurrency }
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Run every example, stopping at the first failure.
    pub fn run_all<C: Converter + ?Sized>(
        &self,
        cases: &[TestCase],
        converter: &C,
    ) -> Result<RunStats, CheckError> {
        match self.concurrency.bound() {
            None => run_sequential(cases, converter),
            Some(bound) => run_bounded(cases, converter, bound),
        }
    }

    /// Run every example and collect all failures. Same bound as
    /// [`Scheduler::run_all`], but nothing is cancelled.
    pub fn collect_all<C: Converter + ?Sized>(
        &self,
        cases: &[TestCase],
        converter: &C,
    ) -> (RunStats, Vec<TestFailure>) {
        match self.concurrency.bound() {
            None => {
                let failures: Vec<_> = cases
                    .iter()
                    .filter_map(|case| match run_case(case, converter) {
                        Verdict::Pass => None,
                        Verdict::Fail(failure) => Some(failure),
                    })
                    .collect();
                let stats = RunStats {
                    executed: cases.len(),
                    workers: 1,
                };
                (stats, failures)
            }
            Some(bound) => collect_bounded(cases, converter, bound),
        }
    }
}

fn run_sequential<C: Converter + ?Sized>(
    cases: &[TestCase],
    converter: &C,
) -> Result<RunStats, CheckError> {
    for case in cases {
        if let Verdict::Fail(failure) = run_case(case, converter) {
            return Err(CheckError::TestFailed(failure));
        }
    }

    Ok(RunStats {
        executed: cases.len(),
        workers: 1,
    })
}

fn worker_count(bound: usize, cases: usize) -> usize {
    bound.max(1).min(cases)
}

fn run_bounded<C: Converter + ?Sized>(
    cases: &[TestCase],
    converter: &C,
    bound: usize,
) -> Result<RunStats, CheckError> {
    let workers = worker_count(bound, cases.len());
    let cursor = AtomicUsize::new(0);
    let executed = AtomicUsize::new(0);
    let first_failure: OnceLock<TestFailure> = OnceLock::new();
    let cancel = CancelFlag::new();

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                while !cancel.is_cancelled() {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(case) = cases.get(index) else {
                        break;
                    };

                    executed.fetch_add(1, Ordering::SeqCst);
                    if let Verdict::Fail(failure) = run_case(case, converter) {
                        // Only the first detected failure is kept.
                        let _ = first_failure.set(failure);
                        cancel.cancel();
                    }
                }
            });
        }
    });

    match first_failure.into_inner() {
        Some(failure) => Err(CheckError::Concurrent(failure)),
        None => Ok(RunStats {
            executed: executed.into_inner(),
            workers,
        }),
    }
}

fn collect_bounded<C: Converter + ?Sized>(
    cases: &[TestCase],
    converter: &C,
    bound: usize,
) -> (RunStats, Vec<TestFailure>) {
    let workers = worker_count(bound, cases.len());
    let cursor = AtomicUsize::new(0);
    let executed = AtomicUsize::new(0);
    let failures: Mutex<Vec<(usize, TestFailure)>> = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(case) = cases.get(index) else {
                    break;
                };

                executed.fetch_add(1, Ordering::SeqCst);
                if let Verdict::Fail(failure) = run_case(case, converter) {
                    failures
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .push((index, failure));
                }
            });
        }
    });

    let mut failures = failures.into_inner().unwrap_or_else(|e| e.into_inner());
    failures.sort_by_key(|(index, _)| *index);

    let stats = RunStats {
        executed: executed.into_inner(),
        workers,
    };
    (stats, failures.into_iter().map(|(_, f)| f).collect())
}
