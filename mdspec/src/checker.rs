//! Spec checker: ties the fixture store, version resolution, scheduler and
//! logger together.

use std::sync::Arc;

use mdspec_schema::TestCase;

use crate::decode::{Decoder, JsonDecoder};
use crate::error::{BoxError, CheckError};
use crate::logger::{Logger, NullLogger};
use crate::runner::Converter;
use crate::scheduler::{CheckReport, Concurrency, RunStats, Scheduler};
use crate::source::{EmbeddedSource, FixtureSource};
use crate::store::{FixtureLocation, FixtureStore};
use crate::version::SpecVersion;

/// Checks conversion functions against a fixture corpus.
///
/// ```
/// use mdspec::{Concurrency, SpecChecker};
///
/// let checker = SpecChecker::bundled().with_concurrency(Concurrency::Sequential);
/// let versions = checker.list_versions().unwrap();
/// assert_eq!(versions[0], "v0.31.2");
/// ```
pub struct SpecChecker<S = EmbeddedSource, D = JsonDecoder> {
    store: FixtureStore<S, D>,
    concurrency: Concurrency,
    logger: Arc<dyn Logger>,
}

impl SpecChecker<EmbeddedSource, JsonDecoder> {
    /// Checker over the corpus compiled into this crate.
    pub fn bundled() -> Self {
        Self::new(EmbeddedSource::bundled())
    }
}

impl Default for SpecChecker<EmbeddedSource, JsonDecoder> {
    fn default() -> Self {
        Self::bundled()
    }
}

impl<S: FixtureSource> SpecChecker<S, JsonDecoder> {
    /// Checker reading JSON fixtures from `source` at the default location.
    pub fn new(source: S) -> Self {
        Self {
            store: FixtureStore::new(source),
            concurrency: Concurrency::default(),
            logger: Arc::new(NullLogger),
        }
    }
}

impl<S: FixtureSource, D: Decoder> SpecChecker<S, D> {
    /// Builder: replace the decoder.
    pub fn with_decoder<D2: Decoder>(self, decoder: D2) -> SpecChecker<S, D2> {
        let FixtureStore {
            source, location, ..
        } = self.store;
        SpecChecker {
            store: FixtureStore::with_parts(source, decoder, location),
            concurrency: self.concurrency,
            logger: self.logger,
        }
    }

    /// Builder: set where corpus files live.
    pub fn with_location(mut self, location: FixtureLocation) -> Self {
        self.store.location = location;
        self
    }

    /// Builder: set the default concurrency for [`SpecChecker::check`].
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Builder: set the logger.
    pub fn with_logger<L: Logger + 'static>(mut self, logger: L) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn store(&self) -> &FixtureStore<S, D> {
        &self.store
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Check `f` against every example of `version` using the configured
    /// concurrency.
    pub fn check<F, E>(&self, version: &str, f: F) -> Result<(), CheckError>
    where
        F: Fn(&str) -> Result<String, E> + Sync,
        E: Into<BoxError>,
    {
        self.check_with(version, f, self.concurrency)
    }

    /// Check `f` against every example of `version` with an explicit
    /// concurrency.
    pub fn check_with<F, E>(
        &self,
        version: &str,
        f: F,
        concurrency: Concurrency,
    ) -> Result<(), CheckError>
    where
        F: Fn(&str) -> Result<String, E> + Sync,
        E: Into<BoxError>,
    {
        self.run(version, &f, concurrency).map(|_| ())
    }

    /// Like [`SpecChecker::check_with`] for any [`Converter`], returning the
    /// run counters on success.
    pub fn run<C: Converter + ?Sized>(
        &self,
        version: &str,
        converter: &C,
        concurrency: Concurrency,
    ) -> Result<RunStats, CheckError> {
        let (version, cases) = self.load(version)?;

        match concurrency.bound() {
            None => self.logger.verbose("running sequentially"),
            Some(bound) => self
                .logger
                .verbose(&format!("running with up to {} concurrent checks", bound)),
        }

        let result = Scheduler::new(concurrency).run_all(&cases, converter);
        match &result {
            Ok(stats) => self.logger.verbose(&format!(
                "checked {} of {} test cases for {}",
                stats.executed,
                cases.len(),
                version
            )),
            Err(e) => {
                if let Some(failure) = e.failure() {
                    self.logger.info(&format!("first failure: {}", failure.id()));
                }
            }
        }
        result
    }

    /// Run every example of `version` and collect all failures instead of
    /// stopping at the first one.
    pub fn report<F, E>(&self, version: &str, f: F) -> Result<CheckReport, CheckError>
    where
        F: Fn(&str) -> Result<String, E> + Sync,
        E: Into<BoxError>,
    {
        let (version, cases) = self.load(version)?;
        let (stats, failures) = Scheduler::new(self.concurrency).collect_all(&cases, &f);

        if let Some(first) = failures.first() {
            self.logger.info(&format!(
                "{} of {} test cases failed, first failure: {}",
                failures.len(),
                cases.len(),
                first.id()
            ));
        }

        Ok(CheckReport {
            version,
            total: cases.len(),
            executed: stats.executed,
            failures,
        })
    }

    /// Versions in the index, newest first.
    pub fn list_versions(&self) -> Result<Vec<String>, CheckError> {
        Ok(self
            .store
            .load_version_index()?
            .into_iter()
            .map(|entry| entry.version)
            .collect())
    }

    /// Validate `version`, resolve `latest` through the index, and load the
    /// examples. Syntax is checked before the corpus is touched.
    fn load(&self, version: &str) -> Result<(String, Vec<TestCase>), CheckError> {
        let requested = SpecVersion::parse(version)?;

        let resolved = if requested.needs_index() {
            let index = self.store.load_version_index()?;
            let resolved = requested
                .resolve(&index)
                .ok_or_else(|| CheckError::EmptyIndex(self.store.location().index_file.clone()))?;
            self.logger
                .debug(&format!("resolved {} to {}", requested, resolved));
            resolved
        } else {
            version.to_string()
        };

        let cases = self.store.load_fixtures(&resolved)?;
        self.logger.verbose(&format!(
            "loaded {} test cases for {}",
            cases.len(),
            resolved
        ));
        Ok((resolved, cases))
    }
}
