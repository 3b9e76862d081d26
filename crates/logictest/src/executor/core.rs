//! Core Runner struct and the harness trait it drives.

use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collect::collect_test_files;
use crate::config::SuiteConfig;
use crate::error_handling::{panic_message, AnyError, Mismatch, TestError};
use crate::output::{Outcome, QueryOutput};
use crate::parser::{parse_with_name, Record};
use crate::result_log::ResultLogWriter;
use crate::result_updater::{RewriteMode, TestFileRewriter};

use super::record_processor::execute_record;

/// The database engine under test.
///
/// Every call blocks until the engine answers; the runner never issues two calls at once.
pub trait Harness {
    /// The error type of SQL execution.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Prepares a clean database. Called once before each test file.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Engine name matched against `skipif`/`onlyif` conditions.
    fn engine_name(&self) -> &str;

    /// Run a statement, discarding any results.
    fn execute_statement(&mut self, sql: &str) -> Result<(), Self::Error>;

    /// Run a query and return its schema string and flattened, stringified rows.
    fn execute_query(&mut self, sql: &str) -> Result<QueryOutput, Self::Error>;
}

/// The file and record currently being executed, threaded through to the log writer.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub test_file: &'a Path,
    pub record: &'a Record,
}

/// Counts of reported outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ok: usize,
    pub not_ok: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        use crate::output::Report;
        match &outcome.report {
            Some(Report::Ok) => self.ok += 1,
            Some(Report::NotOk(_)) => self.not_ok += 1,
            Some(Report::Skipped) => self.skipped += 1,
            None => {}
        }
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.ok += other.ok;
        self.not_ok += other.not_ok;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> usize {
        self.ok + self.not_ok + self.skipped
    }
}

/// Sqllogictest runner.
pub struct Runner<H: Harness, W: Write> {
    harness: H,
    log: ResultLogWriter<W>,
    suite: SuiteConfig,
    /// Replaces the `hash-threshold` of every query when set.
    hash_threshold: Option<usize>,
}

impl<H: Harness, W: Write> Runner<H, W> {
    /// Create a new runner that reports to the given result log.
    pub fn new(harness: H, log: ResultLogWriter<W>) -> Self {
        Runner {
            harness,
            log,
            suite: SuiteConfig::default(),
            hash_threshold: None,
        }
    }

    pub fn with_suite_config(mut self, suite: SuiteConfig) -> Self {
        self.suite = suite;
        self
    }

    pub fn with_hash_threshold(mut self, hash_threshold: Option<usize>) -> Self {
        self.hash_threshold = hash_threshold;
        self
    }

    pub fn harness(&self) -> &H {
        &self.harness
    }

    pub fn harness_mut(&mut self) -> &mut H {
        &mut self.harness
    }

    pub fn log_writer(&self) -> &ResultLogWriter<W> {
        &self.log
    }

    /// Consumes the runner, returning the harness and the log sink.
    pub fn into_parts(self) -> (H, W) {
        (self.harness, self.log.into_inner())
    }

    /// Runs every test file found under `paths`.
    pub fn run_test_files(
        &mut self,
        paths: &[impl AsRef<Path>],
    ) -> Result<RunSummary, TestError> {
        let mut summary = RunSummary::default();
        for file in collect_test_files(paths, &self.suite.extension)? {
            summary.merge(self.run_test_file(&file)?);
        }
        Ok(summary)
    }

    /// Runs a single test file, stopping early at a `halt`.
    pub fn run_test_file(&mut self, path: impl AsRef<Path>) -> Result<RunSummary, TestError> {
        let path = path.as_ref();
        tracing::info!(file = %path.display(), "running test file");
        let records = self.prepare(path)?.1;

        let mut summary = RunSummary::default();
        for record in &records {
            let outcome = self.execute_and_log(&ExecutionContext {
                test_file: path,
                record,
            })?;
            summary.record(&outcome);
            if !outcome.should_continue {
                tracing::debug!(line = record.line(), "stopping test file");
                break;
            }
        }
        Ok(summary)
    }

    /// Runs every test file under `paths` and writes `<file>.generated` copies holding the
    /// observed results.
    pub fn generate_test_files(
        &mut self,
        paths: &[impl AsRef<Path>],
    ) -> Result<Vec<PathBuf>, TestError> {
        self.rewrite_test_files(paths, RewriteMode::Generate)
    }

    /// Like [`Runner::generate_test_files`], but records that fail to execute are left out of
    /// the generated copies.
    pub fn filter_test_files(
        &mut self,
        paths: &[impl AsRef<Path>],
    ) -> Result<Vec<PathBuf>, TestError> {
        self.rewrite_test_files(paths, RewriteMode::Filter)
    }

    fn rewrite_test_files(
        &mut self,
        paths: &[impl AsRef<Path>],
        mode: RewriteMode,
    ) -> Result<Vec<PathBuf>, TestError> {
        collect_test_files(paths, &self.suite.extension)?
            .iter()
            .map(|file| self.rewrite_test_file(file, mode))
            .collect()
    }

    /// Runs one test file and writes its regenerated copy. Returns the path written.
    pub fn rewrite_test_file(
        &mut self,
        path: impl AsRef<Path>,
        mode: RewriteMode,
    ) -> Result<PathBuf, TestError> {
        let path = path.as_ref();
        tracing::info!(file = %path.display(), ?mode, "regenerating test file");
        let (source, records) = self.prepare(path)?;

        let mut rewriter = TestFileRewriter::new(&source, mode);
        for record in &records {
            let outcome = self.execute_and_log(&ExecutionContext {
                test_file: path,
                record,
            })?;
            rewriter.apply(record, &outcome);
            if !outcome.should_continue {
                // the rest of the file is carried over unchanged
                break;
            }
        }

        let generated = self.suite.generated_path(path);
        fs_err::write(&generated, rewriter.finish())?;
        Ok(generated)
    }

    /// Initializes the harness and parses the file.
    fn prepare(&mut self, path: &Path) -> Result<(String, Vec<Record>), TestError> {
        self.harness
            .init()
            .map_err(|e| TestError::HarnessInit {
                file: path.display().to_string(),
                source: Arc::new(e) as AnyError,
            })?;
        let source = fs_err::read_to_string(path)?;
        let mut records = parse_with_name(&source, &*path.to_string_lossy())?;
        if let Some(threshold) = self.hash_threshold {
            for record in &mut records {
                if let Record::Query { expected, .. } = record {
                    expected.hash_threshold = threshold;
                }
            }
        }
        Ok((source, records))
    }

    /// Executes one record and writes its log line.
    pub fn execute_and_log(&mut self, ctx: &ExecutionContext<'_>) -> Result<Outcome, TestError> {
        let outcome = self.execute_guarded(ctx.record);
        self.log.write_outcome(ctx, &outcome)?;
        Ok(outcome)
    }

    /// Executes one record, turning a panic raised while handling it into a `not ok` outcome so
    /// the rest of the file still runs.
    pub fn execute_guarded(&mut self, record: &Record) -> Outcome {
        tracing::debug!(line = record.line(), kind = %record.kind(), "executing record");
        let harness = &mut self.harness;
        match catch_unwind(AssertUnwindSafe(|| execute_record(harness, record))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(line = record.line(), %message, "caught panic while executing record");
                Outcome::not_ok(Mismatch::Panic(message))
            }
        }
    }
}
