//! Output of a single record execution.

use std::time::Duration;

use crate::error_handling::{AnyError, Mismatch};

/// Result set returned by a [`Harness`](crate::Harness) query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    /// One type character per result column: `I` integer, `R` real, `T` text.
    pub schema: String,
    /// Row-major, flattened, stringified cell values.
    pub rows: Vec<String>,
}

impl QueryOutput {
    pub fn new(schema: impl Into<String>, rows: Vec<String>) -> Self {
        Self {
            schema: schema.into(),
            rows,
        }
    }

    pub fn num_columns(&self) -> usize {
        self.schema.chars().count()
    }
}

/// What gets written to the result log for one record.
#[derive(Debug, Clone)]
pub enum Report {
    Ok,
    NotOk(Mismatch),
    Skipped,
}

impl Report {
    /// The status word as written in the result log.
    pub fn status(&self) -> String {
        match self {
            Report::Ok => "ok".to_string(),
            Report::NotOk(mismatch) => format!("not ok: {mismatch}"),
            Report::Skipped => "skipped".to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Report::NotOk(_))
    }
}

/// The outcome of executing one record.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// `None` when nothing is reported, e.g. for `halt`.
    pub report: Option<Report>,
    /// The rows the engine returned, for queries that executed without an error. Rows are in
    /// execution order, not normalized.
    pub observed: Option<QueryOutput>,
    /// The engine error, if the harness returned one.
    pub error: Option<AnyError>,
    /// Whether the runner should go on with the next record of the file.
    pub should_continue: bool,
    /// Wall time spent in the harness call.
    pub duration: Duration,
}

impl Outcome {
    pub(crate) fn new(report: Report) -> Self {
        Self {
            report: Some(report),
            observed: None,
            error: None,
            should_continue: true,
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn ok() -> Self {
        Self::new(Report::Ok)
    }

    pub(crate) fn not_ok(mismatch: Mismatch) -> Self {
        Self::new(Report::NotOk(mismatch))
    }

    pub(crate) fn skipped() -> Self {
        Self::new(Report::Skipped)
    }

    /// Nothing to report; the rest of the file is not run.
    pub(crate) fn stop() -> Self {
        Self {
            report: None,
            observed: None,
            error: None,
            should_continue: false,
            duration: Duration::ZERO,
        }
    }

    /// An engine error: reported as `not ok` and propagated to the caller.
    pub(crate) fn engine_error(error: AnyError) -> Self {
        Self {
            error: Some(error.clone()),
            ..Self::not_ok(Mismatch::UnexpectedError(error))
        }
    }

    #[must_use]
    pub(crate) fn with_observed(mut self, observed: QueryOutput) -> Self {
        self.observed = Some(observed);
        self
    }

    #[must_use]
    pub(crate) fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_failure(&self) -> bool {
        self.report.as_ref().is_some_and(Report::is_failure)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.report, Some(Report::Skipped))
    }
}
