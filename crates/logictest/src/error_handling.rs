//! Error types for sqllogictest execution.
//!
//! Two families live here. [`Mismatch`] covers the recoverable failures of a single record: they
//! are reported as `not ok` lines and the run moves on. Their `Display` output is the message
//! written to the result log, so existing log tooling depends on the exact wording. [`TestError`]
//! covers file-level failures that abort the run.

use std::sync::Arc;

use crate::parser::ParseError;
use crate::result_log::LogParseError;

/// Type-erased error type.
pub type AnyError = Arc<dyn std::error::Error + Send + Sync>;

/// Why a single record was reported as `not ok`.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Mismatch {
    #[error("Expected error but didn't get one")]
    ExpectedError,
    #[error("Unexpected error {0}")]
    UnexpectedError(AnyError),
    #[error("Schemas differ. Expected {expected}, got {actual}")]
    Schema { expected: String, actual: String },
    #[error("Incorrect number of results. Expected {expected}, got {actual}")]
    ResultCount { expected: usize, actual: usize },
    #[error("Incorrect result at position {position}. Expected {expected}, got {actual}")]
    Result {
        position: usize,
        expected: String,
        actual: String,
    },
    #[error("Hash of results differ. Expected {expected}, got {actual}")]
    Hash { expected: String, actual: String },
    #[error("Caught panic: {0}")]
    Panic(String),
}

/// The error type for file-level failures. Any of these aborts the run.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum TestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("harness initialization failed for {file}: {source}")]
    HarnessInit { file: String, source: AnyError },
    #[error("failed to parse result log: {0}")]
    LogParse(#[from] LogParseError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid test path pattern: {0}")]
    Pattern(String),
}

/// Flattens a panic payload into a single-line message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    message.replace('\n', " ")
}
