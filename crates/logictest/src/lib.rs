//! Logictest - sqllogictest verification harness
//!
//! Runs sqllogictest files against a database engine through the [`Harness`] trait and reports
//! one result log line per record. Besides verification it can:
//! - regenerate test files with the observed results ([`Runner::generate_test_files`])
//! - drop records that fail to execute ([`Runner::filter_test_files`])
//! - read result logs back for reporting ([`result_log`])
//! - count statement usage across a suite ([`analyzer`])

pub mod analyzer;
pub mod collect;
pub mod config;
pub mod error_handling;
pub mod executor;
pub mod output;
pub mod parser;
pub mod result_log;
pub mod result_updater;
pub mod sqlite;

pub use error_handling::{AnyError, Mismatch, TestError};
pub use executor::{ExecutionContext, Harness, RunSummary, Runner};
pub use output::{Outcome, QueryOutput, Report};
pub use parser::{parse, parse_file, parse_with_name, ParseError, ParseErrorKind, Record};
pub use result_log::{LogOptions, ResultLogEntry, ResultLogWriter, ResultType};
pub use result_updater::RewriteMode;
pub use sqlite::SqliteHarness;
