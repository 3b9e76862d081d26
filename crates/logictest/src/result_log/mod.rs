//! The line-oriented result log.
//!
//! Every reported record becomes one line:
//!
//! ```text
//! <timestamp> <path>:<line>: <query> <status>
//! <timestamp> <path>:<line>: <query> :<nanos>: <status>
//! ```
//!
//! The second form is written when durations are enabled. `status` is `ok`, `skipped` or
//! `not ok: <message>`.

mod reader;
mod writer;

pub use self::reader::{
    parse_line, parse_result_file, parse_result_file_with_duration, parse_result_log,
    LogParseError, LogParseErrorKind, ResultLogEntry, ResultType,
};
pub use self::writer::{
    format_rfc3339_nanos, short_test_path, truncate_query, LogOptions, ResultLogWriter,
};
