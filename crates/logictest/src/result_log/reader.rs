//! Parsing of result logs written by [`ResultLogWriter`](super::ResultLogWriter).
//!
//! Lines that do not start with a timestamp are ignored, so logs may be interleaved with other
//! output. A line that starts with a timestamp but cannot be parsed aborts the whole parse.

use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

const NOT_OK_MARKER: &str = "not ok: ";

/// The status of one logged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Ok,
    NotOk,
    Skipped,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultType::Ok => f.write_str("ok"),
            ResultType::NotOk => f.write_str("not ok"),
            ResultType::Skipped => f.write_str("skipped"),
        }
    }
}

/// One parsed line of a result log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLogEntry {
    pub entry_time: DateTime<FixedOffset>,
    pub test_file: String,
    pub line_num: u32,
    /// Possibly truncated, with newlines flattened to spaces.
    pub query: String,
    /// Only present in logs written with durations.
    pub duration: Option<Duration>,
    pub result: ResultType,
    /// Only present for [`ResultType::NotOk`].
    pub error_message: Option<String>,
}

/// The error type for parsing result logs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct LogParseError {
    line: usize,
    kind: LogParseErrorKind,
}

impl LogParseError {
    /// 1-based line number in the log.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn kind(&self) -> &LogParseErrorKind {
        &self.kind
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LogParseErrorKind {
    #[error("malformed log line: {0:?}")]
    Malformed(String),
    #[error("invalid line number: {0:?}")]
    InvalidLineNumber(String),
    #[error("missing or invalid duration in: {0:?}")]
    InvalidDuration(String),
    #[error("unknown test result in: {0:?}")]
    UnknownResult(String),
    #[error("cannot read log: {0}")]
    Io(String),
}

impl LogParseErrorKind {
    fn at(self, line: usize) -> LogParseError {
        LogParseError { line, kind: self }
    }
}

/// Parses a result log file written without durations.
pub fn parse_result_file(path: impl AsRef<Path>) -> Result<Vec<ResultLogEntry>, LogParseError> {
    parse_file(path.as_ref(), false)
}

/// Parses a result log file written with durations.
pub fn parse_result_file_with_duration(
    path: impl AsRef<Path>,
) -> Result<Vec<ResultLogEntry>, LogParseError> {
    parse_file(path.as_ref(), true)
}

fn parse_file(path: &Path, with_durations: bool) -> Result<Vec<ResultLogEntry>, LogParseError> {
    let file = fs_err::File::open(path).map_err(|e| LogParseErrorKind::Io(e.to_string()).at(0))?;
    parse_result_log(std::io::BufReader::new(file), with_durations)
}

/// Parses every entry of a result log.
pub fn parse_result_log(
    reader: impl BufRead,
    with_durations: bool,
) -> Result<Vec<ResultLogEntry>, LogParseError> {
    let mut entries = vec![];
    for (num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LogParseErrorKind::Io(e.to_string()).at(num + 1))?;
        let line = line.trim_end_matches('\r');
        if let Some(entry) = parse_line(line, with_durations).map_err(|kind| kind.at(num + 1))? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Parses one log line. Returns `None` for lines that are not log entries.
///
/// Without durations the query and the status share one field, so the split is ambiguous. The
/// first `not ok: ` in the line wins, then a trailing `ok`, then a trailing `skipped`. A query that
/// itself contains `not ok: ` therefore reads back as a failure.
pub fn parse_line(
    line: &str,
    with_durations: bool,
) -> Result<Option<ResultLogEntry>, LogParseErrorKind> {
    let Some((timestamp, rest)) = line.split_once(' ') else {
        return Ok(None);
    };
    let Ok(entry_time) = DateTime::parse_from_rfc3339(timestamp) else {
        return Ok(None);
    };

    let malformed = || LogParseErrorKind::Malformed(line.to_string());
    let (test_file, rest) = rest.split_once(':').ok_or_else(malformed)?;
    let (line_num, body) = rest.split_once(':').ok_or_else(malformed)?;
    let line_num = line_num
        .parse::<u32>()
        .map_err(|_| LogParseErrorKind::InvalidLineNumber(line_num.to_string()))?;
    // the writer puts a single space between the location and the query
    let body = body.strip_prefix(' ').unwrap_or(body);

    let (query, duration, status) = if with_durations {
        let (query, nanos, status) = split_duration(body)
            .ok_or_else(|| LogParseErrorKind::InvalidDuration(line.to_string()))?;
        (query, Some(Duration::from_nanos(nanos)), status)
    } else {
        (body, None, body)
    };

    let (result, status_start, error_message) = if let Some(idx) = status.find(NOT_OK_MARKER) {
        let message = &status[idx + NOT_OK_MARKER.len()..];
        (ResultType::NotOk, idx, Some(message.to_string()))
    } else if status.ends_with("ok") {
        (ResultType::Ok, status.len() - "ok".len(), None)
    } else if status.ends_with("skipped") {
        (ResultType::Skipped, status.len() - "skipped".len(), None)
    } else {
        return Err(LogParseErrorKind::UnknownResult(line.to_string()));
    };

    let query = if with_durations {
        query
    } else {
        let query = &query[..status_start];
        query.strip_suffix(' ').unwrap_or(query)
    };

    Ok(Some(ResultLogEntry {
        entry_time,
        test_file: test_file.to_string(),
        line_num,
        query: query.to_string(),
        duration,
        result,
        error_message,
    }))
}

/// Splits `<query> :<nanos>: <status>` at the first duration field.
fn split_duration(body: &str) -> Option<(&str, u64, &str)> {
    for (idx, _) in body.match_indices(" :") {
        let after = &body[idx + 2..];
        let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            continue;
        }
        let Some(status) = after[digits..].strip_prefix(':') else {
            continue;
        };
        let nanos = after[..digits].parse::<u64>().ok()?;
        let status = status.strip_prefix(' ').unwrap_or(status);
        return Some((&body[..idx], nanos, status));
    }
    None
}
