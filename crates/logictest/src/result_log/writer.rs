//! Writing of result log lines.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::{Component, Path};

use chrono::{DateTime, FixedOffset, Local, Timelike};

use crate::config::LogConfig;
use crate::executor::ExecutionContext;
use crate::output::{Outcome, Report};

/// Queries longer than this are truncated when truncation is on.
const MAX_QUERY_LEN: usize = 50;
/// Characters kept from a truncated query, before the `...` marker.
const TRUNCATED_QUERY_LEN: usize = 47;
/// Number of trailing path components kept in log lines.
const MAX_PATH_COMPONENTS: usize = 4;

/// Options that shape each log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub truncate_queries: bool,
    pub durations: bool,
    /// Directory name where test paths are cut off, e.g. `test` turns
    /// `/src/test/index/t.test` into `index/t.test`.
    pub root_dir: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            truncate_queries: false,
            durations: false,
            root_dir: "test".to_string(),
        }
    }
}

impl LogOptions {
    pub fn from_config(log: &LogConfig, root_dir: &str) -> Self {
        Self {
            truncate_queries: log.truncate_queries,
            durations: log.durations,
            root_dir: root_dir.to_string(),
        }
    }
}

/// Writes one line per reported record to the underlying sink.
pub struct ResultLogWriter<W: Write> {
    out: W,
    options: LogOptions,
}

impl<W: Write> ResultLogWriter<W> {
    pub fn new(out: W, options: LogOptions) -> Self {
        Self { out, options }
    }

    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes the log line for `outcome`. Outcomes that report nothing write nothing.
    pub fn write_outcome(
        &mut self,
        ctx: &ExecutionContext<'_>,
        outcome: &Outcome,
    ) -> io::Result<()> {
        let Some(report) = &outcome.report else {
            return Ok(());
        };
        let duration = self.options.durations.then_some(outcome.duration);
        let line = self.format_line(ctx, report, duration, Local::now().fixed_offset());
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    /// Formats a complete log line, without the trailing newline.
    pub fn format_line(
        &self,
        ctx: &ExecutionContext<'_>,
        report: &Report,
        duration: Option<std::time::Duration>,
        now: DateTime<FixedOffset>,
    ) -> String {
        let mut line = format!(
            "{} {}:{}: {}",
            format_rfc3339_nanos(&now),
            short_test_path(ctx.test_file, &self.options.root_dir),
            ctx.record.line(),
            self.query_text(ctx.record.sql()),
        );
        if let Some(duration) = duration {
            line.push_str(&format!(" :{}:", duration.as_nanos()));
        }
        line.push(' ');
        line.push_str(&report.status());
        line.replace('\n', " ")
    }

    fn query_text<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        if self.options.truncate_queries {
            truncate_query(sql)
        } else {
            Cow::Borrowed(sql)
        }
    }
}

/// Shortens `query` to 47 characters and `...` when it is longer than 50 characters.
pub fn truncate_query(query: &str) -> Cow<'_, str> {
    if query.chars().count() <= MAX_QUERY_LEN {
        return Cow::Borrowed(query);
    }
    let kept: String = query.chars().take(TRUNCATED_QUERY_LEN).collect();
    Cow::Owned(kept + "...")
}

/// The last few components of `path`, stopping early at the suite root directory.
pub fn short_test_path(path: &Path, root_dir: &str) -> String {
    let mut parts = vec![];
    for component in path.components().rev() {
        let Component::Normal(name) = component else {
            break;
        };
        if name == root_dir || parts.len() == MAX_PATH_COMPONENTS {
            break;
        }
        parts.push(name.to_string_lossy());
    }
    parts.reverse();
    parts.join("/")
}

/// Formats a timestamp like RFC 3339 with nanoseconds, trailing zeros trimmed.
///
/// `2019-10-16T12:20:29.0594292-07:00`, or a `Z` suffix for UTC.
pub fn format_rfc3339_nanos(time: &DateTime<FixedOffset>) -> String {
    let mut out = time.format("%Y-%m-%dT%H:%M:%S").to_string();
    // leap seconds are reported as nanos past one second
    let nanos = time.nanosecond() % 1_000_000_000;
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    if time.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&time.format("%:z").to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Mismatch;
    use crate::parser::parse;
    use std::time::Duration;

    fn fixed_time(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_format_rfc3339_nanos() {
        assert_eq!(
            format_rfc3339_nanos(&fixed_time("2019-10-16T12:20:29.0594292-07:00")),
            "2019-10-16T12:20:29.0594292-07:00"
        );
        assert_eq!(
            format_rfc3339_nanos(&fixed_time("2019-10-16T12:20:29+00:00")),
            "2019-10-16T12:20:29Z"
        );
        assert_eq!(
            format_rfc3339_nanos(&fixed_time("2019-10-16T12:20:29.500+05:30")),
            "2019-10-16T12:20:29.5+05:30"
        );
    }

    #[test]
    fn test_short_test_path() {
        let root = "test";
        assert_eq!(
            short_test_path(Path::new("/src/sqllogictest/test/index/random/10/slt_good_0.test"), root),
            "index/random/10/slt_good_0.test"
        );
        assert_eq!(
            short_test_path(Path::new("/a/b/c/d/e/f.test"), root),
            "c/d/e/f.test"
        );
        assert_eq!(short_test_path(Path::new("test/select1.test"), root), "select1.test");
        assert_eq!(short_test_path(Path::new("select1.test"), root), "select1.test");
    }

    #[test]
    fn test_truncate_query() {
        let short = "SELECT 1";
        assert_eq!(truncate_query(short), short);
        let exactly_fifty = "x".repeat(50);
        assert_eq!(truncate_query(&exactly_fifty), exactly_fifty);

        let long = format!("SELECT {}", "a".repeat(60));
        let truncated = truncate_query(&long);
        assert_eq!(truncated.len(), 50);
        assert!(truncated.ends_with("..."));
        assert!(long.starts_with(&truncated[..47]));
    }

    #[test]
    fn test_format_line() {
        let records = parse("statement ok\nCREATE TABLE t1(\n  a INTEGER)\n").unwrap();
        let ctx = ExecutionContext {
            test_file: Path::new("/work/test/select1.test"),
            record: &records[0],
        };
        let now = fixed_time("2019-10-16T12:20:29.0594292-07:00");

        let writer = ResultLogWriter::new(Vec::<u8>::new(), LogOptions::default());
        assert_eq!(
            writer.format_line(&ctx, &Report::Ok, None, now),
            "2019-10-16T12:20:29.0594292-07:00 select1.test:1: CREATE TABLE t1(   a INTEGER) ok"
        );

        let writer = ResultLogWriter::new(
            Vec::<u8>::new(),
            LogOptions {
                durations: true,
                ..LogOptions::default()
            },
        );
        assert_eq!(
            writer.format_line(
                &ctx,
                &Report::NotOk(Mismatch::ExpectedError),
                Some(Duration::from_nanos(123_456)),
                now
            ),
            "2019-10-16T12:20:29.0594292-07:00 select1.test:1: CREATE TABLE t1(   a INTEGER) \
             :123456: not ok: Expected error but didn't get one"
        );
    }

    #[test]
    fn test_write_outcome_skips_unreported() {
        let records = parse("halt\n").unwrap();
        let ctx = ExecutionContext {
            test_file: Path::new("t.test"),
            record: &records[0],
        };
        let mut writer = ResultLogWriter::new(Vec::<u8>::new(), LogOptions::default());
        writer.write_outcome(&ctx, &Outcome::stop()).unwrap();
        writer.write_outcome(&ctx, &Outcome::skipped()).unwrap();

        let written = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.ends_with("t.test:1:  skipped\n"));
    }
}
