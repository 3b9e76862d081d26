use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use logictest::{ResultLogEntry, ResultType, RunSummary};
use owo_colors::OwoColorize;

/// Number of slowest records listed in a report.
const SLOWEST_SHOWN: usize = 5;

/// Aggregated view over parsed result log entries.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogReport {
    pub ok: usize,
    pub not_ok: usize,
    pub skipped: usize,
    /// Failures per test file, most failures first.
    pub failures_by_file: Vec<(String, usize)>,
    /// Sum of all durations; `None` when the logs carry no durations.
    pub total_duration: Option<Duration>,
    /// `(location, duration)` of the slowest records.
    pub slowest: Vec<(String, Duration)>,
}

impl LogReport {
    pub fn from_entries(entries: &[ResultLogEntry]) -> Self {
        let mut report = LogReport::default();
        let mut failures: BTreeMap<&str, usize> = BTreeMap::new();
        let mut timed = vec![];

        for entry in entries {
            match entry.result {
                ResultType::Ok => report.ok += 1,
                ResultType::NotOk => {
                    report.not_ok += 1;
                    *failures.entry(entry.test_file.as_str()).or_default() += 1;
                }
                ResultType::Skipped => report.skipped += 1,
            }
            if let Some(duration) = entry.duration {
                timed.push((format!("{}:{}", entry.test_file, entry.line_num), duration));
            }
        }

        report.failures_by_file = failures
            .into_iter()
            .map(|(file, count)| (file.to_string(), count))
            .collect();
        // stable sort keeps files with equal counts in name order
        report.failures_by_file.sort_by(|a, b| b.1.cmp(&a.1));

        if !timed.is_empty() {
            report.total_duration = Some(timed.iter().map(|(_, d)| *d).sum());
            timed.sort_by(|a, b| b.1.cmp(&a.1));
            timed.truncate(SLOWEST_SHOWN);
            report.slowest = timed;
        }
        report
    }
}

/// Rounds to milliseconds for display.
fn rounded(duration: Duration) -> humantime::FormattedDuration {
    humantime::format_duration(Duration::from_millis(duration.as_millis() as u64))
}

pub fn print_summary(summary: &RunSummary, elapsed: Duration) {
    eprintln!(
        "{} {} ok, {} not ok, {} skipped ({} records) in {}",
        "Summary:".bold(),
        summary.ok.green(),
        summary.not_ok.red(),
        summary.skipped.yellow(),
        summary.total(),
        rounded(elapsed)
    );
}

pub fn print_generated(written: &[PathBuf], elapsed: Duration) {
    for path in written {
        eprintln!("{} {}", "Wrote".green(), path.display());
    }
    eprintln!(
        "{} {} generated files in {}",
        "Summary:".bold(),
        written.len(),
        rounded(elapsed)
    );
}

pub fn print_report(report: &LogReport) {
    println!("{}", "Results:".bold());
    println!("  {:<8} {:>10}", "ok", report.ok.green());
    println!("  {:<8} {:>10}", "not ok", report.not_ok.red());
    println!("  {:<8} {:>10}", "skipped", report.skipped.yellow());

    if !report.failures_by_file.is_empty() {
        println!("{}", "Failures by file:".bold());
        for (file, count) in &report.failures_by_file {
            println!("  {count:>10}  {file}");
        }
    }

    if let Some(total) = report.total_duration {
        println!("{} {}", "Total time:".bold(), rounded(total));
        println!("{}", "Slowest records:".bold());
        for (location, duration) in &report.slowest {
            println!("  {:>14}  {location}", rounded(*duration).to_string());
        }
    }
}
