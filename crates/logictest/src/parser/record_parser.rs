//! Parsing of the SQL body and the expected-result block of a record.

use std::iter::Peekable;

use super::location::Location;
use super::records::ExpectedResults;
use super::{ParseError, ParseErrorKind};

pub(crate) const RESULTS_DELIMITER: &str = "----";

const HASH_MARKER: &str = " values hashing to ";

/// Check if a line is likely a directive (not SQL content).
pub(crate) fn is_directive_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("statement ")
        || trimmed.starts_with("query ")
        || trimmed == "halt"
        || trimmed.starts_with("skipif ")
        || trimmed.starts_with("onlyif ")
        || trimmed.starts_with("hash-threshold ")
}

/// Parse one or more lines until an empty line or the results delimiter.
///
/// Returns the joined lines and whether the delimiter was consumed.
pub(crate) fn parse_lines<'a>(
    lines: &mut Peekable<impl Iterator<Item = (usize, &'a str)>>,
    loc: &Location,
    delimiter: Option<&str>,
) -> Result<(String, bool), ParseError> {
    let mut found_delimiter = false;
    let mut out: String = match lines.next() {
        Some((_, line)) if !line.trim().is_empty() => line.into(),
        _ => return Err(ParseErrorKind::UnexpectedEOF.at(loc.clone().next_line())),
    };

    while let Some((_, next_line)) = lines.peek() {
        let next_line = *next_line;
        if next_line.trim().is_empty() {
            break;
        }
        if delimiter.is_some_and(|d| next_line.trim() == d) {
            found_delimiter = true;
            lines.next();
            break;
        }
        // A directive without a separating blank line starts the next record.
        if is_directive_line(next_line) {
            break;
        }
        lines.next();
        out.push('\n');
        out.push_str(next_line);
    }

    Ok((out, found_delimiter))
}

/// Parse the expected-result lines under `----`, up to the next empty line.
pub(crate) fn parse_results<'a>(
    lines: &mut Peekable<impl Iterator<Item = (usize, &'a str)>>,
    loc: &Location,
) -> Result<ExpectedResults, ParseError> {
    let mut values = vec![];
    while let Some((_, line)) = lines.peek() {
        if line.trim().is_empty() {
            break;
        }
        values.push(line.to_string());
        lines.next();
    }

    if let [only] = values.as_slice() {
        if let Some((count, hash)) = only.split_once(HASH_MARKER) {
            let num_values = count
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseErrorKind::InvalidNumber(count.to_string()).at(loc.clone()))?;
            return Ok(ExpectedResults::Hash {
                num_values,
                hash: hash.trim().to_string(),
            });
        }
    }

    Ok(ExpectedResults::Values(values))
}

/// Formats the summary line written in place of literal values for large result sets.
pub fn format_hash_line(num_values: usize, hash: &str) -> String {
    format!("{num_values}{HASH_MARKER}{hash}")
}
