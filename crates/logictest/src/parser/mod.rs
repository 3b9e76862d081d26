//! Sqllogictest parser.
//!
//! Turns the text of a test file into the ordered [`Record`]s the runner executes. Only the
//! directives the runner acts on become records; comments, blank lines and `hash-threshold`
//! lines are folded into parser state.

use std::path::Path;

pub mod location;
pub mod record_parser;
pub mod records;

pub use self::location::Location;
pub use self::record_parser::format_hash_line;
pub use self::records::{
    Condition, Conditions, ExpectedResults, QueryExpect, Record, RecordKind, SortMode,
};

use self::record_parser::{parse_lines, parse_results, RESULTS_DELIMITER};

/// The error type for parsing sqllogictest.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
#[error("parse error at {loc}: {kind}")]
pub struct ParseError {
    kind: ParseErrorKind,
    loc: Location,
}

impl ParseError {
    /// Returns the corresponding [`ParseErrorKind`] for this error.
    pub fn kind(&self) -> ParseErrorKind {
        self.kind.clone()
    }

    /// Returns the location from which the error originated.
    pub fn location(&self) -> Location {
        self.loc.clone()
    }
}

/// The error kind for parsing sqllogictest.
#[derive(thiserror::Error, Debug, Eq, PartialEq, Clone)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("unexpected EOF")]
    UnexpectedEOF,
    #[error("invalid line: {0:?}")]
    InvalidLine(String),
    #[error("invalid type character: {0:?} in type string")]
    InvalidType(char),
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("statement should have no result, use `query` instead")]
    StatementHasResults,
    #[error("cannot read file: {0}")]
    Io(String),
}

impl ParseErrorKind {
    pub(crate) fn at(self, loc: Location) -> ParseError {
        ParseError { kind: self, loc }
    }
}

/// Parse a sqllogictest script into a list of records.
pub fn parse(script: &str) -> Result<Vec<Record>, ParseError> {
    parse_inner(&Location::new("<unknown>", 0), script)
}

/// Parse a sqllogictest script into a list of records with a given script name.
pub fn parse_with_name(
    script: &str,
    name: impl Into<std::sync::Arc<str>>,
) -> Result<Vec<Record>, ParseError> {
    parse_inner(&Location::new(name, 0), script)
}

/// Parse a sqllogictest file.
pub fn parse_file(filename: impl AsRef<Path>) -> Result<Vec<Record>, ParseError> {
    let filename = filename.as_ref();
    let loc = Location::new(&*filename.to_string_lossy(), 0);
    let script = fs_err::read_to_string(filename)
        .map_err(|e| ParseErrorKind::Io(e.to_string()).at(loc.clone()))?;
    parse_inner(&loc, &script)
}

fn parse_inner(loc: &Location, script: &str) -> Result<Vec<Record>, ParseError> {
    let mut lines = script.lines().enumerate().peekable();
    let mut records = vec![];
    let mut conditions = Conditions::default();
    // 0 means never hashing
    let mut hash_threshold = 0usize;

    while let Some((num, line)) = lines.next() {
        if line.starts_with('#') {
            continue;
        }

        let mut loc = loc.clone();
        loc.line = num as u32 + 1;

        let tokens: Vec<&str> = strip_inline_comment(line).split_whitespace().collect();
        match tokens.as_slice() {
            [] => continue,
            ["halt"] => records.push(Record::Halt {
                loc,
                conditions: std::mem::take(&mut conditions),
            }),
            ["skipif", engine] => conditions.push(
                Condition::SkipIf {
                    engine: engine.to_string(),
                },
                loc.line,
            ),
            ["onlyif", engine] => conditions.push(
                Condition::OnlyIf {
                    engine: engine.to_string(),
                },
                loc.line,
            ),
            ["hash-threshold", threshold] => {
                hash_threshold = threshold.parse::<usize>().map_err(|_| {
                    ParseErrorKind::InvalidNumber((*threshold).into()).at(loc.clone())
                })?;
            }
            ["statement", res @ ..] => {
                let expect_error = match res {
                    ["ok"] => false,
                    ["error", ..] => true,
                    _ => return Err(ParseErrorKind::InvalidLine(line.into()).at(loc)),
                };

                let (sql, has_results) = parse_lines(&mut lines, &loc, Some(RESULTS_DELIMITER))?;
                if has_results {
                    return Err(ParseErrorKind::StatementHasResults.at(loc));
                }

                records.push(Record::Statement {
                    loc,
                    conditions: std::mem::take(&mut conditions),
                    sql,
                    expect_error,
                });
            }
            ["query", schema, res @ ..] => {
                // query <type-string> [<sort-mode>] [<label>]
                if let Some(ch) = schema.chars().find(|&ch| !matches!(ch, 'I' | 'R' | 'T')) {
                    return Err(ParseErrorKind::InvalidType(ch).at(loc));
                }
                let sort_mode = res.first().and_then(|s| SortMode::try_from_str(s));
                let res = &res[usize::from(sort_mode.is_some())..];
                let label = match res {
                    [] => None,
                    [label] => Some(label.to_string()),
                    _ => return Err(ParseErrorKind::InvalidLine(line.into()).at(loc)),
                };

                let (sql, has_results) = parse_lines(&mut lines, &loc, Some(RESULTS_DELIMITER))?;
                let results = if has_results {
                    parse_results(&mut lines, &loc)?
                } else {
                    ExpectedResults::Values(vec![])
                };

                records.push(Record::Query {
                    loc,
                    conditions: std::mem::take(&mut conditions),
                    sql,
                    expected: QueryExpect {
                        schema: schema.to_string(),
                        sort_mode,
                        label,
                        hash_threshold,
                        results,
                    },
                });
            }
            _ => return Err(ParseErrorKind::InvalidLine(line.into()).at(loc)),
        }
    }

    Ok(records)
}

/// Drops a trailing `# ...` comment from a directive line, as in `skipif mysql # not compatible`.
/// A `#` only starts a comment when whitespace precedes it.
pub(crate) fn strip_inline_comment(line: &str) -> &str {
    line.match_indices('#')
        .find(|(pos, _)| line[..*pos].ends_with(char::is_whitespace))
        .map_or(line, |(pos, _)| &line[..pos])
}
