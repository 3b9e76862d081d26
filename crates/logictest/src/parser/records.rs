//! Record type definitions for sqllogictest files.

use std::fmt;

use super::location::Location;

/// A single executable unit of a test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A statement is an SQL command that is to be evaluated but from which we do not expect to
    /// get results (other than success or failure).
    Statement {
        loc: Location,
        conditions: Conditions,
        /// The SQL command.
        sql: String,
        /// Whether the statement is declared with `statement error`.
        expect_error: bool,
    },
    /// A query is an SQL command from which we expect to receive results. The result set might be
    /// empty.
    Query {
        loc: Location,
        conditions: Conditions,
        /// The SQL command.
        sql: String,
        expected: QueryExpect,
    },
    /// A halt record causes the rest of the test file to be ignored.
    Halt {
        loc: Location,
        conditions: Conditions,
    },
}

/// The kind of a [`Record`], used for logging and dispatch in callers that do not need the
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Statement,
    Query,
    Halt,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Statement => write!(f, "statement"),
            RecordKind::Query => write!(f, "query"),
            RecordKind::Halt => write!(f, "halt"),
        }
    }
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Statement { .. } => RecordKind::Statement,
            Record::Query { .. } => RecordKind::Query,
            Record::Halt { .. } => RecordKind::Halt,
        }
    }

    pub fn loc(&self) -> &Location {
        match self {
            Record::Statement { loc, .. } | Record::Query { loc, .. } | Record::Halt { loc, .. } => {
                loc
            }
        }
    }

    /// Line of the record's directive (`statement ...`, `query ...` or `halt`).
    pub fn line(&self) -> u32 {
        self.loc().line()
    }

    /// First line belonging to this record, including any `skipif`/`onlyif` lines before the
    /// directive.
    pub fn start_line(&self) -> u32 {
        self.conditions().first_line.unwrap_or_else(|| self.line())
    }

    pub fn conditions(&self) -> &Conditions {
        match self {
            Record::Statement { conditions, .. }
            | Record::Query { conditions, .. }
            | Record::Halt { conditions, .. } => conditions,
        }
    }

    /// The SQL text of the record. Empty for `halt`.
    pub fn sql(&self) -> &str {
        match self {
            Record::Statement { sql, .. } | Record::Query { sql, .. } => sql,
            Record::Halt { .. } => "",
        }
    }

    /// Returns whether this record should run against the engine with the given name.
    pub fn should_execute_for_engine(&self, engine: &str) -> bool {
        self.conditions().matches(engine)
    }
}

/// Expected outcome of a `query` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExpect {
    /// One type character per result column, e.g. `IIRT`.
    pub schema: String,
    /// `None` when the header carries no sort mode; treated as [`SortMode::NoSort`].
    pub sort_mode: Option<SortMode>,
    pub label: Option<String>,
    /// The `hash-threshold` in effect when the record was parsed. 0 means never hash.
    pub hash_threshold: usize,
    pub results: ExpectedResults,
}

impl QueryExpect {
    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode.unwrap_or_default()
    }

    /// Number of result values the query is expected to produce.
    pub fn num_results(&self) -> usize {
        match &self.results {
            ExpectedResults::Values(values) => values.len(),
            ExpectedResults::Hash { num_values, .. } => *num_values,
        }
    }

    pub fn is_hash_result(&self) -> bool {
        matches!(self.results, ExpectedResults::Hash { .. })
    }

    /// Whether `num_values` observed values are summarized as a hash when written out.
    pub fn should_hash(&self, num_values: usize) -> bool {
        self.hash_threshold > 0 && num_values > self.hash_threshold
    }

    /// The `query ...` header line for the given schema, keeping this record's sort mode and
    /// label.
    pub fn header(&self, schema: &str) -> String {
        let mut header = format!("query {schema}");
        match (self.sort_mode, &self.label) {
            (Some(sort_mode), _) => {
                header.push(' ');
                header.push_str(sort_mode.as_str());
            }
            (None, Some(_)) => {
                header.push(' ');
                header.push_str(SortMode::NoSort.as_str());
            }
            (None, None) => {}
        }
        if let Some(label) = &self.label {
            header.push(' ');
            header.push_str(label);
        }
        header
    }
}

/// The expected results of a query: either literal values, one per line, or a digest summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedResults {
    Values(Vec<String>),
    /// `<num_values> values hashing to <hash>`
    Hash { num_values: usize, hash: String },
}

/// Whether to apply sorting before checking the results of a query.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum SortMode {
    /// The default option. The results appear in exactly the order in which they were received
    /// from the database engine.
    #[default]
    NoSort,
    /// Gathers all output from the database engine then sorts it by rows.
    RowSort,
    /// It works like rowsort except that it does not honor row groupings. Each individual result
    /// value is sorted on its own.
    ValueSort,
}

impl SortMode {
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "nosort" => Some(Self::NoSort),
            "rowsort" => Some(Self::RowSort),
            "valuesort" => Some(Self::ValueSort),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSort => "nosort",
            Self::RowSort => "rowsort",
            Self::ValueSort => "valuesort",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The condition to run a record.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Condition {
    /// The record is evaluated only on the named engine.
    OnlyIf { engine: String },
    /// The record is not evaluated on the named engine.
    SkipIf { engine: String },
}

impl Condition {
    /// Whether this condition lets the record run on `engine`.
    pub fn allows(&self, engine: &str) -> bool {
        match self {
            Condition::OnlyIf { engine: only } => only == engine,
            Condition::SkipIf { engine: skip } => skip != engine,
        }
    }
}

/// The `skipif`/`onlyif` lines attached to a record.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Conditions {
    items: Vec<Condition>,
    first_line: Option<u32>,
}

impl Conditions {
    pub(crate) fn push(&mut self, condition: Condition, line: u32) {
        self.first_line.get_or_insert(line);
        self.items.push(condition);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A record runs on `engine` only if every one of its conditions allows it.
    pub fn matches(&self, engine: &str) -> bool {
        self.items.iter().all(|c| c.allows(engine))
    }
}
