//! SQLite harness, backed by an in-memory rusqlite connection.

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::executor::Harness;
use crate::output::QueryOutput;

/// The error type of [`SqliteHarness`].
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct SqliteError(#[from] rusqlite::Error);

/// Runs test files against a fresh in-memory SQLite database per file.
pub struct SqliteHarness {
    conn: Connection,
}

impl SqliteHarness {
    pub fn new() -> Result<Self, SqliteError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Type code for a column, decided by its first non-NULL value.
    fn column_type(value: ValueRef<'_>) -> Option<char> {
        match value {
            ValueRef::Integer(_) => Some('I'),
            ValueRef::Real(_) => Some('R'),
            ValueRef::Text(_) | ValueRef::Blob(_) => Some('T'),
            ValueRef::Null => None,
        }
    }

    fn format_value(value: ValueRef<'_>) -> String {
        match value {
            ValueRef::Null => "NULL".to_string(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => format!("{f:.3}"),
            ValueRef::Text(s) | ValueRef::Blob(s) if s.is_empty() => "(empty)".to_string(),
            ValueRef::Text(s) | ValueRef::Blob(s) => String::from_utf8_lossy(s).into_owned(),
        }
    }
}

impl Harness for SqliteHarness {
    type Error = SqliteError;

    fn init(&mut self) -> Result<(), SqliteError> {
        // dropping the old connection discards the database
        self.conn = Connection::open_in_memory()?;
        Ok(())
    }

    fn engine_name(&self) -> &str {
        "sqlite"
    }

    fn execute_statement(&mut self, sql: &str) -> Result<(), SqliteError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
        Ok(())
    }

    fn execute_query(&mut self, sql: &str) -> Result<QueryOutput, SqliteError> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut types: Vec<Option<char>> = vec![None; column_count];
        let mut values = Vec::new();

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (i, ty) in types.iter_mut().enumerate() {
                let value = row.get_ref(i)?;
                if ty.is_none() {
                    *ty = Self::column_type(value);
                }
                values.push(Self::format_value(value));
            }
        }

        let schema = types.into_iter().map(|t| t.unwrap_or('I')).collect::<String>();
        Ok(QueryOutput::new(schema, values))
    }
}
