//! Location tracking for test files.

use std::{fmt, sync::Arc};

/// The location in source file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Location {
    pub(crate) file: Arc<str>,
    pub(crate) line: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl Location {
    /// File path.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// 1-based line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Creates a new location.
    pub fn new(file: impl Into<Arc<str>>, line: u32) -> Self {
        Self { file: file.into(), line }
    }

    /// Returns the location of next line.
    #[must_use]
    pub(crate) fn next_line(mut self) -> Self {
        self.line += 1;
        self
    }
}
