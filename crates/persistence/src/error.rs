// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::table::Table;

/// Errors that can occur during persistence operations.
///
/// Only structural failures surface here. Lenient coercions (JSON payloads,
/// boolean tokens, optional integers) are resolved inside the schema layer
/// and never produce an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Reading or writing a table file failed.
    ///
    /// A failed write may leave the table file partially written.
    Io {
        /// The file involved.
        path: String,
        /// The underlying I/O error kind.
        kind: std::io::ErrorKind,
        /// The underlying error message.
        message: String,
    },
    /// The delimited-text parser or writer rejected the data.
    Csv(String),
    /// A required field could not be coerced to its declared type.
    MalformedRow {
        /// The table containing the row.
        table: Table,
        /// 1-based data row number (the header is not counted).
        row: usize,
        /// The offending column.
        column: String,
        /// The raw value found in the column.
        value: String,
    },
    /// A record accessor asked for a column with a different declared kind.
    SchemaMismatch {
        /// The table whose schema was consulted.
        table: Table,
        /// The column that was requested.
        column: String,
    },
    /// The next identifier would overflow.
    IdentifierExhausted(Table),
    /// Serialization/formatting error (JSON encoding, timestamps).
    SerializationError(String),
}

impl PersistenceError {
    /// Builds an `Io` error for the given path.
    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message, .. } => write!(f, "I/O error on {path}: {message}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MalformedRow {
                table,
                row,
                column,
                value,
            } => {
                write!(
                    f,
                    "Malformed row {row} in table {table}: column '{column}' has invalid value '{value}'"
                )
            }
            Self::SchemaMismatch { table, column } => {
                write!(
                    f,
                    "Column '{column}' of table {table} was read with the wrong kind"
                )
            }
            Self::IdentifierExhausted(table) => {
                write!(f, "No identifiers left in table {table}")
            }
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<csv::Error> for PersistenceError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<time::error::Format> for PersistenceError {
    fn from(err: time::error::Format) -> Self {
        Self::SerializationError(err.to_string())
    }
}
