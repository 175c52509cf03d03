// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Whole-table reads and writes of delimited-text files.
//!
//! A table is one CSV file with a header row. Rows are loaded as ordered
//! column -> string mappings and written back by rewriting the entire file.
//!
//! ## Write semantics
//!
//! - Writing an empty row set is a no-op: an existing file is left as-is.
//! - The header is taken from the **first** row's columns. Columns that only
//!   appear in later rows are dropped; first-row columns missing from a later
//!   row are written as empty cells.
//! - The file is truncated and rewritten in place. This is **not atomic**: a
//!   failure mid-write leaves a partially written table on disk.

use std::path::Path;

use tracing::debug;

use crate::error::PersistenceError;

/// The tables backing the store, one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Organizations,
    Users,
    Scorecards,
    SimulationResults,
}

impl Table {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Users => "users",
            Self::Scorecards => "scorecards",
            Self::SimulationResults => "simulation_results",
        }
    }

    /// The file name of this table inside the data directory.
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Organizations => "organizations.csv",
            Self::Users => "users.csv",
            Self::Scorecards => "scorecards.csv",
            Self::SimulationResults => "simulation_results.csv",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One record's fields before coercion, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Returns the raw value of a column, if the row has it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a column, replacing an existing value in place or appending a new column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column: String = column.into();
        let value: String = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.fields.push((column, value));
        }
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row: Self = Self::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Loads every row of a table file.
///
/// A missing file is an empty table, not an error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_table(path: &Path) -> Result<Vec<Row>, PersistenceError> {
    let bytes: Vec<u8> = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Table file missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(PersistenceError::io(path, &e)),
    };

    let rows: Vec<Row> = parse_rows(&bytes)?;
    debug!(path = %path.display(), rows = rows.len(), "Loaded table");
    Ok(rows)
}

/// Rewrites a table file from scratch.
///
/// An empty `rows` slice leaves any existing file untouched. The rewrite is
/// not atomic; see the module documentation.
///
/// # Errors
///
/// Returns an error if the rows cannot be encoded or the file cannot be written.
pub async fn save_table(path: &Path, rows: &[Row]) -> Result<(), PersistenceError> {
    if rows.is_empty() {
        debug!(path = %path.display(), "No rows to save, leaving table untouched");
        return Ok(());
    }

    let bytes: Vec<u8> = render_rows(rows)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| PersistenceError::io(path, &e))?;

    debug!(path = %path.display(), rows = rows.len(), "Saved table");
    Ok(())
}

/// Parses delimited text with a header row into rows.
///
/// Short records are padded with empty values for the missing trailing
/// columns; surplus cells beyond the header are ignored.
///
/// # Errors
///
/// Returns an error if the text is not valid delimited data.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<Row>, PersistenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: csv::StringRecord = reader.headers()?.clone();
    let mut rows: Vec<Row> = Vec::new();

    for record in reader.records() {
        let record: csv::StringRecord = record?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(idx, column)| (column, record.get(idx).unwrap_or_default()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Renders rows as delimited text, header taken from the first row.
///
/// Returns an empty buffer for an empty slice.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn render_rows(rows: &[Row]) -> Result<Vec<u8>, PersistenceError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let headers: Vec<&str> = first.columns().collect();
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(
            headers
                .iter()
                .map(|column| row.get(column).unwrap_or_default()),
        )?;
    }

    writer
        .into_inner()
        .map_err(|e| PersistenceError::Csv(e.error().to_string()))
}
