// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Column schemas and type coercion.
//!
//! Every table declares its columns and their semantic kind once. Reads go
//! through [`RowDecoder`] and writes through [`RowBuilder`], both of which
//! apply the per-kind rules below uniformly:
//!
//! | Kind | Read | Write |
//! |---|---|---|
//! | `Integer` | base-10 `i64`; absent or invalid is a fatal `MalformedRow` | decimal digits |
//! | `OptionalInteger` | blank or invalid becomes `None` | empty for `None` |
//! | `Decimal` | `f64`; absent or invalid is fatal | shortest round-trip form |
//! | `Boolean` | `"true"` / `"t"` are true, anything else false | `t` / `f` |
//! | `Enumeration` | parsed by the record; failure is fatal | the variant's name |
//! | `JsonObject` | parsed; any failure or non-object becomes `{}` | compact JSON |
//! | `JsonArray` | parsed; any failure or non-array becomes `[]` | compact JSON |
//! | `Text` | passed through, absent is empty | as-is |
//! | `CreatedAt` | passed through; blank is backfilled with the read time | as-is |
//! | `UpdatedAt` | passed through; blank falls back to the creation column | as-is |
//! | `OptionalTimestamp` | blank becomes `None` | empty for `None` |
//!
//! The JSON fallback is deliberate: older files contain values such as
//! `[object Object]`, and readers must keep working on them.

use std::str::FromStr;

use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::error::PersistenceError;
use crate::table::{Row, Table};

/// Name of the identifier column shared by every table.
pub const ID_COLUMN: &str = "id";

/// Token written for a true boolean.
pub const TRUE_TOKEN: &str = "t";
/// Token written for a false boolean.
pub const FALSE_TOKEN: &str = "f";

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    OptionalInteger,
    Decimal,
    Boolean,
    Enumeration,
    JsonObject,
    JsonArray,
    Text,
    CreatedAt,
    /// Falls back to the named creation column when blank.
    UpdatedAt {
        created: &'static str,
    },
    OptionalTimestamp,
}

/// One declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn column(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

/// The declared layout of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: Table,
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Returns the declared kind of a column.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.kind)
    }

    /// Column names in declaration order (the order used for new files).
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|column| column.name)
    }
}

pub const ORGANIZATIONS: TableSchema = TableSchema {
    table: Table::Organizations,
    columns: &[
        column(ID_COLUMN, ColumnKind::Integer),
        column("name", ColumnKind::Text),
        column("code", ColumnKind::Text),
        column("type", ColumnKind::Text),
        column("contact_email", ColumnKind::Text),
        column("contact_phone", ColumnKind::Text),
        column("description", ColumnKind::Text),
        column("established_year", ColumnKind::OptionalInteger),
        column("employee_count", ColumnKind::OptionalInteger),
        column("created_at", ColumnKind::CreatedAt),
    ],
};

pub const USERS: TableSchema = TableSchema {
    table: Table::Users,
    columns: &[
        column(ID_COLUMN, ColumnKind::Integer),
        column("name", ColumnKind::Text),
        column("email", ColumnKind::Text),
        column("password_hash", ColumnKind::Text),
        column("role", ColumnKind::Enumeration),
        column("organization_id", ColumnKind::Integer),
        column("is_active", ColumnKind::Boolean),
        column("default_module", ColumnKind::Text),
        column("access_matrix", ColumnKind::Text),
        column("last_login_at", ColumnKind::OptionalTimestamp),
        column("created_at", ColumnKind::CreatedAt),
        column(
            "updated_at",
            ColumnKind::UpdatedAt {
                created: "created_at",
            },
        ),
    ],
};

pub const SCORECARDS: TableSchema = TableSchema {
    table: Table::Scorecards,
    columns: &[
        column(ID_COLUMN, ColumnKind::Integer),
        column("organization_id", ColumnKind::Integer),
        column("name", ColumnKind::Text),
        column("product", ColumnKind::Text),
        column("segment", ColumnKind::Text),
        column("version", ColumnKind::Text),
        column("config_json", ColumnKind::JsonObject),
        column("status", ColumnKind::Text),
        column("created_by", ColumnKind::Integer),
        column("approved_by", ColumnKind::OptionalInteger),
        column("created_at", ColumnKind::CreatedAt),
        column(
            "updated_at",
            ColumnKind::UpdatedAt {
                created: "created_at",
            },
        ),
        column("approved_at", ColumnKind::OptionalTimestamp),
    ],
};

pub const SIMULATION_RESULTS: TableSchema = TableSchema {
    table: Table::SimulationResults,
    columns: &[
        column(ID_COLUMN, ColumnKind::Integer),
        column("scorecard_id", ColumnKind::Integer),
        column("record_id", ColumnKind::Text),
        column("score", ColumnKind::Decimal),
        column("bucket", ColumnKind::Text),
        column("reason_codes", ColumnKind::JsonArray),
        column("input_data", ColumnKind::JsonObject),
        column("created_at", ColumnKind::CreatedAt),
    ],
};

/// Returns the current time in the format used for every timestamp column.
///
/// # Errors
///
/// Returns an error if the time cannot be formatted.
pub fn now_timestamp() -> Result<String, PersistenceError> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

/// Parses a required base-10 integer column.
///
/// # Errors
///
/// Returns `MalformedRow` if the column is absent, blank or not an integer.
pub fn parse_required_integer(
    table: Table,
    row_number: usize,
    row: &Row,
    column: &str,
) -> Result<i64, PersistenceError> {
    let raw: &str = row.get(column).unwrap_or_default();
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PersistenceError::MalformedRow {
            table,
            row: row_number,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

fn parse_optional_integer(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn parse_boolean(raw: &str) -> bool {
    matches!(raw, "true" | "t")
}

fn parse_json_object(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) => {
            if !raw.is_empty() {
                debug!(raw, "Unparsable JSON object, substituting {{}}");
            }
            Value::Object(Map::new())
        }
    }
}

fn parse_json_array(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Array(_)) => value,
        Ok(_) | Err(_) => {
            if !raw.is_empty() {
                debug!(raw, "Unparsable JSON array, substituting []");
            }
            Value::Array(Vec::new())
        }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Typed, read-only view of one raw row under a table schema.
pub struct RowDecoder<'a> {
    schema: &'static TableSchema,
    row_number: usize,
    row: &'a Row,
    now: &'a str,
}

impl<'a> RowDecoder<'a> {
    /// Creates a decoder.
    ///
    /// # Arguments
    ///
    /// * `schema` - The table's schema
    /// * `row_number` - 1-based position of the row, used in error reports
    /// * `row` - The raw row
    /// * `now` - The timestamp used to backfill blank creation times
    #[must_use]
    pub const fn new(
        schema: &'static TableSchema,
        row_number: usize,
        row: &'a Row,
        now: &'a str,
    ) -> Self {
        Self {
            schema,
            row_number,
            row,
            now,
        }
    }

    fn raw(&self, column: &str) -> &'a str {
        self.row.get(column).unwrap_or_default()
    }

    fn expect_kind(
        &self,
        column: &str,
        matches: impl Fn(ColumnKind) -> bool,
    ) -> Result<ColumnKind, PersistenceError> {
        self.schema
            .kind_of(column)
            .filter(|kind: &ColumnKind| matches(*kind))
            .ok_or_else(|| PersistenceError::SchemaMismatch {
                table: self.schema.table,
                column: column.to_string(),
            })
    }

    fn malformed(&self, column: &str) -> PersistenceError {
        PersistenceError::MalformedRow {
            table: self.schema.table,
            row: self.row_number,
            column: column.to_string(),
            value: self.raw(column).to_string(),
        }
    }

    /// Reads a required integer column.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRow` if the value is absent or not an integer.
    pub fn integer(&self, column: &str) -> Result<i64, PersistenceError> {
        self.expect_kind(column, |kind| kind == ColumnKind::Integer)?;
        parse_required_integer(self.schema.table, self.row_number, self.row, column)
    }

    /// Reads an optional integer column. Blank or invalid values are `None`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column is not declared optional.
    pub fn optional_integer(&self, column: &str) -> Result<Option<i64>, PersistenceError> {
        self.expect_kind(column, |kind| kind == ColumnKind::OptionalInteger)?;
        Ok(parse_optional_integer(self.raw(column)))
    }

    /// Reads a required decimal column.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRow` if the value is absent or not a number.
    pub fn decimal(&self, column: &str) -> Result<f64, PersistenceError> {
        self.expect_kind(column, |kind| kind == ColumnKind::Decimal)?;
        self.raw(column)
            .trim()
            .parse::<f64>()
            .map_err(|_| self.malformed(column))
    }

    /// Reads a boolean token column. Never fails on the value itself.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column is not declared boolean.
    pub fn boolean(&self, column: &str) -> Result<bool, PersistenceError> {
        self.expect_kind(column, |kind| kind == ColumnKind::Boolean)?;
        Ok(parse_boolean(self.raw(column)))
    }

    /// Reads an enumeration column through its `FromStr` implementation.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRow` if the value does not name a variant.
    pub fn enumeration<T: FromStr>(&self, column: &str) -> Result<T, PersistenceError> {
        self.expect_kind(column, |kind| kind == ColumnKind::Enumeration)?;
        self.raw(column)
            .parse::<T>()
            .map_err(|_| self.malformed(column))
    }

    /// Reads a JSON column, falling back to an empty object or array.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column is not declared as JSON.
    pub fn json(&self, column: &str) -> Result<Value, PersistenceError> {
        let kind: ColumnKind = self.expect_kind(column, |kind| {
            matches!(kind, ColumnKind::JsonObject | ColumnKind::JsonArray)
        })?;
        let raw: &str = self.raw(column);
        Ok(if kind == ColumnKind::JsonArray {
            parse_json_array(raw)
        } else {
            parse_json_object(raw)
        })
    }

    /// Reads a text column. Absent columns read as empty.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column is not declared as text.
    pub fn text(&self, column: &str) -> Result<String, PersistenceError> {
        self.expect_kind(column, |kind| kind == ColumnKind::Text)?;
        Ok(self.raw(column).to_string())
    }

    /// Reads a creation or update timestamp, applying the backfill rules.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column is not a creation/update timestamp.
    pub fn timestamp(&self, column: &str) -> Result<String, PersistenceError> {
        let kind: ColumnKind = self.expect_kind(column, |kind| {
            matches!(kind, ColumnKind::CreatedAt | ColumnKind::UpdatedAt { .. })
        })?;

        if let Some(value) = non_blank(self.raw(column)) {
            return Ok(value);
        }

        let fallback: Option<String> = match kind {
            ColumnKind::UpdatedAt { created } => non_blank(self.raw(created)),
            _ => None,
        };
        Ok(fallback.unwrap_or_else(|| self.now.to_string()))
    }

    /// Reads an optional timestamp. Blank values are `None`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column is not declared optional.
    pub fn optional_timestamp(&self, column: &str) -> Result<Option<String>, PersistenceError> {
        self.expect_kind(column, |kind| kind == ColumnKind::OptionalTimestamp)?;
        Ok(non_blank(self.raw(column)))
    }
}

/// Encodes typed values into a raw row laid out in schema order.
///
/// Columns that are never set are written as empty cells.
pub struct RowBuilder {
    schema: &'static TableSchema,
    values: Vec<(&'static str, String)>,
}

impl RowBuilder {
    #[must_use]
    pub const fn new(schema: &'static TableSchema) -> Self {
        Self {
            schema,
            values: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: String) -> Self {
        self.values.push((column, value));
        self
    }

    #[must_use]
    pub fn integer(self, column: &'static str, value: i64) -> Self {
        self.set(column, value.to_string())
    }

    #[must_use]
    pub fn optional_integer(self, column: &'static str, value: Option<i64>) -> Self {
        self.set(column, value.map(|v| v.to_string()).unwrap_or_default())
    }

    #[must_use]
    pub fn decimal(self, column: &'static str, value: f64) -> Self {
        self.set(column, value.to_string())
    }

    #[must_use]
    pub fn boolean(self, column: &'static str, value: bool) -> Self {
        let token: &str = if value { TRUE_TOKEN } else { FALSE_TOKEN };
        self.set(column, token.to_string())
    }

    #[must_use]
    pub fn text(self, column: &'static str, value: impl Into<String>) -> Self {
        self.set(column, value.into())
    }

    #[must_use]
    pub fn optional_text(self, column: &'static str, value: Option<String>) -> Self {
        self.set(column, value.unwrap_or_default())
    }

    /// Serializes a JSON value compactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json(self, column: &'static str, value: &Value) -> Result<Self, PersistenceError> {
        let encoded: String = serde_json::to_string(value)?;
        Ok(self.set(column, encoded))
    }

    /// Produces the row in schema column order.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if a value was set for an undeclared column.
    pub fn build(self) -> Result<Row, PersistenceError> {
        if let Some((column, _)) = self
            .values
            .iter()
            .find(|(column, _)| self.schema.kind_of(column).is_none())
        {
            return Err(PersistenceError::SchemaMismatch {
                table: self.schema.table,
                column: (*column).to_string(),
            });
        }

        let mut row: Row = Row::new();
        for name in self.schema.column_names() {
            let value: &str = self
                .values
                .iter()
                .rev()
                .find(|(column, _)| *column == name)
                .map(|(_, value)| value.as_str())
                .unwrap_or_default();
            row.insert(name, value);
        }
        Ok(row)
    }
}
