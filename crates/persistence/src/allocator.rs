// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifier allocation.
//!
//! Identifiers are `max(existing) + 1`, starting at 1. The allocator reads
//! whatever snapshot it is given, so callers must allocate against a freshly
//! loaded table while holding the table's lock (see `Repository::create`).

use crate::error::PersistenceError;
use crate::schema::{ID_COLUMN, parse_required_integer};
use crate::table::{Row, Table};

/// Computes the next identifier for a loaded table.
///
/// # Errors
///
/// Returns `MalformedRow` if any row's `id` is missing or not a base-10
/// integer. Such rows are never treated as 0, which could hand out an
/// identifier that already exists.
pub fn next_id(table: Table, rows: &[Row]) -> Result<i64, PersistenceError> {
    let mut max_id: Option<i64> = None;

    for (idx, row) in rows.iter().enumerate() {
        let id: i64 = parse_required_integer(table, idx + 1, row, ID_COLUMN)?;
        max_id = Some(max_id.map_or(id, |current: i64| current.max(id)));
    }

    max_id
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(PersistenceError::IdentifierExhausted(table))
}
