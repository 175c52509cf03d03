// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Generic per-table repository.
//!
//! A repository owns one table file and the lock guarding it. Every
//! operation loads the whole table; there is no caching between calls.
//!
//! ## Locking
//!
//! The lock is held across the full load-allocate-append-save sequence of
//! [`Repository::create`] and across every read, so within one process
//! concurrent creates on a table always receive distinct identifiers and
//! readers never see a half-written file. Other processes writing the same
//! directory are not coordinated.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::allocator::next_id;
use crate::data_models::NewRecord;
use crate::error::PersistenceError;
use crate::records::Record;
use crate::schema::{RowDecoder, now_timestamp};
use crate::table::{Row, load_table, save_table};

/// Typed access to one table file.
pub struct Repository<T: Record> {
    path: PathBuf,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("table", &T::SCHEMA.table)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<T: Record> Repository<T> {
    /// Creates a repository for the table's file inside `data_dir`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(T::SCHEMA.table.file_name()),
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// The table file backing this repository.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the raw rows of the table without coercion.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_rows(&self) -> Result<Vec<Row>, PersistenceError> {
        let _guard = self.lock.lock().await;
        load_table(&self.path).await
    }

    /// Returns every record, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a required column of any
    /// row is malformed.
    pub async fn list(&self) -> Result<Vec<T>, PersistenceError> {
        let rows: Vec<Row> = self.load_rows().await?;
        let now: String = now_timestamp()?;
        decode_rows(&rows, &now)
    }

    /// Returns the record with the given identifier, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded. A missing record is
    /// `Ok(None)`.
    pub async fn get(&self, id: i64) -> Result<Option<T>, PersistenceError> {
        debug!(table = %T::SCHEMA.table, id, "Looking up record by id");
        Ok(self.list().await?.into_iter().find(|record| record.id() == id))
    }

    /// Returns the first record whose raw row satisfies `predicate`.
    ///
    /// Only the matching row is coerced, so malformed rows elsewhere in the
    /// table do not affect the lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or the matching row is
    /// malformed.
    pub async fn find_raw(
        &self,
        predicate: impl Fn(&Row) -> bool,
    ) -> Result<Option<T>, PersistenceError> {
        let rows: Vec<Row> = self.load_rows().await?;
        let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| predicate(row)) else {
            return Ok(None);
        };
        let now: String = now_timestamp()?;
        T::from_row(&RowDecoder::new(T::SCHEMA, idx + 1, row, &now)).map(Some)
    }

    /// Appends a new record with the next identifier and rewrites the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded, an existing identifier
    /// is malformed, or the file cannot be written. A failed write may leave
    /// the table partially written.
    pub async fn create<N>(&self, new: N) -> Result<T, PersistenceError>
    where
        N: NewRecord<Output = T>,
    {
        let _guard = self.lock.lock().await;
        let rows: Vec<Row> = load_table(&self.path).await?;
        self.append(rows, new).await
    }

    /// Creates the record only if the table has no rows yet.
    ///
    /// The emptiness check and the write happen under one hold of the table
    /// lock, so of several concurrent callers exactly one gets `Some`.
    ///
    /// # Errors
    ///
    /// Same as [`Repository::create`].
    pub async fn create_if_empty<N>(&self, new: N) -> Result<Option<T>, PersistenceError>
    where
        N: NewRecord<Output = T>,
    {
        let _guard = self.lock.lock().await;
        let rows: Vec<Row> = load_table(&self.path).await?;
        if !rows.is_empty() {
            debug!(table = %T::SCHEMA.table, rows = rows.len(), "Table not empty; skipping create");
            return Ok(None);
        }
        self.append(rows, new).await.map(Some)
    }

    /// Allocates, appends and saves. The caller holds the lock.
    async fn append<N>(&self, mut rows: Vec<Row>, new: N) -> Result<T, PersistenceError>
    where
        N: NewRecord<Output = T>,
    {
        let table = T::SCHEMA.table;
        let id: i64 = next_id(table, &rows)?;
        let now: String = now_timestamp()?;

        let row: Row = new.into_row(id, &now)?;
        let record: T = T::from_row(&RowDecoder::new(T::SCHEMA, rows.len() + 1, &row, &now))?;

        rows.push(row);
        save_table(&self.path, &rows).await?;

        info!(table = %table, id, "Created record");
        Ok(record)
    }
}

fn decode_rows<T: Record>(rows: &[Row], now: &str) -> Result<Vec<T>, PersistenceError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| T::from_row(&RowDecoder::new(T::SCHEMA, idx + 1, row, now)))
        .collect()
}
