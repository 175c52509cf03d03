// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! File-backed record store for the `FinScore` admin platform.
//!
//! A data directory holds one CSV file per entity table:
//!
//! - `organizations.csv`
//! - `users.csv`
//! - `scorecards.csv`
//! - `simulation_results.csv`
//!
//! [`CsvStore`] turns that directory into typed repositories with
//! create/read semantics, auto-incrementing identifiers, embedded JSON
//! fields and boolean/numeric coercion.
//!
//! ## Storage Semantics
//!
//! - A missing table file is an empty table.
//! - Every operation reads the whole table; every create rewrites it.
//! - Rewrites are **not atomic**. A failure while writing can leave a
//!   partially written file behind.
//! - Identifiers are `max(existing) + 1` per table and are never reused.
//! - There is no update or delete, no foreign-key enforcement, and email
//!   uniqueness is left to callers.
//!
//! ## Concurrency
//!
//! Each table has its own async lock. Creates hold it across the whole
//! read-modify-write sequence, so identifiers are unique within a process.
//! Separate processes sharing a data directory are not coordinated.
//!
//! ## Coercion
//!
//! Columns are typed by the schemas in [`schema`]. Structural problems
//! (unparsable identifiers, unreadable files) are errors; malformed JSON and
//! unusual boolean tokens fall back to safe defaults.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod allocator;
mod data_models;
mod error;
mod queries;
mod records;
mod repository;
pub mod schema;
mod table;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use finscore_domain::{DashboardMetrics, Organization, Scorecard, SimulationResult, User};
use tracing::info;

pub use allocator::next_id;
pub use data_models::{
    DEFAULT_MODULE, DEFAULT_ORGANIZATION_ID, NewOrganization, NewRecord, NewScorecard,
    NewSimulationResult, NewUser,
};
pub use error::PersistenceError;
pub use queries::approval_rate;
pub use records::Record;
pub use repository::Repository;
pub use table::{Row, Table, load_table, parse_rows, render_rows, save_table};

/// The record store over one data directory.
///
/// Build it once at startup and share it (for example behind an `Arc`).
/// Two stores opened on the same directory do not share locks.
#[derive(Debug)]
pub struct CsvStore {
    data_dir: PathBuf,
    organizations: Repository<Organization>,
    users: Repository<User>,
    scorecards: Repository<Scorecard>,
    simulation_results: Repository<SimulationResult>,
}

impl CsvStore {
    /// Opens a store, creating the data directory if it does not exist.
    ///
    /// No table files are created; each appears on its first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let data_dir: PathBuf = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| PersistenceError::io(&data_dir, &e))?;

        info!(data_dir = %data_dir.display(), "Opened record store");

        Ok(Self {
            organizations: Repository::new(&data_dir),
            users: Repository::new(&data_dir),
            scorecards: Repository::new(&data_dir),
            simulation_results: Repository::new(&data_dir),
            data_dir,
        })
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub const fn organizations(&self) -> &Repository<Organization> {
        &self.organizations
    }

    #[must_use]
    pub const fn users(&self) -> &Repository<User> {
        &self.users
    }

    #[must_use]
    pub const fn scorecards(&self) -> &Repository<Scorecard> {
        &self.scorecards
    }

    #[must_use]
    pub const fn simulation_results(&self) -> &Repository<SimulationResult> {
        &self.simulation_results
    }

    // ========================================================================
    // Organizations
    // ========================================================================

    /// Lists every organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or a row is malformed.
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, PersistenceError> {
        self.organizations.list().await
    }

    /// Retrieves an organization by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded. Missing is `Ok(None)`.
    pub async fn get_organization(&self, id: i64) -> Result<Option<Organization>, PersistenceError> {
        self.organizations.get(id).await
    }

    /// Creates an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or written.
    pub async fn create_organization(
        &self,
        new: NewOrganization,
    ) -> Result<Organization, PersistenceError> {
        self.organizations.create(new).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Lists every user.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or a row is malformed.
    pub async fn list_users(&self) -> Result<Vec<User>, PersistenceError> {
        self.users.list().await
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded. Missing is `Ok(None)`.
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, PersistenceError> {
        self.users.get(id).await
    }

    /// Retrieves a user by exact, case-sensitive email.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded. Missing is `Ok(None)`.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        self.users.get_by_email(email).await
    }

    /// Creates a user.
    ///
    /// The store does not check email uniqueness; callers look the email up
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or written.
    pub async fn create_user(&self, new: NewUser) -> Result<User, PersistenceError> {
        self.users.create(new).await
    }

    /// Creates a user only while the users table is empty.
    ///
    /// Returns `Ok(None)` if any user row already exists. The check and the
    /// write are made under the same table lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or written.
    pub async fn create_first_user(&self, new: NewUser) -> Result<Option<User>, PersistenceError> {
        self.users.create_if_empty(new).await
    }

    // ========================================================================
    // Scorecards
    // ========================================================================

    /// Lists every scorecard.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or a row is malformed.
    pub async fn list_scorecards(&self) -> Result<Vec<Scorecard>, PersistenceError> {
        self.scorecards.list().await
    }

    /// Retrieves a scorecard by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded. Missing is `Ok(None)`.
    pub async fn get_scorecard(&self, id: i64) -> Result<Option<Scorecard>, PersistenceError> {
        self.scorecards.get(id).await
    }

    /// Creates a scorecard.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or written.
    pub async fn create_scorecard(&self, new: NewScorecard) -> Result<Scorecard, PersistenceError> {
        self.scorecards.create(new).await
    }

    // ========================================================================
    // Simulation results
    // ========================================================================

    /// Lists every stored simulation result.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or a row is malformed.
    pub async fn list_simulation_results(&self) -> Result<Vec<SimulationResult>, PersistenceError> {
        self.simulation_results.list().await
    }

    /// Stores a simulation result.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or written.
    pub async fn create_simulation_result(
        &self,
        new: NewSimulationResult,
    ) -> Result<SimulationResult, PersistenceError> {
        self.simulation_results.create(new).await
    }

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Computes the dashboard metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if scorecards or simulation results cannot be loaded.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, PersistenceError> {
        queries::dashboard_metrics(&self.scorecards, &self.simulation_results).await
    }
}
