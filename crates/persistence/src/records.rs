// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Projection of raw rows into the domain's typed entities.

use finscore_domain::{Organization, Role, Scorecard, SimulationResult, User};

use crate::error::PersistenceError;
use crate::schema::{
    ID_COLUMN, ORGANIZATIONS, RowDecoder, SCORECARDS, SIMULATION_RESULTS, TableSchema, USERS,
};

/// An entity stored as one row of a table.
pub trait Record: Sized {
    /// The table layout the entity is stored under.
    const SCHEMA: &'static TableSchema;

    /// Builds the typed entity from a decoded row.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column cannot be coerced.
    fn from_row(row: &RowDecoder<'_>) -> Result<Self, PersistenceError>;

    /// The entity's identifier.
    fn id(&self) -> i64;
}

impl Record for Organization {
    const SCHEMA: &'static TableSchema = &ORGANIZATIONS;

    fn from_row(row: &RowDecoder<'_>) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: row.integer(ID_COLUMN)?,
            name: row.text("name")?,
            code: row.text("code")?,
            org_type: row.text("type")?,
            contact_email: row.text("contact_email")?,
            contact_phone: row.text("contact_phone")?,
            description: row.text("description")?,
            established_year: row.optional_integer("established_year")?,
            employee_count: row.optional_integer("employee_count")?,
            created_at: row.timestamp("created_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for User {
    const SCHEMA: &'static TableSchema = &USERS;

    fn from_row(row: &RowDecoder<'_>) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: row.integer(ID_COLUMN)?,
            name: row.text("name")?,
            email: row.text("email")?,
            password_hash: row.text("password_hash")?,
            role: row.enumeration::<Role>("role")?,
            organization_id: row.integer("organization_id")?,
            is_active: row.boolean("is_active")?,
            default_module: row.text("default_module")?,
            access_matrix: row.text("access_matrix")?,
            last_login_at: row.optional_timestamp("last_login_at")?,
            created_at: row.timestamp("created_at")?,
            updated_at: row.timestamp("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Scorecard {
    const SCHEMA: &'static TableSchema = &SCORECARDS;

    fn from_row(row: &RowDecoder<'_>) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: row.integer(ID_COLUMN)?,
            organization_id: row.integer("organization_id")?,
            name: row.text("name")?,
            product: row.text("product")?,
            segment: row.text("segment")?,
            version: row.text("version")?,
            config_json: row.json("config_json")?,
            status: row.text("status")?,
            created_by: row.integer("created_by")?,
            approved_by: row.optional_integer("approved_by")?,
            created_at: row.timestamp("created_at")?,
            updated_at: row.timestamp("updated_at")?,
            approved_at: row.optional_timestamp("approved_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for SimulationResult {
    const SCHEMA: &'static TableSchema = &SIMULATION_RESULTS;

    fn from_row(row: &RowDecoder<'_>) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: row.integer(ID_COLUMN)?,
            scorecard_id: row.integer("scorecard_id")?,
            record_id: row.text("record_id")?,
            score: row.decimal("score")?,
            bucket: row.text("bucket")?,
            reason_codes: row.json("reason_codes")?,
            input_data: row.json("input_data")?,
            created_at: row.timestamp("created_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}
