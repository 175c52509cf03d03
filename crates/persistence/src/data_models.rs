// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller-supplied fields for new records.
//!
//! The store assigns `id` and the timestamps; everything else comes from one
//! of the structs below. Unset optional fields receive the table's defaults.

use finscore_domain::{Organization, Role, Scorecard, SimulationResult, User};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PersistenceError;
use crate::records::Record;
use crate::schema::{ID_COLUMN, ORGANIZATIONS, RowBuilder, SCORECARDS, SIMULATION_RESULTS, USERS};
use crate::table::Row;

/// Module a new user lands on after login unless told otherwise.
pub const DEFAULT_MODULE: &str = "Dashboard";

/// Organization a new user belongs to unless told otherwise.
pub const DEFAULT_ORGANIZATION_ID: i64 = 1;

/// Fields for a row that does not exist yet.
pub trait NewRecord {
    /// The entity the row becomes once stored.
    type Output: Record;

    /// Encodes the fields as a raw row with the allocated id and creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    fn into_row(self, id: i64, now: &str) -> Result<Row, PersistenceError>;
}

/// A new organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub org_type: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub description: String,
    pub established_year: Option<i64>,
    pub employee_count: Option<i64>,
}

impl NewRecord for NewOrganization {
    type Output = Organization;

    fn into_row(self, id: i64, now: &str) -> Result<Row, PersistenceError> {
        RowBuilder::new(&ORGANIZATIONS)
            .integer(ID_COLUMN, id)
            .text("name", self.name)
            .text("code", self.code)
            .text("type", self.org_type)
            .text("contact_email", self.contact_email)
            .text("contact_phone", self.contact_phone)
            .text("description", self.description)
            .optional_integer("established_year", self.established_year)
            .optional_integer("employee_count", self.employee_count)
            .text("created_at", now)
            .build()
    }
}

/// A new user account.
///
/// `password_hash` must already be hashed; the store never sees plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// Defaults to [`Role::User`].
    pub role: Option<Role>,
    pub organization_id: i64,
    /// Defaults to [`DEFAULT_MODULE`].
    pub default_module: Option<String>,
    /// Defaults to empty.
    pub access_matrix: Option<String>,
}

impl NewUser {
    /// Creates a user in the default organization with every other field defaulted.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: None,
            organization_id: DEFAULT_ORGANIZATION_ID,
            default_module: None,
            access_matrix: None,
        }
    }

    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub const fn with_organization(mut self, organization_id: i64) -> Self {
        self.organization_id = organization_id;
        self
    }
}

impl NewRecord for NewUser {
    type Output = User;

    fn into_row(self, id: i64, now: &str) -> Result<Row, PersistenceError> {
        let role: Role = self.role.unwrap_or_default();
        RowBuilder::new(&USERS)
            .integer(ID_COLUMN, id)
            .text("name", self.name)
            .text("email", self.email)
            .text("password_hash", self.password_hash)
            .text("role", role.as_str())
            .integer("organization_id", self.organization_id)
            .boolean("is_active", true)
            .text(
                "default_module",
                self.default_module
                    .unwrap_or_else(|| DEFAULT_MODULE.to_string()),
            )
            .optional_text("access_matrix", self.access_matrix)
            .optional_text("last_login_at", None)
            .text("created_at", now)
            .text("updated_at", now)
            .build()
    }
}

/// A new scorecard definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScorecard {
    pub organization_id: i64,
    pub name: String,
    pub product: String,
    pub segment: String,
    pub version: String,
    pub config_json: Value,
    pub status: String,
    pub created_by: i64,
}

impl NewRecord for NewScorecard {
    type Output = Scorecard;

    fn into_row(self, id: i64, now: &str) -> Result<Row, PersistenceError> {
        let config: Value = if self.config_json.is_object() {
            self.config_json
        } else {
            Value::Object(Map::new())
        };

        RowBuilder::new(&SCORECARDS)
            .integer(ID_COLUMN, id)
            .integer("organization_id", self.organization_id)
            .text("name", self.name)
            .text("product", self.product)
            .text("segment", self.segment)
            .text("version", self.version)
            .json("config_json", &config)?
            .text("status", self.status)
            .integer("created_by", self.created_by)
            .optional_integer("approved_by", None)
            .text("created_at", now)
            .text("updated_at", now)
            .optional_text("approved_at", None)
            .build()
    }
}

/// A new simulation outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSimulationResult {
    pub scorecard_id: i64,
    pub record_id: String,
    pub score: f64,
    pub bucket: String,
    /// Expected to be a JSON array.
    pub reason_codes: Value,
    /// Expected to be a JSON object.
    pub input_data: Value,
}

impl NewRecord for NewSimulationResult {
    type Output = SimulationResult;

    fn into_row(self, id: i64, now: &str) -> Result<Row, PersistenceError> {
        RowBuilder::new(&SIMULATION_RESULTS)
            .integer(ID_COLUMN, id)
            .integer("scorecard_id", self.scorecard_id)
            .text("record_id", self.record_id)
            .decimal("score", self.score)
            .text("bucket", self.bucket)
            .json("reason_codes", &self.reason_codes)?
            .json("input_data", &self.input_data)?
            .text("created_at", now)
            .build()
    }
}
