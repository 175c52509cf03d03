// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Status value that marks a scorecard as live for dashboard purposes.
pub const ACTIVE_SCORECARD_STATUS: &str = "Active";

/// Role assigned to a platform user.
///
/// Roles are persisted by their display name (`"Power User"` keeps its space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Full administrative authority: manages organizations and users.
    Admin,
    /// May build, generate and simulate scorecards.
    #[serde(rename = "Power User")]
    PowerUser,
    /// May review and approve scorecards.
    Approver,
    /// Read-mostly access. The default for newly registered users.
    #[default]
    User,
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Power User" => Ok(Self::PowerUser),
            "Approver" => Ok(Self::Approver),
            "User" => Ok(Self::User),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Role {
    /// Converts this role to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::PowerUser => "Power User",
            Self::Approver => "Approver",
            Self::User => "User",
        }
    }

    /// Returns whether this role may create organizations and users.
    #[must_use]
    pub const fn can_manage_accounts(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns whether this role may create, generate or simulate scorecards.
    #[must_use]
    pub const fn can_author_scorecards(&self) -> bool {
        matches!(self, Self::Admin | Self::PowerUser | Self::Approver)
    }
}

/// Score band assigned to a scored application.
///
/// Bands are fixed: A covers 85 and above, B 70 and above, C 55 and above,
/// and D everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl FromStr for Grade {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            _ => Err(DomainError::InvalidGrade(s.to_string())),
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Grade {
    /// All grades, best first.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Maps a score on the 0-100 scale to its band.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::A
        } else if score >= 70.0 {
            Self::B
        } else if score >= 55.0 {
            Self::C
        } else {
            Self::D
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Inclusive lower and upper score bounds of this band.
    #[must_use]
    pub const fn bounds(&self) -> (u8, u8) {
        match self {
            Self::A => (85, 100),
            Self::B => (70, 84),
            Self::C => (55, 69),
            Self::D => (0, 54),
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::A => "Excellent",
            Self::B => "Good",
            Self::C => "Fair",
            Self::D => "Poor",
        }
    }

    /// Returns whether applications in this band are approved.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::A | Self::B)
    }

    /// Returns whether a persisted bucket string names an approving band.
    ///
    /// Unknown bucket strings are never approving.
    #[must_use]
    pub fn is_approving_bucket(bucket: &str) -> bool {
        bucket
            .parse::<Self>()
            .is_ok_and(|grade: Self| grade.is_approved())
    }
}

/// A lending institution that owns scorecards and users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub code: String,
    /// Institution category (bank, NBFC, credit union...). Persisted as `type`.
    #[serde(rename = "type")]
    pub org_type: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub description: String,
    pub established_year: Option<i64>,
    pub employee_count: Option<i64>,
    pub created_at: String,
}

/// A platform account.
///
/// `organization_id` is not checked against the organizations table, and
/// email uniqueness is only enforced by callers before creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub organization_id: i64,
    pub is_active: bool,
    pub default_module: String,
    /// Opaque per-module permission string, owned by the UI.
    pub access_matrix: String,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A scorecard definition.
///
/// `config_json` is an arbitrary JSON object describing categories,
/// variables, weights and the bucket mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub id: i64,
    pub organization_id: i64,
    pub name: String,
    pub product: String,
    pub segment: String,
    pub version: String,
    pub config_json: Value,
    pub status: String,
    pub created_by: i64,
    pub approved_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub approved_at: Option<String>,
}

impl Scorecard {
    /// Returns whether this scorecard counts as live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_SCORECARD_STATUS
    }
}

/// A stored outcome of scoring one record (or one bulk run) against a scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub id: i64,
    pub scorecard_id: i64,
    pub record_id: String,
    pub score: f64,
    pub bucket: String,
    pub reason_codes: Value,
    pub input_data: Value,
    pub created_at: String,
}

impl SimulationResult {
    /// Returns whether this result falls in an approving bucket.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        Grade::is_approving_bucket(&self.bucket)
    }
}

/// Read-side summary shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Number of scorecards whose status is `Active`.
    #[serde(rename = "activeScoreCards")]
    pub active_scorecards: usize,
    /// Number of stored simulation results.
    pub applications_scored: usize,
    /// Percentage of results in an approving bucket, one decimal place.
    pub approval_rate: f64,
    /// Always zero; experiments are not persisted.
    pub ab_tests: usize,
}
