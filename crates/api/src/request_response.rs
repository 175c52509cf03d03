// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Field names follow the web client's camelCase JSON.

use std::collections::BTreeMap;

use finscore_domain::{Role, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========================================================================
// Authentication
// ========================================================================

/// API request to log in with email and password.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub organization_id: i64,
    pub is_active: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            organization_id: user.organization_id,
            is_active: user.is_active,
        }
    }
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    pub user: UserInfo,
    /// RFC 3339 expiry of the token.
    pub expires_at: String,
}

/// API response describing the current session's user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user: UserInfo,
}

/// API request to create the first administrator of an empty installation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootstrapAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

// ========================================================================
// Organizations and users
// ========================================================================

/// API request to create an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrganizationRequest {
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

/// API request to register a user account.
///
/// `password` is plaintext; `passwordHash` is accepted as an alias for
/// older clients that sent the plaintext under that name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(alias = "passwordHash")]
    pub password: String,
    /// Defaults to `User`.
    pub role: Option<String>,
    /// Defaults to organization 1.
    pub organization_id: Option<i64>,
}

// ========================================================================
// Scorecards
// ========================================================================

/// API request to create a scorecard by hand.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateScorecardRequest {
    /// Defaults to the creator's organization.
    pub organization_id: Option<i64>,
    pub name: String,
    pub product: String,
    pub segment: Option<String>,
    pub version: Option<String>,
    pub config_json: Option<Value>,
    /// Defaults to `Draft`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstitutionSetup {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductConfig {
    pub product_type: String,
    pub target_segment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskParameters {
    /// Passed through into the generated metadata unchanged.
    pub risk_tolerance: Value,
}

/// API request to generate a scorecard from data-source categories.
///
/// Each entry of `dataSources` maps a category name to an array of source
/// names, an object whose string values are source names, or a single
/// source name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateScorecardRequest {
    pub institution_setup: InstitutionSetup,
    pub product_config: ProductConfig,
    pub data_sources: Value,
    pub risk_parameters: RiskParameters,
}

/// API response for a generated scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScorecardResponse {
    pub id: i64,
    pub name: String,
    pub config_json: Value,
    /// Number of categories kept.
    pub categories: usize,
    /// Number of variables across all categories.
    pub variables: usize,
    pub success: bool,
}

/// Scorecard configuration defaults shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardSettings {
    pub default_grades: Vec<String>,
    pub min_score: u8,
    pub max_score: u8,
    pub auto_validation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationResponse {
    pub scorecard_settings: ScorecardSettings,
}

// ========================================================================
// Simulation and bulk processing
// ========================================================================

/// Approve/decline recommendation for one scored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Approve,
    Decline,
}

/// One scored input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecord {
    pub id: String,
    pub record_id: String,
    /// Rounded to two decimal places.
    pub score: f64,
    pub bucket: String,
    pub recommendation: Recommendation,
    pub reason_codes: Vec<String>,
    pub input_data: Value,
}

/// Identifying fields of the scorecard a batch ran against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorecardSummary {
    pub id: i64,
    pub name: String,
    pub product: String,
}

/// API request to score a batch of records against a scorecard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkSimulationRequest {
    pub scorecard_id: Option<i64>,
    pub data: Option<Vec<Value>>,
}

/// API response for a batch simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSimulationResponse {
    /// The first results only; `total` counts all of them.
    pub results: Vec<ScoredRecord>,
    pub total: usize,
    /// Count of records per bucket letter.
    pub distribution: BTreeMap<String, usize>,
    pub avg_score: f64,
    pub approval_rate: f64,
    pub scorecard: ScorecardSummary,
}

/// API request to process an uploaded batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkUploadRequest {
    pub data: Option<Vec<Value>>,
    pub processing_type: Option<String>,
    /// Defaults to scorecard 1.
    pub scorecard_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkJobResults {
    pub distribution: BTreeMap<String, usize>,
    pub avg_score: f64,
    pub approval_rate: f64,
    /// The first processed records, for preview.
    pub processed: Vec<ScoredRecord>,
}

/// API response for a processed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkJob {
    pub id: i64,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: String,
    pub total_records: usize,
    pub processed_records: usize,
    pub errors: Vec<String>,
    pub started_at: String,
    pub completed_at: String,
    pub results: BulkJobResults,
    pub created_by: i64,
}

/// A past bulk job reconstructed from its stored summary result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkJobSummary {
    /// The job id exactly as stored.
    pub id: Value,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: String,
    pub total_records: u64,
    pub processed_records: u64,
    pub started_at: String,
    pub completed_at: String,
}

// ========================================================================
// Testing
// ========================================================================

/// API request to run the test suite for a scorecard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunTestsRequest {
    pub scorecard_id: i64,
    pub test_data: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDetail {
    pub test: String,
    pub status: String,
    pub duration: String,
}

/// API response summarizing a test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTestsResponse {
    pub scorecard_id: i64,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub execution_time: String,
    pub timestamp: String,
    pub details: Vec<TestDetail>,
}

/// One stored simulation result presented as a completed test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestHistoryEntry {
    pub id: i64,
    pub scorecard_id: i64,
    pub test_type: String,
    pub status: String,
    pub executed_at: String,
    pub duration: String,
    pub passed: u32,
    pub failed: u32,
}
