// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the `FinScore` admin platform.
//!
//! Handlers in this crate sit between the HTTP server and the record store.
//! They own authentication (bcrypt credentials, in-process bearer
//! sessions), role-based authorization, input validation, scorecard
//! generation and batch scoring. Every error that leaves this crate is an
//! [`ApiError`].

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

mod auth;
mod error;
mod generator;
mod handlers;
mod password_policy;
mod request_response;
mod scoring;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, Session, SessionRegistry,
};
pub use error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
pub use generator::{
    DEFAULT_SEGMENT, GENERATED_STATUS, GENERATED_VERSION, GeneratedConfig, generate_config,
};
pub use handlers::{
    DEFAULT_SCORECARD_STATUS, DEFAULT_TEST_COUNT, SIMULATION_PREVIEW_LEN, ScoreSource,
    UPLOAD_PREVIEW_LEN, bootstrap_first_admin, create_organization, create_scorecard,
    create_user, generate_scorecard, get_configuration, get_dashboard_metrics, get_scorecard,
    get_test_history, list_bulk_jobs, list_organizations, list_scorecards, list_users, login,
    logout, process_bulk_upload, random_score, run_bulk_simulation, run_tests, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    BootstrapAdminRequest, BulkJob, BulkJobResults, BulkJobSummary, BulkSimulationRequest,
    BulkSimulationResponse, BulkUploadRequest, ConfigurationResponse, CreateOrganizationRequest,
    CreateScorecardRequest, CreateUserRequest, GenerateScorecardRequest,
    GenerateScorecardResponse, InstitutionSetup, LoginRequest, LoginResponse, ProductConfig,
    Recommendation, RiskParameters, RunTestsRequest, RunTestsResponse, ScoredRecord,
    ScorecardSettings, ScorecardSummary, TestDetail, TestHistoryEntry, UserInfo, WhoAmIResponse,
};
pub use scoring::{
    APPROVAL_THRESHOLD, BatchSummary, ReasonSet, SIMULATION_REASONS, UPLOAD_REASONS, round2,
    score_batch, score_record, summarize,
};
