// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use finscore_api::{
    ApiError, BootstrapAdminRequest, BulkJob, BulkJobSummary, BulkSimulationRequest,
    BulkSimulationResponse, BulkUploadRequest, ConfigurationResponse, CreateOrganizationRequest,
    CreateScorecardRequest, CreateUserRequest, GenerateScorecardRequest,
    GenerateScorecardResponse, LoginRequest, LoginResponse, RunTestsRequest, RunTestsResponse,
    SessionRegistry, TestHistoryEntry, UserInfo, WhoAmIResponse, bootstrap_first_admin,
    create_organization, create_scorecard, create_user, generate_scorecard, get_configuration,
    get_dashboard_metrics, get_scorecard, get_test_history, list_bulk_jobs, list_organizations,
    list_scorecards, list_users, login, logout, process_bulk_upload, random_score,
    run_bulk_simulation, run_tests, whoami,
};
use finscore_domain::{DashboardMetrics, Organization, Scorecard, User};
use finscore_persistence::CsvStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::session::{BearerToken, SessionUser};

/// `FinScore` Server - HTTP server for the `FinScore` admin platform
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the CSV table files. Created if missing.
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// IP address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Lifetime of a login session, in hours
    #[arg(long, default_value_t = 168)]
    session_hours: u32,
}

/// Application state shared across handlers.
///
/// The store serializes writers per table itself, so no outer lock is held.
#[derive(Clone)]
pub struct AppState {
    /// The CSV record store.
    store: Arc<CsvStore>,
    /// Live login sessions.
    sessions: Arc<SessionRegistry>,
}

/// API response for logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogoutResponse {
    success: bool,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ========================================================================
// Authentication
// ========================================================================

/// Handler for POST `/api/auth/login` endpoint.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(email = %request.email, "Handling login request");
    let response: LoginResponse = login(&app_state.store, &app_state.sessions, &request).await?;
    Ok(Json(response))
}

/// Handler for POST `/api/auth/logout` endpoint.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    BearerToken(token): BearerToken,
) -> Json<LogoutResponse> {
    logout(&app_state.sessions, &token).await;
    Json(LogoutResponse { success: true })
}

/// Handler for GET `/api/auth/me` endpoint.
async fn handle_whoami(SessionUser(_actor, user): SessionUser) -> Json<WhoAmIResponse> {
    Json(whoami(&user))
}

/// Handler for POST `/api/auth/bootstrap` endpoint.
///
/// Unauthenticated; only succeeds while no users exist.
async fn handle_bootstrap(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<BootstrapAdminRequest>,
) -> Result<(StatusCode, Json<UserInfo>), HttpError> {
    info!("Handling bootstrap request");
    let user: UserInfo = bootstrap_first_admin(&app_state.store, &request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ========================================================================
// Dashboard and configuration
// ========================================================================

async fn handle_dashboard_metrics(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
) -> Result<Json<DashboardMetrics>, HttpError> {
    Ok(Json(get_dashboard_metrics(&app_state.store).await?))
}

async fn handle_configuration(SessionUser(..): SessionUser) -> Json<ConfigurationResponse> {
    Json(get_configuration())
}

// ========================================================================
// Organizations and users
// ========================================================================

async fn handle_list_organizations(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
) -> Result<Json<Vec<Organization>>, HttpError> {
    Ok(Json(list_organizations(&app_state.store).await?))
}

/// Handler for POST `/api/organizations` endpoint. Admin only.
async fn handle_create_organization(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), HttpError> {
    info!(code = %request.code, "Handling create_organization request");
    let org: Organization = create_organization(&app_state.store, &actor, request).await?;
    Ok((StatusCode::CREATED, Json(org)))
}

async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
) -> Result<Json<Vec<User>>, HttpError> {
    Ok(Json(list_users(&app_state.store).await?))
}

/// Handler for POST `/api/users` endpoint. Admin only.
async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), HttpError> {
    info!(email = %request.email, "Handling create_user request");
    let user: UserInfo = create_user(&app_state.store, &actor, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ========================================================================
// Scorecards
// ========================================================================

async fn handle_list_scorecards(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
) -> Result<Json<Vec<Scorecard>>, HttpError> {
    Ok(Json(list_scorecards(&app_state.store).await?))
}

/// Handler for GET `/api/scorecards/{id}` endpoint.
async fn handle_get_scorecard(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
    Path(scorecard_id): Path<i64>,
) -> Result<Json<Scorecard>, HttpError> {
    Ok(Json(get_scorecard(&app_state.store, scorecard_id).await?))
}

async fn handle_create_scorecard(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(request): Json<CreateScorecardRequest>,
) -> Result<(StatusCode, Json<Scorecard>), HttpError> {
    info!(name = %request.name, "Handling create_scorecard request");
    let scorecard: Scorecard = create_scorecard(&app_state.store, &actor, request).await?;
    Ok((StatusCode::CREATED, Json(scorecard)))
}

/// Handler for POST `/api/ai/generate-scorecard` endpoint.
async fn handle_generate_scorecard(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(request): Json<GenerateScorecardRequest>,
) -> Result<Json<GenerateScorecardResponse>, HttpError> {
    info!(
        institution = %request.institution_setup.name,
        "Handling generate_scorecard request"
    );
    Ok(Json(
        generate_scorecard(&app_state.store, &actor, &request).await?,
    ))
}

// ========================================================================
// Simulation, bulk processing and testing
// ========================================================================

/// Handler for POST `/api/simulation/bulk` endpoint.
async fn handle_bulk_simulation(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
    Json(request): Json<BulkSimulationRequest>,
) -> Result<Json<BulkSimulationResponse>, HttpError> {
    info!(scorecard_id = ?request.scorecard_id, "Handling bulk_simulation request");
    let mut draw = random_score;
    Ok(Json(
        run_bulk_simulation(&app_state.store, request, &mut draw).await?,
    ))
}

/// Handler for POST `/api/bulk/upload` endpoint.
async fn handle_bulk_upload(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(request): Json<BulkUploadRequest>,
) -> Result<Json<BulkJob>, HttpError> {
    info!("Handling bulk_upload request");
    let mut draw = random_score;
    Ok(Json(
        process_bulk_upload(&app_state.store, &actor, request, &mut draw).await?,
    ))
}

async fn handle_list_bulk_jobs(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
) -> Result<Json<Vec<BulkJobSummary>>, HttpError> {
    Ok(Json(list_bulk_jobs(&app_state.store).await?))
}

/// Handler for POST `/api/testing/run-tests` endpoint.
async fn handle_run_tests(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
    Json(request): Json<RunTestsRequest>,
) -> Result<Json<RunTestsResponse>, HttpError> {
    info!(scorecard_id = request.scorecard_id, "Handling run_tests request");
    Ok(Json(run_tests(&app_state.store, &request).await?))
}

async fn handle_test_history(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(..): SessionUser,
) -> Result<Json<Vec<TestHistoryEntry>>, HttpError> {
    Ok(Json(get_test_history(&app_state.store).await?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/logout", post(handle_logout))
        .route("/api/auth/me", get(handle_whoami))
        .route("/api/auth/bootstrap", post(handle_bootstrap))
        .route("/api/dashboard/metrics", get(handle_dashboard_metrics))
        .route("/api/configuration", get(handle_configuration))
        .route(
            "/api/organizations",
            get(handle_list_organizations).post(handle_create_organization),
        )
        .route("/api/users", get(handle_list_users).post(handle_create_user))
        .route(
            "/api/scorecards",
            get(handle_list_scorecards).post(handle_create_scorecard),
        )
        .route("/api/scorecards/{scorecard_id}", get(handle_get_scorecard))
        .route("/api/ai/generate-scorecard", post(handle_generate_scorecard))
        .route("/api/simulation/bulk", post(handle_bulk_simulation))
        .route("/api/bulk/upload", post(handle_bulk_upload))
        .route("/api/bulk/jobs", get(handle_list_bulk_jobs))
        .route("/api/testing/run-tests", post(handle_run_tests))
        .route("/api/testing/history", get(handle_test_history))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing FinScore Server");

    let store: CsvStore = CsvStore::open(&args.data_dir).await?;
    let sessions: SessionRegistry =
        SessionRegistry::new(time::Duration::hours(i64::from(args.session_hours)));

    let app_state: AppState = AppState {
        store: Arc::new(store),
        sessions: Arc::new(sessions),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
