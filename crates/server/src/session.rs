// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! This module provides Axum extractors for reading bearer tokens and
//! enforcing authentication at the server boundary.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use finscore_api::{AuthenticatedActor, AuthenticationService};
use finscore_domain::User;
use tracing::{debug, warn};

use crate::AppState;

/// The raw bearer token from the `Authorization` header.
///
/// The token is not validated; use [`SessionUser`] for that.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header
            .strip_prefix("Bearer ")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                warn!("Authorization header does not carry a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        Ok(Self(token.trim().to_string()))
    }
}

/// Extractor for authenticated users.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionUser(actor, user): SessionUser,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // user: User
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if:
/// - Authorization header is missing or malformed
/// - Session token is unknown or expired
/// - The user no longer exists or is inactive
pub struct SessionUser(pub AuthenticatedActor, pub User);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let (actor, user) =
            AuthenticationService::validate_session(&state.store, &state.sessions, &token)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Session validation failed");
                    SessionError::InvalidSession(e.to_string())
                })?;

        debug!(user_id = user.id, role = %actor.role, "Session validated");

        Ok(Self(actor, user))
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingAuthorizationHeader => {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header")
            }
            Self::InvalidAuthorizationHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    format!("Session validation failed: {reason}"),
                )
                    .into_response();
            }
        };

        (status, message).into_response()
    }
}
