// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::collections::HashMap;

use finscore_domain::{Role, User};
use finscore_persistence::CsvStore;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// An authenticated platform user with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's identifier in the users table.
    pub user_id: i64,
    /// The role assigned to this user.
    pub role: Role,
    /// The organization the user belongs to.
    pub organization_id: i64,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(user_id: i64, role: Role, organization_id: i64) -> Self {
        Self {
            user_id,
            role,
            organization_id,
        }
    }

    #[must_use]
    pub const fn from_user(user: &User) -> Self {
        Self::new(user.id, user.role, user.organization_id)
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may create organizations and user accounts.
    ///
    /// Only Admin actors may manage accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_accounts(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.role.can_manage_accounts() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            })
        }
    }

    /// Checks if an actor may create or generate scorecards.
    ///
    /// Every role except plain `User` may author scorecards.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor only has the `User` role.
    pub fn authorize_author_scorecards(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.role.can_author_scorecards() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Approver, Power User or Admin"),
            })
        }
    }
}

/// A live login session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

/// In-process store of bearer session tokens.
///
/// Sessions are not persisted: restarting the server logs everyone out.
#[derive(Debug)]
pub struct SessionRegistry {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SESSION_EXPIRATION)
    }
}

impl SessionRegistry {
    /// Default session expiration duration (7 days).
    pub const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(7);

    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a new token for a user.
    pub async fn issue(&self, user_id: i64) -> (String, Session) {
        let token: String = Self::generate_session_token();
        let session: Session = Session {
            user_id,
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        self.sessions.write().await.insert(token.clone(), session);
        (token, session)
    }

    /// Resolves a token to its session.
    ///
    /// Expired sessions are removed and reported as missing.
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        let session: Session = *self.sessions.read().await.get(token)?;
        if OffsetDateTime::now_utc() > session.expires_at {
            self.sessions.write().await.remove(token);
            debug!(user_id = session.user_id, "Dropped expired session");
            return None;
        }
        Some(session)
    }

    /// Removes a token. Returns whether it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Number of sessions currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn generate_session_token() -> String {
        let nanos: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos();
        format!(
            "session_{nanos}_{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }
}

/// Authentication service for bearer-token sessions.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Verifies credentials and opens a session.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `session`, `user`)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the account is inactive,
    /// or the users table cannot be read.
    pub async fn login(
        store: &CsvStore,
        sessions: &SessionRegistry,
        email: &str,
        password: &str,
    ) -> Result<(String, Session, User), AuthError> {
        let user: User = store
            .get_user_by_email(email)
            .await
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Record store error: {e}"),
            })?
            .ok_or_else(Self::invalid_credentials)?;

        // Registration hashes the trimmed password. A corrupt hash is treated
        // like a wrong password.
        let verified: bool =
            bcrypt::verify(password.trim(), &user.password_hash).unwrap_or(false);
        if !verified {
            warn!(email, "Rejected login with invalid credentials");
            return Err(Self::invalid_credentials());
        }

        if !user.is_active {
            warn!(user_id = user.id, "Rejected login for inactive user");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is inactive"),
            });
        }

        let (token, session): (String, Session) = sessions.issue(user.id).await;
        info!(user_id = user.id, "User logged in");
        Ok((token, session, user))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unknown or expired, or the user no
    /// longer exists or is inactive.
    pub async fn validate_session(
        store: &CsvStore,
        sessions: &SessionRegistry,
        token: &str,
    ) -> Result<(AuthenticatedActor, User), AuthError> {
        let session: Session =
            sessions
                .resolve(token)
                .await
                .ok_or_else(|| AuthError::AuthenticationFailed {
                    reason: String::from("Invalid or expired session token"),
                })?;

        let user: User = store
            .get_user(session.user_id)
            .await
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Record store error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        if !user.is_active {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is inactive"),
            });
        }

        Ok((AuthenticatedActor::from_user(&user), user))
    }

    /// Logs out by revoking the session token.
    ///
    /// Revoking an unknown token is not an error.
    pub async fn logout(sessions: &SessionRegistry, token: &str) {
        if sessions.revoke(token).await {
            info!("Session revoked");
        }
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid credentials"),
        }
    }
}
