// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use finscore_domain::Role;
use time::Duration;

use super::helpers::{TEST_PASSWORD, create_test_store, seed_user};
use crate::{
    ApiError, AuthError, AuthenticationService, BootstrapAdminRequest, LoginRequest,
    LoginResponse, SessionRegistry, bootstrap_first_admin, login, logout, whoami,
};

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_issues_usable_session() {
    let (_dir, store) = create_test_store().await;
    let sessions: SessionRegistry = SessionRegistry::default();
    seed_user(&store, "admin@demo.com", Role::Admin).await;

    let response: LoginResponse = login(
        &store,
        &sessions,
        &login_request("admin@demo.com", TEST_PASSWORD),
    )
    .await
    .unwrap();

    assert_eq!(response.user.id, 1);
    assert_eq!(response.user.role, Role::Admin);
    assert!(!response.token.is_empty());

    let (actor, user) = AuthenticationService::validate_session(&store, &sessions, &response.token)
        .await
        .unwrap();
    assert_eq!(actor.user_id, 1);
    assert_eq!(actor.role, Role::Admin);
    assert_eq!(whoami(&user).user.email, "admin@demo.com");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_fail_alike() {
    let (_dir, store) = create_test_store().await;
    let sessions: SessionRegistry = SessionRegistry::default();
    seed_user(&store, "a@x.com", Role::User).await;

    let wrong: ApiError = login(&store, &sessions, &login_request("a@x.com", "nope"))
        .await
        .unwrap_err();
    let unknown: ApiError = login(&store, &sessions, &login_request("b@x.com", TEST_PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(wrong, unknown);
    assert!(matches!(wrong, ApiError::AuthenticationFailed { .. }));
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in() {
    let (_dir, store) = create_test_store().await;
    let sessions: SessionRegistry = SessionRegistry::default();
    let hash: String = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    let contents: String = format!(
        "id,name,email,password_hash,role,organization_id,is_active\n1,Old,old@x.com,{hash},User,1,f\n"
    );
    tokio::fs::write(store.data_dir().join("users.csv"), contents)
        .await
        .unwrap();

    let err: ApiError = login(&store, &sessions, &login_request("old@x.com", TEST_PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::AuthenticationFailed {
            reason: String::from("Account is inactive"),
        }
    );
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (_dir, store) = create_test_store().await;
    let sessions: SessionRegistry = SessionRegistry::default();
    seed_user(&store, "a@x.com", Role::User).await;

    let response: LoginResponse = login(&store, &sessions, &login_request("a@x.com", TEST_PASSWORD))
        .await
        .unwrap();
    logout(&sessions, &response.token).await;

    let result = AuthenticationService::validate_session(&store, &sessions, &response.token).await;
    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { .. })
    ));

    // Logging out twice is harmless
    logout(&sessions, &response.token).await;
}

#[tokio::test]
async fn test_expired_session_is_rejected_and_dropped() {
    let (_dir, store) = create_test_store().await;
    let sessions: SessionRegistry = SessionRegistry::new(Duration::seconds(-1));
    let user = seed_user(&store, "a@x.com", Role::User).await;

    let (token, _) = sessions.issue(user.id).await;
    assert_eq!(sessions.len().await, 1);

    assert!(sessions.resolve(&token).await.is_none());
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn test_session_for_deleted_user_is_rejected() {
    let (_dir, store) = create_test_store().await;
    let sessions: SessionRegistry = SessionRegistry::default();
    let (token, _) = sessions.issue(99).await;

    let err: AuthError = AuthenticationService::validate_session(&store, &sessions, &token)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::AuthenticationFailed {
            reason: String::from("User not found"),
        }
    );
}

#[tokio::test]
async fn test_tokens_are_unique() {
    let sessions: SessionRegistry = SessionRegistry::default();
    let (a, _) = sessions.issue(1).await;
    let (b, _) = sessions.issue(1).await;
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_padded_password_logs_in_as_registered() {
    let (_dir, store) = create_test_store().await;
    let sessions: SessionRegistry = SessionRegistry::default();
    let padded: String = format!(" {TEST_PASSWORD} ");
    bootstrap_first_admin(
        &store,
        &BootstrapAdminRequest {
            name: String::from("Admin"),
            email: String::from("admin@demo.com"),
            password: padded.clone(),
        },
    )
    .await
    .unwrap();

    for attempt in [padded.as_str(), TEST_PASSWORD] {
        let response: LoginResponse =
            login(&store, &sessions, &login_request("admin@demo.com", attempt))
                .await
                .unwrap();
        assert_eq!(response.user.id, 1);
    }
}
