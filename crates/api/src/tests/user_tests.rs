// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use finscore_domain::{Organization, Role, Scorecard, User};
use finscore_persistence::CsvStore;
use serde_json::json;

use super::helpers::{
    TEST_PASSWORD, create_test_admin, create_test_plain_user, create_test_power_user,
    create_test_store,
};
use crate::{
    ApiError, BootstrapAdminRequest, CreateOrganizationRequest, CreateScorecardRequest,
    CreateUserRequest, DEFAULT_SCORECARD_STATUS, UserInfo, bootstrap_first_admin,
    create_organization, create_scorecard, create_user, get_scorecard, list_users,
};

fn user_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        name: String::from("Priya Shah"),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        ..CreateUserRequest::default()
    }
}

#[tokio::test]
async fn test_create_user_defaults() {
    let (_dir, store) = create_test_store().await;

    let info: UserInfo = create_user(&store, &create_test_admin(), user_request("p@x.com"))
        .await
        .unwrap();

    assert_eq!(info.id, 1);
    assert_eq!(info.role, Role::User);
    assert_eq!(info.organization_id, 1);
    assert!(info.is_active);

    let stored: User = store.get_user(1).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, TEST_PASSWORD);
    assert!(bcrypt::verify(TEST_PASSWORD, &stored.password_hash).unwrap());
    assert_eq!(stored.default_module, "Dashboard");
}

#[tokio::test]
async fn test_create_user_with_role_and_organization() {
    let (_dir, store) = create_test_store().await;

    let info: UserInfo = create_user(
        &store,
        &create_test_admin(),
        CreateUserRequest {
            role: Some(String::from("Power User")),
            organization_id: Some(3),
            ..user_request("p@x.com")
        },
    )
    .await
    .unwrap();

    assert_eq!(info.role, Role::PowerUser);
    assert_eq!(info.organization_id, 3);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let (_dir, store) = create_test_store().await;
    create_user(&store, &create_test_admin(), user_request("p@x.com"))
        .await
        .unwrap();

    let err: ApiError = create_user(&store, &create_test_admin(), user_request("p@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "unique_email"));
    assert_eq!(list_users(&store).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_role_is_rejected() {
    let (_dir, store) = create_test_store().await;

    let err: ApiError = create_user(
        &store,
        &create_test_admin(),
        CreateUserRequest {
            role: Some(String::from("Superuser")),
            ..user_request("p@x.com")
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "role"));
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let (_dir, store) = create_test_store().await;

    for password in ["", "short1", "alllowercase", "p@x.com"] {
        let err: ApiError = create_user(
            &store,
            &create_test_admin(),
            CreateUserRequest {
                password: password.to_string(),
                ..user_request("p@x.com")
            },
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, ApiError::PasswordPolicyViolation { .. }),
            "accepted {password:?}"
        );
    }

    assert!(list_users(&store).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_admin_creates_users() {
    let (_dir, store) = create_test_store().await;

    let err: ApiError = create_user(&store, &create_test_power_user(), user_request("p@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert!(list_users(&store).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_only_once() {
    let (_dir, store) = create_test_store().await;
    let request: BootstrapAdminRequest = BootstrapAdminRequest {
        name: String::from("Admin"),
        email: String::from("admin@demo.com"),
        password: TEST_PASSWORD.to_string(),
    };

    let info: UserInfo = bootstrap_first_admin(&store, &request).await.unwrap();
    assert_eq!(info.role, Role::Admin);

    let err: ApiError = bootstrap_first_admin(&store, &request).await.unwrap_err();
    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "bootstrap_once"));
}

#[tokio::test]
async fn test_create_organization() {
    let (_dir, store) = create_test_store().await;

    let org: Organization = create_organization(
        &store,
        &create_test_admin(),
        CreateOrganizationRequest {
            name: String::from("Acme Bank"),
            code: String::from("ACME"),
            org_type: String::from("Bank"),
            established_year: Some(1990),
            ..CreateOrganizationRequest::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(org.id, 1);
    assert_eq!(org.established_year, Some(1990));
    assert_eq!(org.employee_count, None);

    let err: ApiError = create_organization(
        &store,
        &create_test_plain_user(),
        CreateOrganizationRequest {
            name: String::from("Other"),
            code: String::from("OTH"),
            ..CreateOrganizationRequest::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_create_scorecard_defaults() {
    let (_dir, store) = create_test_store().await;

    let scorecard: Scorecard = create_scorecard(
        &store,
        &create_test_power_user(),
        CreateScorecardRequest {
            name: String::from("SME"),
            product: String::from("Working Capital"),
            ..CreateScorecardRequest::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(scorecard.status, DEFAULT_SCORECARD_STATUS);
    assert_eq!(scorecard.organization_id, 1);
    assert_eq!(scorecard.created_by, 2);
    assert_eq!(scorecard.config_json, json!({}));
    assert_eq!(get_scorecard(&store, 1).await.unwrap(), scorecard);
}

#[tokio::test]
async fn test_create_scorecard_rejects_non_object_config() {
    let (_dir, store) = create_test_store().await;

    let err: ApiError = create_scorecard(
        &store,
        &create_test_admin(),
        CreateScorecardRequest {
            name: String::from("SME"),
            product: String::from("Working Capital"),
            config_json: Some(json!([1, 2])),
            ..CreateScorecardRequest::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "configJson"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bootstraps_create_one_admin() {
    let (_dir, store) = create_test_store().await;
    let store: Arc<CsvStore> = Arc::new(store);

    let handles: Vec<_> = ["a@demo.com", "b@demo.com"]
        .into_iter()
        .map(|email| {
            let store: Arc<CsvStore> = Arc::clone(&store);
            let request: BootstrapAdminRequest = BootstrapAdminRequest {
                name: String::from("Admin"),
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
            };
            tokio::spawn(async move { bootstrap_first_admin(&store, &request).await })
        })
        .collect();

    let mut succeeded: usize = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(info) => {
                assert_eq!(info.role, Role::Admin);
                succeeded += 1;
            }
            Err(err) => assert!(
                matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "bootstrap_once")
            ),
        }
    }

    assert_eq!(succeeded, 1);
    let users: Vec<User> = list_users(&store).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, Role::Admin);
}

#[tokio::test]
async fn test_bootstrap_rejects_weak_password_without_writing() {
    let (_dir, store) = create_test_store().await;

    let err: ApiError = bootstrap_first_admin(
        &store,
        &BootstrapAdminRequest {
            name: String::from("Admin"),
            email: String::from("admin@demo.com"),
            password: String::from("password"),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::PasswordPolicyViolation { .. }));
    assert!(list_users(&store).await.unwrap().is_empty());
}
