// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Grade, Role, Scorecard, SimulationResult, User};
use serde_json::json;

fn create_test_user(role: Role) -> User {
    User {
        id: 7,
        name: String::from("Test User"),
        email: String::from("test@example.com"),
        password_hash: String::from("$2b$10$hash"),
        role,
        organization_id: 1,
        is_active: true,
        default_module: String::from("Dashboard"),
        access_matrix: String::new(),
        last_login_at: None,
        created_at: String::from("2026-01-01T00:00:00Z"),
        updated_at: String::from("2026-01-01T00:00:00Z"),
    }
}

fn create_test_scorecard(status: &str) -> Scorecard {
    Scorecard {
        id: 1,
        organization_id: 1,
        name: String::from("Retail Loans"),
        product: String::from("Personal Loan"),
        segment: String::from("Salaried"),
        version: String::from("1.0"),
        config_json: json!({}),
        status: status.to_string(),
        created_by: 1,
        approved_by: None,
        created_at: String::from("2026-01-01T00:00:00Z"),
        updated_at: String::from("2026-01-01T00:00:00Z"),
        approved_at: None,
    }
}

#[test]
fn test_role_round_trips_through_persisted_name() {
    for role in [Role::Admin, Role::PowerUser, Role::Approver, Role::User] {
        let parsed: Role = role.as_str().parse().unwrap();
        assert_eq!(parsed, role);
    }
    assert_eq!(Role::PowerUser.as_str(), "Power User");
}

#[test]
fn test_role_parse_is_case_sensitive() {
    let result: Result<Role, DomainError> = "admin".parse();
    assert_eq!(result, Err(DomainError::InvalidRole(String::from("admin"))));
}

#[test]
fn test_role_default_is_user() {
    assert_eq!(Role::default(), Role::User);
}

#[test]
fn test_only_admin_manages_accounts() {
    assert!(Role::Admin.can_manage_accounts());
    assert!(!Role::PowerUser.can_manage_accounts());
    assert!(!Role::Approver.can_manage_accounts());
    assert!(!Role::User.can_manage_accounts());
}

#[test]
fn test_plain_user_cannot_author_scorecards() {
    assert!(Role::PowerUser.can_author_scorecards());
    assert!(!Role::User.can_author_scorecards());
}

#[test]
fn test_grade_from_score_uses_band_thresholds() {
    assert_eq!(Grade::from_score(100.0), Grade::A);
    assert_eq!(Grade::from_score(85.0), Grade::A);
    assert_eq!(Grade::from_score(84.99), Grade::B);
    assert_eq!(Grade::from_score(70.0), Grade::B);
    assert_eq!(Grade::from_score(69.99), Grade::C);
    assert_eq!(Grade::from_score(55.0), Grade::C);
    assert_eq!(Grade::from_score(54.99), Grade::D);
    assert_eq!(Grade::from_score(0.0), Grade::D);
}

#[test]
fn test_only_a_and_b_are_approving_buckets() {
    assert!(Grade::is_approving_bucket("A"));
    assert!(Grade::is_approving_bucket("B"));
    assert!(!Grade::is_approving_bucket("C"));
    assert!(!Grade::is_approving_bucket("D"));
    assert!(!Grade::is_approving_bucket("a"));
    assert!(!Grade::is_approving_bucket(""));
}

#[test]
fn test_grade_bounds_cover_scale_without_gaps() {
    let mut expected_upper: u8 = 100;
    for grade in Grade::ALL {
        let (lower, upper) = grade.bounds();
        assert_eq!(upper, expected_upper);
        expected_upper = lower.saturating_sub(1);
    }
    assert_eq!(Grade::D.bounds().0, 0);
}

#[test]
fn test_scorecard_is_active_only_for_exact_status() {
    assert!(create_test_scorecard("Active").is_active());
    assert!(!create_test_scorecard("active").is_active());
    assert!(!create_test_scorecard("Draft").is_active());
}

#[test]
fn test_simulation_result_approval_follows_bucket() {
    let result: SimulationResult = SimulationResult {
        id: 1,
        scorecard_id: 1,
        record_id: String::from("REC_0"),
        score: 72.5,
        bucket: String::from("B"),
        reason_codes: json!(["Good Credit"]),
        input_data: json!({}),
        created_at: String::from("2026-01-01T00:00:00Z"),
    };
    assert!(result.is_approved());
}

#[test]
fn test_user_serialization_hides_password_hash() {
    let user: User = create_test_user(Role::Admin);
    let value: serde_json::Value = serde_json::to_value(&user).unwrap();

    assert!(value.get("passwordHash").is_none());
    assert!(value.get("password_hash").is_none());
    assert_eq!(value["organizationId"], json!(1));
    assert_eq!(value["role"], json!("Admin"));
}
