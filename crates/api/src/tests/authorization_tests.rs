// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use finscore_domain::Role;

use super::helpers::{create_test_admin, create_test_plain_user, create_test_power_user};
use crate::{AuthError, AuthenticatedActor, AuthorizationService};

#[test]
fn test_only_admin_manages_accounts() {
    assert!(AuthorizationService::authorize_manage_accounts(&create_test_admin(), "create_user").is_ok());

    for actor in [
        create_test_power_user(),
        create_test_plain_user(),
        AuthenticatedActor::new(4, Role::Approver, 1),
    ] {
        assert_eq!(
            AuthorizationService::authorize_manage_accounts(&actor, "create_user"),
            Err(AuthError::Unauthorized {
                action: String::from("create_user"),
                required_role: String::from("Admin"),
            })
        );
    }
}

#[test]
fn test_plain_users_cannot_author_scorecards() {
    assert!(
        AuthorizationService::authorize_author_scorecards(&create_test_power_user(), "x").is_ok()
    );
    assert!(AuthorizationService::authorize_author_scorecards(&create_test_admin(), "x").is_ok());
    assert!(
        AuthorizationService::authorize_author_scorecards(
            &AuthenticatedActor::new(4, Role::Approver, 1),
            "x"
        )
        .is_ok()
    );
    assert!(matches!(
        AuthorizationService::authorize_author_scorecards(&create_test_plain_user(), "x"),
        Err(AuthError::Unauthorized { .. })
    ));
}
