// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use finscore_domain::{Role, User};
use finscore_persistence::{CsvStore, NewScorecard, NewUser};
use serde_json::json;
use tempfile::TempDir;

use crate::AuthenticatedActor;

pub const TEST_PASSWORD: &str = "Secure123!";

pub async fn create_test_store() -> (TempDir, CsvStore) {
    let dir: TempDir = tempfile::tempdir().expect("Failed to create temp dir");
    let store: CsvStore = CsvStore::open(dir.path())
        .await
        .expect("Failed to open store");
    (dir, store)
}

/// Stores a user whose password is [`TEST_PASSWORD`], hashed at minimum cost.
pub async fn seed_user(store: &CsvStore, email: &str, role: Role) -> User {
    let hash: String = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    store
        .create_user(NewUser::new("Seeded User", email, hash).with_role(role))
        .await
        .unwrap()
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(1, Role::Admin, 1)
}

pub fn create_test_power_user() -> AuthenticatedActor {
    AuthenticatedActor::new(2, Role::PowerUser, 1)
}

pub fn create_test_plain_user() -> AuthenticatedActor {
    AuthenticatedActor::new(3, Role::User, 1)
}

pub async fn seed_scorecard(store: &CsvStore) -> i64 {
    store
        .create_scorecard(NewScorecard {
            organization_id: 1,
            name: String::from("Retail PL"),
            product: String::from("Personal Loan"),
            segment: String::from("Salaried"),
            version: String::from("1.0"),
            config_json: json!({}),
            status: String::from("Active"),
            created_by: 1,
        })
        .await
        .unwrap()
        .id
}

/// Score source that cycles through fixed raw scores.
pub fn fixed_scores(scores: &'static [f64]) -> impl FnMut() -> f64 + Send {
    let mut idx: usize = 0;
    move || {
        let score: f64 = scores[idx % scores.len()];
        idx += 1;
        score
    }
}
