// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]

mod table_tests;

use serde_json::json;
use tempfile::TempDir;

use crate::{CsvStore, NewScorecard, NewSimulationResult, Row};

/// Opens a store on a fresh temporary directory.
///
/// The directory is removed when the returned guard drops.
pub async fn create_test_store() -> (TempDir, CsvStore) {
    let dir: TempDir = tempfile::tempdir().expect("Failed to create temp dir");
    let store: CsvStore = CsvStore::open(dir.path())
        .await
        .expect("Failed to open store");
    (dir, store)
}

pub fn row(fields: &[(&str, &str)]) -> Row {
    fields.iter().copied().collect()
}

pub fn create_test_scorecard(status: &str) -> NewScorecard {
    NewScorecard {
        organization_id: 1,
        name: String::from("Retail PL"),
        product: String::from("Personal Loan"),
        segment: String::from("Salaried"),
        version: String::from("1.0"),
        config_json: json!({ "categories": [] }),
        status: status.to_string(),
        created_by: 1,
    }
}

pub fn create_test_result(bucket: &str, score: f64) -> NewSimulationResult {
    NewSimulationResult {
        scorecard_id: 1,
        record_id: String::from("REC-1"),
        score,
        bucket: bucket.to_string(),
        reason_codes: json!(["Good Credit"]),
        input_data: json!({ "income": 50_000 }),
    }
}

/// Writes raw file contents for a table inside the store's directory.
pub async fn write_table_file(store: &CsvStore, file_name: &str, contents: &str) {
    tokio::fs::write(store.data_dir().join(file_name), contents)
        .await
        .expect("Failed to write table file");
}
