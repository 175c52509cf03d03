// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use finscore_domain::{DashboardMetrics, SimulationResult};
use serde_json::{Value, json};

use super::helpers::{create_test_plain_user, create_test_store, fixed_scores, seed_scorecard};
use crate::{
    ApiError, BulkJob, BulkJobSummary, BulkSimulationRequest, BulkSimulationResponse,
    BulkUploadRequest, DEFAULT_TEST_COUNT, RunTestsRequest, RunTestsResponse,
    SIMULATION_PREVIEW_LEN, TestHistoryEntry, UPLOAD_PREVIEW_LEN, get_dashboard_metrics,
    get_test_history, list_bulk_jobs, process_bulk_upload, run_bulk_simulation, run_tests,
};

fn records(count: usize) -> Vec<Value> {
    (0..count).map(|i| json!({ "id": format!("APP-{i}") })).collect()
}

#[tokio::test]
async fn test_simulation_requires_scorecard_and_data() {
    let (_dir, store) = create_test_store().await;

    let missing_id: ApiError = run_bulk_simulation(
        &store,
        BulkSimulationRequest {
            scorecard_id: None,
            data: Some(records(1)),
        },
        &mut fixed_scores(&[50.0]),
    )
    .await
    .unwrap_err();
    assert!(matches!(missing_id, ApiError::InvalidInput { ref field, .. } if field == "scorecardId"));

    let id: i64 = seed_scorecard(&store).await;
    for data in [None, Some(Vec::new())] {
        let err: ApiError = run_bulk_simulation(
            &store,
            BulkSimulationRequest {
                scorecard_id: Some(id),
                data,
            },
            &mut fixed_scores(&[50.0]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "data"));
    }

    assert!(store.list_simulation_results().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_simulation_against_unknown_scorecard() {
    let (_dir, store) = create_test_store().await;

    let err: ApiError = run_bulk_simulation(
        &store,
        BulkSimulationRequest {
            scorecard_id: Some(9),
            data: Some(records(3)),
        },
        &mut fixed_scores(&[50.0]),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        ApiError::ResourceNotFound {
            resource_type: String::from("Scorecard"),
            message: String::from("Scorecard 9 does not exist"),
        }
    );
}

#[tokio::test]
async fn test_simulation_summarizes_and_stores_one_result() {
    let (_dir, store) = create_test_store().await;
    let id: i64 = seed_scorecard(&store).await;

    let response: BulkSimulationResponse = run_bulk_simulation(
        &store,
        BulkSimulationRequest {
            scorecard_id: Some(id),
            data: Some(records(4)),
        },
        &mut fixed_scores(&[90.0, 75.0, 60.0, 10.0]),
    )
    .await
    .unwrap();

    assert_eq!(response.total, 4);
    assert_eq!(response.results.len(), 4);
    assert_eq!(response.results[0].record_id, "APP-0");
    assert_eq!(response.distribution.values().sum::<usize>(), 4);
    assert!((response.avg_score - 58.75).abs() < f64::EPSILON);
    assert!((response.approval_rate - 50.0).abs() < f64::EPSILON);
    assert_eq!(response.scorecard.name, "Retail PL");

    let stored: Vec<SimulationResult> = store.list_simulation_results().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].scorecard_id, id);
    assert!(stored[0].record_id.starts_with("BULK_SIM_"));
    assert_eq!(stored[0].bucket, "C");
    assert_eq!(stored[0].reason_codes, json!(["Bulk Simulation"]));
    assert_eq!(stored[0].input_data["totalRecords"], json!(4));
    assert_eq!(stored[0].input_data["approvalRate"], json!(50.0));

    let metrics: DashboardMetrics = get_dashboard_metrics(&store).await.unwrap();
    assert_eq!(metrics.applications_scored, 1);
    assert_eq!(metrics.active_scorecards, 1);
}

#[tokio::test]
async fn test_simulation_preview_is_truncated() {
    let (_dir, store) = create_test_store().await;
    let id: i64 = seed_scorecard(&store).await;

    let response: BulkSimulationResponse = run_bulk_simulation(
        &store,
        BulkSimulationRequest {
            scorecard_id: Some(id),
            data: Some(records(SIMULATION_PREVIEW_LEN + 10)),
        },
        &mut fixed_scores(&[80.0]),
    )
    .await
    .unwrap();

    assert_eq!(response.total, SIMULATION_PREVIEW_LEN + 10);
    assert_eq!(response.results.len(), SIMULATION_PREVIEW_LEN);
    assert_eq!(response.distribution.get("B"), Some(&(SIMULATION_PREVIEW_LEN + 10)));
}

#[tokio::test]
async fn test_bulk_upload_creates_listed_job() {
    let (_dir, store) = create_test_store().await;
    let id: i64 = seed_scorecard(&store).await;

    // A plain simulation result is not a bulk job
    run_bulk_simulation(
        &store,
        BulkSimulationRequest {
            scorecard_id: Some(id),
            data: Some(records(2)),
        },
        &mut fixed_scores(&[50.0]),
    )
    .await
    .unwrap();

    let job: BulkJob = process_bulk_upload(
        &store,
        &create_test_plain_user(),
        BulkUploadRequest {
            data: Some(records(UPLOAD_PREVIEW_LEN + 5)),
            processing_type: None,
            scorecard_id: None,
        },
        &mut fixed_scores(&[95.0, 20.0]),
    )
    .await
    .unwrap();

    assert_eq!(job.job_type, "Bulk Processing");
    assert_eq!(job.status, "Completed");
    assert_eq!(job.total_records, UPLOAD_PREVIEW_LEN + 5);
    assert_eq!(job.processed_records, job.total_records);
    assert_eq!(job.results.processed.len(), UPLOAD_PREVIEW_LEN);
    assert_eq!(job.results.processed[0].reason_codes, vec!["Excellent Profile"]);
    assert_eq!(job.created_by, 3);

    let stored: Vec<SimulationResult> = store.list_simulation_results().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].scorecard_id, 1);
    assert_eq!(stored[1].record_id, format!("BULK_{}", job.id));
    assert_eq!(stored[1].reason_codes, json!(["Bulk Processing"]));

    let jobs: Vec<BulkJobSummary> = list_bulk_jobs(&store).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, json!(job.id));
    assert_eq!(jobs[0].job_type, "Scorecard Processing");
    assert_eq!(jobs[0].total_records, 15);
    assert_eq!(jobs[0].started_at, stored[1].created_at);
}

#[tokio::test]
async fn test_bulk_jobs_skip_falsy_job_ids() {
    let (_dir, store) = create_test_store().await;
    tokio::fs::write(
        store.data_dir().join("simulation_results.csv"),
        concat!(
            "id,scorecard_id,record_id,score,bucket,reason_codes,input_data,created_at\n",
            "1,1,a,50,C,[],\"{\"\"bulkJobId\"\":0}\",2026-01-01T00:00:00Z\n",
            "2,1,b,50,C,[],\"{\"\"bulkJobId\"\":\"\"\"\"}\",2026-01-01T00:00:00Z\n",
            "3,1,c,50,C,[],\"{\"\"bulkJobId\"\":\"\"JOB-3\"\",\"\"recordCount\"\":7}\",2026-01-01T00:00:00Z\n",
        ),
    )
    .await
    .unwrap();

    let jobs: Vec<BulkJobSummary> = list_bulk_jobs(&store).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, json!("JOB-3"));
    assert_eq!(jobs[0].total_records, 7);
}

#[tokio::test]
async fn test_run_tests_counts() {
    let (_dir, store) = create_test_store().await;
    let id: i64 = seed_scorecard(&store).await;

    let with_data: RunTestsResponse = run_tests(
        &store,
        &RunTestsRequest {
            scorecard_id: id,
            test_data: Some(records(20)),
        },
    )
    .await
    .unwrap();
    assert_eq!(with_data.total_tests, 20);
    assert_eq!(with_data.passed, 17);
    assert_eq!(with_data.failed, 3);
    assert_eq!(with_data.details.len(), 4);
    assert!(with_data.details.iter().all(|d| d.status == "passed"));

    let defaulted: RunTestsResponse = run_tests(
        &store,
        &RunTestsRequest {
            scorecard_id: id,
            test_data: Some(Vec::new()),
        },
    )
    .await
    .unwrap();
    assert_eq!(defaulted.total_tests, DEFAULT_TEST_COUNT);
    assert_eq!(defaulted.passed, 85);
    assert_eq!(defaulted.failed, 15);
}

#[tokio::test]
async fn test_run_tests_unknown_scorecard() {
    let (_dir, store) = create_test_store().await;

    let err: ApiError = run_tests(
        &store,
        &RunTestsRequest {
            scorecard_id: 4,
            test_data: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[tokio::test]
async fn test_history_lists_every_result() {
    let (_dir, store) = create_test_store().await;
    assert!(get_test_history(&store).await.unwrap().is_empty());

    let id: i64 = seed_scorecard(&store).await;
    run_bulk_simulation(
        &store,
        BulkSimulationRequest {
            scorecard_id: Some(id),
            data: Some(records(3)),
        },
        &mut fixed_scores(&[88.0]),
    )
    .await
    .unwrap();

    let history: Vec<TestHistoryEntry> = get_test_history(&store).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, 1);
    assert_eq!(history[0].scorecard_id, id);
    assert_eq!(history[0].test_type, "Automated");
    assert_eq!((history[0].passed, history[0].failed), (85, 15));
}

#[tokio::test]
async fn test_invalid_scores_are_not_stored() {
    let (_dir, store) = create_test_store().await;
    let id: i64 = seed_scorecard(&store).await;

    let batches: [&'static [f64]; 3] = [&[f64::NAN], &[150.0], &[-5.0, 60.0]];
    for scores in batches {
        let err: ApiError = run_bulk_simulation(
            &store,
            BulkSimulationRequest {
                scorecard_id: Some(id),
                data: Some(records(2)),
            },
            &mut fixed_scores(scores),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Internal { .. }));

        let err: ApiError = process_bulk_upload(
            &store,
            &create_test_plain_user(),
            BulkUploadRequest {
                data: Some(records(2)),
                processing_type: None,
                scorecard_id: Some(id),
            },
            &mut fixed_scores(scores),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Internal { .. }));
    }

    assert!(store.list_simulation_results().await.unwrap().is_empty());
}
