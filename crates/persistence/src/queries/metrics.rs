// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dashboard aggregation.

use finscore_domain::{DashboardMetrics, Scorecard, SimulationResult};
use num_traits::ToPrimitive;
use tracing::debug;

use crate::error::PersistenceError;
use crate::repository::Repository;

/// Percentage of results in an approving bucket, rounded to one decimal place.
///
/// Returns exactly `0.0` when there are no results.
#[must_use]
pub fn approval_rate(results: &[SimulationResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }

    let approved: usize = results.iter().filter(|r| r.is_approved()).count();
    let approved: f64 = approved.to_f64().unwrap_or_default();
    let total: f64 = results.len().to_f64().unwrap_or(1.0);

    (approved / total * 1000.0).round() / 10.0
}

/// Computes the dashboard metrics.
///
/// Scorecards and simulation results are loaded concurrently. Each load takes
/// its own table's lock, so the two snapshots are not taken at one instant.
///
/// # Errors
///
/// Returns an error if either table cannot be loaded.
pub async fn dashboard_metrics(
    scorecards: &Repository<Scorecard>,
    results: &Repository<SimulationResult>,
) -> Result<DashboardMetrics, PersistenceError> {
    let (scorecards, results): (Vec<Scorecard>, Vec<SimulationResult>) =
        futures::try_join!(scorecards.list(), results.list())?;

    let metrics: DashboardMetrics = DashboardMetrics {
        active_scorecards: scorecards.iter().filter(|s| s.is_active()).count(),
        applications_scored: results.len(),
        approval_rate: approval_rate(&results),
        ab_tests: 0,
    };

    debug!(
        active_scorecards = metrics.active_scorecards,
        applications_scored = metrics.applications_scored,
        approval_rate = metrics.approval_rate,
        "Computed dashboard metrics"
    );
    Ok(metrics)
}
