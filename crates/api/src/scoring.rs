// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batch scoring of input records.
//!
//! Scores are drawn from a caller-supplied source on the 0-100 scale; the
//! scorecard configuration is not evaluated. Bucket and recommendation are
//! derived from the unrounded score, and the reported score is rounded to two
//! decimal places.

use std::collections::BTreeMap;

use finscore_domain::Grade;
use num_traits::ToPrimitive;
use serde_json::Value;

use crate::request_response::{Recommendation, ScoredRecord};

/// Minimum score that earns an `Approve` recommendation.
pub const APPROVAL_THRESHOLD: f64 = 70.0;

/// Reason codes attached to scored records, by score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasonSet {
    /// Grade A.
    pub excellent: &'static str,
    /// Grade B.
    pub good: &'static str,
    /// Everything below B.
    pub high_risk: &'static str,
}

pub const SIMULATION_REASONS: ReasonSet = ReasonSet {
    excellent: "Excellent Credit",
    good: "Good Credit",
    high_risk: "High Risk",
};

pub const UPLOAD_REASONS: ReasonSet = ReasonSet {
    excellent: "Excellent Profile",
    good: "Good Profile",
    high_risk: "High Risk",
};

impl ReasonSet {
    #[must_use]
    pub const fn for_grade(&self, grade: Grade) -> &'static str {
        match grade {
            Grade::A => self.excellent,
            Grade::B => self.good,
            Grade::C | Grade::D => self.high_risk,
        }
    }
}

/// Aggregate figures for a scored batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub distribution: BTreeMap<String, usize>,
    /// Mean of the rounded scores. Not rounded itself.
    pub avg_score: f64,
    /// Percentage of `Approve` recommendations. Not rounded itself.
    pub approval_rate: f64,
}

impl BatchSummary {
    /// The band the average score falls in.
    #[must_use]
    pub fn bucket(&self) -> Grade {
        Grade::from_score(self.avg_score)
    }
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The record's own `id` if it has a usable one, else `REC_{index}`.
fn record_id(record: &Value, index: usize) -> String {
    match record.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => format!("REC_{index}"),
    }
}

/// Scores one record.
///
/// # Arguments
///
/// * `id` - Identifier for the scored entry
/// * `index` - Position of the record in its batch
/// * `record` - The input record, echoed back as `inputData`
/// * `raw_score` - The unrounded score on the 0-100 scale
/// * `reasons` - Reason codes to use
#[must_use]
pub fn score_record(
    id: String,
    index: usize,
    record: Value,
    raw_score: f64,
    reasons: ReasonSet,
) -> ScoredRecord {
    let grade: Grade = Grade::from_score(raw_score);
    let recommendation: Recommendation = if raw_score >= APPROVAL_THRESHOLD {
        Recommendation::Approve
    } else {
        Recommendation::Decline
    };

    ScoredRecord {
        id,
        record_id: record_id(&record, index),
        score: round2(raw_score),
        bucket: grade.as_str().to_string(),
        recommendation,
        reason_codes: vec![reasons.for_grade(grade).to_string()],
        input_data: record,
    }
}

/// Scores every record of a batch, drawing one score per record.
///
/// Entry ids are `{id_prefix}_{batch_stamp}_{index}`.
pub fn score_batch(
    records: Vec<Value>,
    id_prefix: &str,
    batch_stamp: i64,
    reasons: ReasonSet,
    mut draw: impl FnMut() -> f64,
) -> Vec<ScoredRecord> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            score_record(
                format!("{id_prefix}_{batch_stamp}_{index}"),
                index,
                record,
                draw(),
                reasons,
            )
        })
        .collect()
}

/// Summarizes a scored batch. Returns `None` for an empty batch.
#[must_use]
pub fn summarize(results: &[ScoredRecord]) -> Option<BatchSummary> {
    if results.is_empty() {
        return None;
    }

    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        *distribution.entry(result.bucket.clone()).or_insert(0) += 1;
    }

    let total: f64 = results.len().to_f64()?;
    let score_sum: f64 = results.iter().map(|r| r.score).sum();
    let approved: f64 = results
        .iter()
        .filter(|r| r.recommendation == Recommendation::Approve)
        .count()
        .to_f64()?;

    Some(BatchSummary {
        distribution,
        avg_score: score_sum / total,
        approval_rate: approved / total * 100.0,
    })
}
