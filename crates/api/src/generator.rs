// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scorecard configuration generator.
//!
//! Builds an equal-weight configuration from the data sources an
//! institution has available. Category and variable weights are integer
//! shares of 100 (`floor(100 / n)`), so they may sum to slightly less than
//! 100.

use finscore_domain::Grade;
use serde_json::{Map, Value, json};

use crate::error::ApiError;
use crate::request_response::GenerateScorecardRequest;

/// Status given to generated scorecards.
pub const GENERATED_STATUS: &str = "Draft by AI";

/// Segment used when the request names none.
pub const DEFAULT_SEGMENT: &str = "General";

/// Version given to generated scorecards.
pub const GENERATED_VERSION: &str = "1.0";

/// A generated configuration and its size.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedConfig {
    pub config: Value,
    pub categories: usize,
    pub variables: usize,
}

/// Extracts the non-blank source names from one category entry.
///
/// Arrays contribute their string items, objects their string values, and
/// a bare string contributes itself. Anything else contributes nothing.
fn source_names(entry: &Value) -> Vec<String> {
    let is_usable = |value: &&Value| value.as_str().is_some_and(|s| !s.trim().is_empty());
    let collect = |values: Vec<&Value>| -> Vec<String> {
        values
            .into_iter()
            .filter(is_usable)
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    };

    match entry {
        Value::Array(items) => collect(items.iter().collect()),
        Value::Object(fields) => collect(fields.values().collect()),
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Integer share of 100 for one of `count` parts.
fn equal_weight(count: usize) -> u64 {
    u64::try_from(count).map_or(0, |n| 100 / n.max(1))
}

fn bucket_mapping() -> Value {
    let mut mapping: Map<String, Value> = Map::new();
    for grade in Grade::ALL {
        let (min, max) = grade.bounds();
        mapping.insert(
            grade.as_str().to_string(),
            json!({ "min": min, "max": max, "description": grade.description() }),
        );
    }
    Value::Object(mapping)
}

/// Builds the configuration for a generation request.
///
/// # Arguments
///
/// * `request` - The generation request
/// * `generated_at` - Timestamp recorded in the metadata
///
/// # Errors
///
/// Returns `InvalidInput` if no category has at least one usable source.
pub fn generate_config(
    request: &GenerateScorecardRequest,
    generated_at: &str,
) -> Result<GeneratedConfig, ApiError> {
    let kept: Vec<(String, Vec<String>)> = request
        .data_sources
        .as_object()
        .map(|sources| {
            sources
                .iter()
                .map(|(category, entry)| (category.clone(), source_names(entry)))
                .filter(|(_, names)| !names.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if kept.is_empty() {
        return Err(ApiError::invalid_input(
            "dataSources",
            "No valid data sources provided",
        ));
    }

    let category_weight: u64 = equal_weight(kept.len());
    let mut variables: usize = 0;
    let mut categories: Map<String, Value> = Map::new();

    for (category, names) in &kept {
        let variable_weight: u64 = equal_weight(names.len());
        variables += names.len();
        let entries: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "weight": variable_weight,
                    "type": "continuous",
                    "scoreRange": [0, 100],
                })
            })
            .collect();
        categories.insert(
            category.clone(),
            json!({ "weight": category_weight, "variables": entries }),
        );
    }

    let config: Value = json!({
        "categories": categories,
        "bucketMapping": bucket_mapping(),
        "metadata": {
            "institutionName": request.institution_setup.name,
            "productType": request.product_config.product_type,
            "targetSegment": request.product_config.target_segment,
            "riskTolerance": request.risk_parameters.risk_tolerance,
            "generatedAt": generated_at,
        },
    });

    Ok(GeneratedConfig {
        config,
        categories: kept.len(),
        variables,
    })
}

/// Name given to a generated scorecard.
#[must_use]
pub fn generated_name(request: &GenerateScorecardRequest) -> String {
    format!(
        "AI {} - {}",
        request.product_config.product_type, request.institution_setup.name
    )
}
