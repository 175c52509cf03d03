// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and validation rules for the `FinScore` administration platform.
//!
//! The entity types here are the typed views produced by the persistence
//! layer's coercion of raw table rows. They carry no storage concerns.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use types::{
    ACTIVE_SCORECARD_STATUS, DashboardMetrics, Grade, Organization, Role, Scorecard,
    SimulationResult, User,
};
pub use validation::{
    validate_email, validate_email_unique, validate_organization_fields, validate_score,
    validate_scorecard_fields, validate_user_fields,
};
