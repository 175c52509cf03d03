// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Entity-specific lookups and read-side aggregation.
//!
//! ## Module Organization
//!
//! - `users` - lookup by email
//! - `metrics` - dashboard metrics across scorecards and simulation results

pub mod metrics;
pub mod users;

pub use metrics::{approval_rate, dashboard_metrics};
