// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service modules wrapping the geometry engine.

pub mod inspector;

pub use inspector::{
    compute_all_waypoint_metrics, compute_coverage, compute_incremental_coverage,
    compute_waypoint_metrics, detect_collisions,
};
