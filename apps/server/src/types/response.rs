// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.
//!
//! Coverage metrics, waypoint metrics and collision results are returned as
//! the engine types; only wrappers live here.

use serde::{Deserialize, Serialize};

/// Cumulative coverage percentage after each waypoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalCoverageResponse {
    pub coverage: Vec<f64>,
}
