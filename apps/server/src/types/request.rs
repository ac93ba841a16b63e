// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use inspect_lite_geometry::{EngineConfig, Mesh, PathSample};
use serde::Deserialize;

/// Body of every coverage and collision request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRequest {
    /// Flat vertex buffer plus optional indices.
    #[serde(default)]
    pub mesh: Mesh,

    /// Ordered waypoints `{x, y, z, normalX?, normalY?, normalZ?}`.
    #[serde(default)]
    pub path: Vec<PathSample>,

    /// Per-request engine overrides.
    #[serde(default)]
    pub config: EngineOverrides,
}

/// Engine fields a request may override; absent fields keep the server defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOverrides {
    pub vertical_fov: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub fallback_depth: Option<f64>,
    pub voxel_resolution: Option<usize>,
    pub facing_tolerance: Option<f64>,
}

impl EngineOverrides {
    /// Apply the overrides on top of `base`.
    pub fn apply(&self, base: &EngineConfig) -> EngineConfig {
        EngineConfig {
            vertical_fov: self.vertical_fov.unwrap_or(base.vertical_fov),
            aspect_ratio: self.aspect_ratio.unwrap_or(base.aspect_ratio),
            fallback_depth: self.fallback_depth.unwrap_or(base.fallback_depth),
            voxel_resolution: self.voxel_resolution.unwrap_or(base.voxel_resolution),
            facing_tolerance: self.facing_tolerance.unwrap_or(base.facing_tolerance),
        }
        .sanitized()
    }
}

impl InspectionRequest {
    /// Engine configuration for this request.
    pub fn engine_config(&self, defaults: &EngineConfig) -> EngineConfig {
        self.config.apply(defaults)
    }
}
