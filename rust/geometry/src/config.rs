// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration
//!
//! Camera and grid parameters passed explicitly into every entry point.

use serde::{Deserialize, Serialize};

/// Default vertical field of view (degrees)
pub const DEFAULT_VERTICAL_FOV: f64 = 60.0;
/// Default camera aspect ratio (width / height)
pub const DEFAULT_ASPECT_RATIO: f64 = 16.0 / 9.0;
/// Pyramid depth used when the view ray does not hit the mesh
pub const DEFAULT_FALLBACK_DEPTH: f64 = 100.0;
/// Voxels per axis of the collision grid
pub const DEFAULT_VOXEL_RESOLUTION: usize = 64;
/// Minimum dot(face normal, direction to eye) for a face to count as visible.
/// Slightly negative so grazing faces are still admitted.
// TODO: confirm whether -0.15 is a grazing-angle allowance or tuned to a fixture.
pub const DEFAULT_FACING_TOLERANCE: f64 = -0.15;

/// Upper bound for the voxel resolution (512^3 cells is already ~134M flags)
pub const MAX_VOXEL_RESOLUTION: usize = 512;

/// Configuration for coverage and collision computations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Vertical field of view in degrees
    pub vertical_fov: f64,
    /// Width / height of the camera image
    pub aspect_ratio: f64,
    /// Pyramid depth when no mesh hit is found along the view direction
    pub fallback_depth: f64,
    /// Voxels per axis of the collision grid
    pub voxel_resolution: usize,
    /// Facing threshold applied to dot(normal, view direction)
    pub facing_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vertical_fov: DEFAULT_VERTICAL_FOV,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            fallback_depth: DEFAULT_FALLBACK_DEPTH,
            voxel_resolution: DEFAULT_VOXEL_RESOLUTION,
            facing_tolerance: DEFAULT_FACING_TOLERANCE,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertical_fov(mut self, degrees: f64) -> Self {
        self.vertical_fov = degrees;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect: f64) -> Self {
        self.aspect_ratio = aspect;
        self
    }

    pub fn with_fallback_depth(mut self, depth: f64) -> Self {
        self.fallback_depth = depth;
        self
    }

    pub fn with_voxel_resolution(mut self, resolution: usize) -> Self {
        self.voxel_resolution = resolution;
        self
    }

    pub fn with_facing_tolerance(mut self, tolerance: f64) -> Self {
        self.facing_tolerance = tolerance;
        self
    }

    /// Horizontal field of view in degrees, derived from the vertical FOV and
    /// aspect ratio: `2·atan(tan(vfov/2)·aspect)`
    #[inline]
    pub fn horizontal_fov(&self) -> f64 {
        let half_v = self.vertical_fov.to_radians() * 0.5;
        (2.0 * (half_v.tan() * self.aspect_ratio).atan()).to_degrees()
    }

    /// Replace unusable values with defaults.
    ///
    /// Field of view must lie in (0, 180), aspect ratio and fallback depth must
    /// be positive and finite, the voxel resolution is clamped to
    /// `[1, MAX_VOXEL_RESOLUTION]`.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, d: f64| if v.is_finite() && v > 0.0 { v } else { d };

        let vertical_fov = if self.vertical_fov.is_finite()
            && self.vertical_fov > 0.0
            && self.vertical_fov < 180.0
        {
            self.vertical_fov
        } else {
            defaults.vertical_fov
        };

        Self {
            vertical_fov,
            aspect_ratio: positive(self.aspect_ratio, defaults.aspect_ratio),
            fallback_depth: positive(self.fallback_depth, defaults.fallback_depth),
            voxel_resolution: self.voxel_resolution.clamp(1, MAX_VOXEL_RESOLUTION),
            facing_tolerance: if self.facing_tolerance.is_finite() {
                self.facing_tolerance
            } else {
                defaults.facing_tolerance
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_fov_square_aspect() {
        let config = EngineConfig::new().with_vertical_fov(60.0).with_aspect_ratio(1.0);
        assert_relative_eq!(config.horizontal_fov(), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_horizontal_fov_wide_aspect() {
        let config = EngineConfig::new().with_vertical_fov(90.0).with_aspect_ratio(2.0);
        // tan(45°) = 1, atan(2) ≈ 63.435°
        assert_relative_eq!(
            config.horizontal_fov(),
            2.0 * 2.0f64.atan().to_degrees(),
            epsilon = 1e-9
        );
        assert!(config.horizontal_fov() > config.vertical_fov);
    }

    #[test]
    fn test_sanitized_replaces_bad_values() {
        let config = EngineConfig {
            vertical_fov: 250.0,
            aspect_ratio: -1.0,
            fallback_depth: f64::NAN,
            voxel_resolution: 0,
            facing_tolerance: f64::INFINITY,
        }
        .sanitized();

        assert_eq!(config.vertical_fov, DEFAULT_VERTICAL_FOV);
        assert_eq!(config.aspect_ratio, DEFAULT_ASPECT_RATIO);
        assert_eq!(config.fallback_depth, DEFAULT_FALLBACK_DEPTH);
        assert_eq!(config.voxel_resolution, 1);
        assert_eq!(config.facing_tolerance, DEFAULT_FACING_TOLERANCE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"verticalFov": 45.0, "voxelResolution": 32}"#).unwrap();
        assert_eq!(config.vertical_fov, 45.0);
        assert_eq!(config.voxel_resolution, 32);
        assert_eq!(config.facing_tolerance, DEFAULT_FACING_TOLERANCE);
        assert_eq!(config.fallback_depth, DEFAULT_FALLBACK_DEPTH);
    }
}
