// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine state behind the JavaScript API
//!
//! Holds the current mesh, configuration and cached collision detector.
//! Plain Rust so it can be exercised without a JavaScript host.

use crate::utils;
use inspect_lite_geometry::{
    CollisionDetector, CollisionResult, CoverageEngine, CoverageMetrics, EngineConfig, Error,
    Mesh, PathSample, WaypointMetrics,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Invalid config JSON: {0}")]
    InvalidConfig(serde_json::Error),

    #[error("Invalid path JSON: {0}")]
    InvalidPath(serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(serde_json::Error),

    #[error(transparent)]
    Geometry(#[from] Error),
}

pub type Result<T> = std::result::Result<T, BindingError>;

/// Parse a path given as a JSON array of `{x, y, z, normalX?, normalY?, normalZ?}`
pub fn parse_path(path_json: &str) -> Result<Vec<PathSample>> {
    serde_json::from_str(path_json).map_err(BindingError::InvalidPath)
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(BindingError::Serialization)
}

#[derive(Debug, Default)]
pub struct Session {
    config: EngineConfig,
    mesh: Mesh,
    /// Built lazily, dropped whenever the mesh or voxel resolution changes
    detector: Option<CollisionDetector>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        let config = config.sanitized();
        if config.voxel_resolution != self.config.voxel_resolution {
            self.detector = None;
        }
        self.config = config;
    }

    /// Replace the configuration from JSON; missing fields take defaults
    pub fn set_config_json(&mut self, config_json: &str) -> Result<()> {
        let config: EngineConfig =
            serde_json::from_str(config_json).map_err(BindingError::InvalidConfig)?;
        self.set_config(config);
        Ok(())
    }

    pub fn config_json(&self) -> String {
        serde_json::to_string(&self.config).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Replace the mesh. Trailing partial triples are ignored and faces
    /// with out-of-range indices are skipped, as in the engine.
    pub fn set_mesh(&mut self, vertices: Vec<f64>, indices: Option<Vec<u32>>) {
        let index_tail = indices.as_ref().map_or(0, |i| i.len() % 3);
        if vertices.len() % 3 != 0 || index_tail != 0 {
            utils::warn(&format!(
                "[inspect-lite] ignoring partial triples: {} vertex values, {} index values",
                vertices.len() % 3,
                index_tail
            ));
        }

        self.mesh = Mesh::new(vertices, indices);
        self.detector = None;

        let view = self.mesh.view();
        utils::debug(&format!(
            "[inspect-lite] mesh set: {} vertices, {} faces",
            view.vertex_count(),
            view.face_count()
        ));
    }

    pub fn clear_mesh(&mut self) {
        self.mesh = Mesh::default();
        self.detector = None;
    }

    pub fn engine(&self) -> CoverageEngine<'_> {
        CoverageEngine::new(self.mesh.view(), self.config)
    }

    pub fn coverage(&self, path: &[PathSample]) -> CoverageMetrics {
        self.engine().compute(path)
    }

    pub fn incremental_coverage(&self, path: &[PathSample]) -> Vec<f64> {
        self.engine().incremental(path)
    }

    pub fn waypoint_metrics(&self, path: &[PathSample], index: usize) -> Result<WaypointMetrics> {
        Ok(self.engine().waypoint_metrics(path, index)?)
    }

    pub fn all_waypoint_metrics(&self, path: &[PathSample]) -> Vec<WaypointMetrics> {
        self.engine().all_waypoint_metrics(path)
    }

    pub fn pairwise_overlap(&self, path: &[PathSample], a: usize, b: usize) -> Result<f64> {
        Ok(self.engine().pairwise_overlap(path, a, b)?)
    }

    /// Visible faces of one waypoint, ascending
    pub fn visible_faces(&self, path: &[PathSample], index: usize) -> Result<Vec<u32>> {
        let sample = sample_at(path, index)?;
        let engine = self.engine();
        Ok(engine.visible_faces(&engine.viewpoint_for(sample)))
    }

    /// Viewing pyramid of one waypoint as 15 numbers: apex then 4 base corners
    pub fn viewing_pyramid(&self, path: &[PathSample], index: usize) -> Result<Vec<f64>> {
        let sample = sample_at(path, index)?;
        let engine = self.engine();
        let pyramid = engine.pyramid_for(&engine.viewpoint_for(sample));
        Ok(pyramid
            .vertices()
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect())
    }

    /// Collision check; the voxel grid is built on first use and cached
    pub fn detect_collisions(&mut self, path: &[PathSample]) -> CollisionResult {
        let config = self.config;
        let mesh = &self.mesh;
        let detector = self.detector.get_or_insert_with(|| {
            let detector = CollisionDetector::new(&mesh.view(), &config);
            if detector.is_fallback() {
                utils::warn(
                    "[inspect-lite] mesh too small to voxelize, using bounding-box collision tests",
                );
            } else if let Some(grid) = detector.grid() {
                utils::debug(&format!(
                    "[inspect-lite] voxel grid rebuilt: {}^3, {} occupied",
                    grid.resolution(),
                    grid.occupied_count()
                ));
            }
            detector
        });
        detector.detect(path)
    }

    /// Whether a collision detector is cached
    pub fn has_cached_detector(&self) -> bool {
        self.detector.is_some()
    }
}

fn sample_at(path: &[PathSample], index: usize) -> Result<&PathSample> {
    path.get(index).ok_or_else(|| {
        BindingError::Geometry(Error::WaypointOutOfRange {
            index,
            len: path.len(),
        })
    })
}
