// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Path collision detection
//!
//! Checks every waypoint and every segment between consecutive waypoints
//! against a [`VoxelGrid`] of the mesh. Meshes too small to voxelize fall back
//! to bounding-box tests.

use crate::config::EngineConfig;
use crate::mesh::MeshView;
use crate::pyramid::PathSample;
use crate::triangle::Aabb;
use crate::voxel::VoxelGrid;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Fraction of the mesh diagonal added around the bounds in fallback mode
pub const NEAR_BOUNDS_FRACTION: f64 = 0.05;
/// Lower bound for the fallback margin (model units)
pub const MIN_NEAR_BOUNDS_MARGIN: f64 = 0.5;

/// What kind of test reported a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollisionKind {
    /// The waypoint itself lies in occupied space
    Point,
    /// The segment from the waypoint to the next one crosses occupied space
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// 1 at the mesh center, falling to 0 one diagonal away
    pub severity: f64,
    /// Waypoint index; for segments, the index of the segment start
    pub path_index: usize,
    pub kind: CollisionKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionResult {
    pub collision_count: usize,
    pub has_collision: bool,
    pub collisions: Vec<CollisionPoint>,
}

impl CollisionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_collisions(collisions: Vec<CollisionPoint>) -> Self {
        Self {
            collision_count: collisions.len(),
            has_collision: !collisions.is_empty(),
            collisions,
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    /// Nothing to collide with
    Empty,
    Voxel(VoxelGrid),
    /// Too few vertices or no valid triangle: bounding-box heuristics
    Bounds { bounds: Aabb, near: Aabb },
}

/// Collision queries against one mesh
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    mode: Mode,
    center: Point3<f64>,
    diagonal: f64,
}

impl CollisionDetector {
    /// Voxelize the mesh at `config.voxel_resolution`, or fall back to
    /// bounding-box tests for degenerate meshes
    pub fn new(mesh: &MeshView<'_>, config: &EngineConfig) -> Self {
        let resolution = config.sanitized().voxel_resolution;

        let Some(bounds) = mesh.bounds() else {
            return Self {
                mode: Mode::Empty,
                center: Point3::origin(),
                diagonal: 0.0,
            };
        };

        let grid = if mesh.vertex_count() >= 3 {
            VoxelGrid::build(mesh, resolution)
        } else {
            None
        };

        match grid {
            Some(grid) => Self {
                center: bounds.center(),
                diagonal: bounds.diagonal(),
                mode: Mode::Voxel(grid),
            },
            None => {
                tracing::debug!(
                    vertices = mesh.vertex_count(),
                    "Mesh cannot be voxelized, using bounding-box collision tests"
                );
                let diagonal = bounds.diagonal();
                let margin = (diagonal * NEAR_BOUNDS_FRACTION).max(MIN_NEAR_BOUNDS_MARGIN);
                Self {
                    mode: Mode::Bounds {
                        bounds,
                        near: bounds.expand(margin),
                    },
                    center: bounds.center(),
                    diagonal,
                }
            }
        }
    }

    /// Detector over a prebuilt grid; severity is measured against the grid bounds
    pub fn with_grid(grid: VoxelGrid) -> Self {
        let bounds = grid.bounds();
        Self {
            center: bounds.center(),
            diagonal: bounds.diagonal(),
            mode: Mode::Voxel(grid),
        }
    }

    /// Whether bounding-box heuristics replace the voxel grid
    pub fn is_fallback(&self) -> bool {
        matches!(self.mode, Mode::Bounds { .. })
    }

    pub fn grid(&self) -> Option<&VoxelGrid> {
        match &self.mode {
            Mode::Voxel(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn point_collides(&self, point: &Point3<f64>) -> bool {
        match &self.mode {
            Mode::Empty => false,
            Mode::Voxel(grid) => grid.is_occupied(point),
            Mode::Bounds { bounds, .. } => bounds.contains(point),
        }
    }

    /// Where the segment `start → end` first runs into the mesh
    pub fn segment_hit(&self, start: &Point3<f64>, end: &Point3<f64>) -> Option<Point3<f64>> {
        match &self.mode {
            Mode::Empty => None,
            Mode::Voxel(grid) => grid.segment_hit(start, end),
            Mode::Bounds { near, .. } => {
                let segment = end - start;
                let (t_enter, _) = near.ray_intersect(start, &segment)?;
                (t_enter <= 1.0).then(|| start + segment * t_enter)
            }
        }
    }

    /// `1 - min(1, distance to mesh center / mesh diagonal)`
    pub fn severity(&self, point: &Point3<f64>) -> f64 {
        if self.diagonal <= 0.0 {
            return 1.0;
        }
        let distance = (point - self.center).norm();
        1.0 - (distance / self.diagonal).min(1.0)
    }

    /// Check every waypoint and segment of a path.
    ///
    /// For each waypoint `i` the point collision (if any) is reported first,
    /// then the collision of segment `i → i+1`. A waypoint inside the mesh
    /// usually produces both.
    pub fn detect(&self, path: &[PathSample]) -> CollisionResult {
        if matches!(self.mode, Mode::Empty) || path.is_empty() {
            return CollisionResult::empty();
        }

        let mut collisions = Vec::new();
        for (i, sample) in path.iter().enumerate() {
            let position = sample.position();
            if self.point_collides(&position) {
                collisions.push(self.collision_at(position, i, CollisionKind::Point));
            }

            if let Some(next) = path.get(i + 1) {
                if let Some(hit) = self.segment_hit(&position, &next.position()) {
                    collisions.push(self.collision_at(hit, i, CollisionKind::Segment));
                }
            }
        }

        tracing::debug!(
            waypoints = path.len(),
            collisions = collisions.len(),
            fallback = self.is_fallback(),
            "Collision check complete"
        );
        CollisionResult::from_collisions(collisions)
    }

    fn collision_at(
        &self,
        p: Point3<f64>,
        path_index: usize,
        kind: CollisionKind,
    ) -> CollisionPoint {
        CollisionPoint {
            x: p.x,
            y: p.y,
            z: p.z,
            severity: self.severity(&p),
            path_index,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use approx::assert_relative_eq;

    /// Closed unit-ish box [0,10]^3 as 12 triangles
    fn cube() -> Mesh {
        let v = vec![
            0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 0.0, //
            0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0, 10.0, 10.0,
        ];
        let i = vec![
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            2, 3, 7, 2, 7, 6, // back
            1, 2, 6, 1, 6, 5, // right
            0, 4, 7, 0, 7, 3, // left
        ];
        Mesh::new(v, Some(i))
    }

    #[test]
    fn test_path_around_cube_is_clear() {
        let mesh = cube();
        let detector = CollisionDetector::new(&mesh.view(), &EngineConfig::default());
        assert!(!detector.is_fallback());

        let path = [
            PathSample::new(-5.0, -5.0, 5.0),
            PathSample::new(15.0, -5.0, 5.0),
            PathSample::new(15.0, 15.0, 5.0),
        ];
        let result = detector.detect(&path);
        assert!(!result.has_collision);
        assert_eq!(result.collision_count, 0);
    }

    #[test]
    fn test_segment_through_cube() {
        let mesh = cube();
        let detector = CollisionDetector::new(&mesh.view(), &EngineConfig::default());
        let path = [PathSample::new(-5.0, 5.0, 5.0), PathSample::new(15.0, 5.0, 5.0)];

        let result = detector.detect(&path);
        assert_eq!(result.collision_count, 1);
        let hit = result.collisions[0];
        assert_eq!(hit.kind, CollisionKind::Segment);
        assert_eq!(hit.path_index, 0);
        assert_relative_eq!(hit.x, 0.0, epsilon = 1e-6);
        assert!(hit.severity > 0.0 && hit.severity <= 1.0);
    }

    #[test]
    fn test_point_then_segment_ordering() {
        let mesh = cube();
        let detector = CollisionDetector::new(&mesh.view(), &EngineConfig::default());
        // Waypoint 1 sits on the bottom face; both segments touch it
        let path = [
            PathSample::new(5.0, 5.0, -5.0),
            PathSample::new(5.0, 5.0, 0.0),
            PathSample::new(5.0, 5.0, -8.0),
        ];

        let result = detector.detect(&path);
        let shape: Vec<_> = result.collisions.iter().map(|c| (c.path_index, c.kind)).collect();
        assert_eq!(
            shape,
            vec![
                (0, CollisionKind::Segment),
                (1, CollisionKind::Point),
                (1, CollisionKind::Segment),
            ]
        );
    }

    #[test]
    fn test_severity_falls_off_with_distance() {
        let mesh = cube();
        let detector = CollisionDetector::new(&mesh.view(), &EngineConfig::default());
        assert_relative_eq!(detector.severity(&Point3::new(5.0, 5.0, 5.0)), 1.0);
        assert_eq!(detector.severity(&Point3::new(500.0, 5.0, 5.0)), 0.0);
        let mid = detector.severity(&Point3::new(0.0, 5.0, 5.0));
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_severity_on_flat_mesh_uses_real_bounds() {
        // 10x10 floor at z = 0; the grid widens its flat axis but severity must not
        let floor = Mesh::new(
            vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 0.0],
            Some(vec![0, 1, 2, 0, 2, 3]),
        );
        let detector = CollisionDetector::new(&floor.view(), &EngineConfig::default());
        assert!(!detector.is_fallback());

        assert_relative_eq!(detector.severity(&Point3::new(5.0, 5.0, 0.0)), 1.0);
        let diagonal = 200.0_f64.sqrt();
        assert_relative_eq!(
            detector.severity(&Point3::new(10.0, 10.0, 0.0)),
            1.0 - (50.0_f64.sqrt() / diagonal),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_fallback_for_tiny_mesh() {
        // Two vertices: no triangle can be formed
        let mesh = Mesh::soup(vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0]);
        let detector = CollisionDetector::new(&mesh.view(), &EngineConfig::default());
        assert!(detector.is_fallback());
        assert!(detector.grid().is_none());

        assert!(detector.point_collides(&Point3::new(1.0, 1.0, 1.0)));
        // Margin is max(0.5, 5% of diagonal) = 0.5
        assert!(detector
            .segment_hit(&Point3::new(-0.4, -5.0, 1.0), &Point3::new(-0.4, 5.0, 1.0))
            .is_some());
        assert!(detector
            .segment_hit(&Point3::new(-0.6, -5.0, 1.0), &Point3::new(-0.6, 5.0, 1.0))
            .is_none());
    }

    #[test]
    fn test_empty_mesh_reports_nothing() {
        let mesh = Mesh::default();
        let detector = CollisionDetector::new(&mesh.view(), &EngineConfig::default());
        let path = [PathSample::new(0.0, 0.0, 0.0), PathSample::new(1.0, 0.0, 0.0)];
        assert_eq!(detector.detect(&path), CollisionResult::empty());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = CollisionResult::from_collisions(vec![CollisionPoint {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            severity: 0.5,
            path_index: 4,
            kind: CollisionKind::Segment,
        }]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["collisionCount"], 1);
        assert_eq!(json["hasCollision"], true);
        assert_eq!(json["collisions"][0]["pathIndex"], 4);
        assert_eq!(json["collisions"][0]["kind"], "segment");
    }
}
