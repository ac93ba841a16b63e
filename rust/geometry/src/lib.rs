// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inspect-Lite Geometry
//!
//! Visibility and collision geometry for drone inspection paths flown around a
//! triangle mesh. Given a path of camera viewpoints this crate determines which
//! faces each viewpoint sees inside a finite viewing pyramid, accumulates
//! per-face coverage across the path, and detects path segments that run into
//! the mesh through a voxel occupancy grid.
//!
//! Meshes are borrowed as flat buffers ([`MeshView`]); every entry point is a
//! pure function of its inputs so the browser viewer and the backend service
//! get identical results.

pub mod clipping;
pub mod collision;
pub mod config;
pub mod coverage;
pub mod error;
pub mod mesh;
pub mod pyramid;
pub mod raycast;
pub mod triangle;
pub mod visibility;
pub mod voxel;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use clipping::{ClippingProcessor, Plane, Polygon};
pub use collision::{CollisionDetector, CollisionKind, CollisionPoint, CollisionResult};
pub use config::EngineConfig;
pub use coverage::{CoverageEngine, CoverageMetrics, FaceCoverage, WaypointMetrics};
pub use error::{Error, Result};
pub use mesh::{Mesh, MeshView};
pub use pyramid::{PathSample, Pyramid, Viewpoint};
pub use raycast::{ray_triangle_intersect, DepthEstimator};
pub use triangle::{Aabb, Triangle};
pub use visibility::VisibilityClassifier;
pub use voxel::{VoxelCell, VoxelGrid, VoxelTraversal};
