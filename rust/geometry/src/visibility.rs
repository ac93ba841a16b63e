// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visibility classification
//!
//! A face is visible from a viewpoint when it reaches into the viewing
//! pyramid and faces the camera. Per triangle:
//!
//! 1. Broad phase: reject when its AABB misses the (padded) pyramid AABB.
//! 2. Fast accept: centroid inside one of the two tetrahedra of the pyramid.
//! 3. Exact test: Sutherland–Hodgman clip against the five pyramid planes.
//! 4. Facing: `dot(normal, centroid → eye) >= facing_tolerance`.

use crate::clipping::{ClippingProcessor, Plane};
use crate::config::DEFAULT_FACING_TOLERANCE;
use crate::mesh::MeshView;
use crate::pyramid::Pyramid;
use crate::triangle::{Aabb, Triangle};
use nalgebra::Point3;

/// Padding applied to the pyramid AABB in the broad phase
pub const PYRAMID_AABB_PADDING: f64 = 1e-6;

/// Per-triangle visibility test against a viewing pyramid
#[derive(Debug, Clone, Copy)]
pub struct VisibilityClassifier {
    facing_tolerance: f64,
    clipper: ClippingProcessor,
}

impl Default for VisibilityClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FACING_TOLERANCE)
    }
}

/// Pyramid data shared by every triangle test of one viewpoint
#[derive(Debug, Clone, Copy)]
pub struct PreparedPyramid {
    pub pyramid: Pyramid,
    pub planes: [Plane; 5],
    pub bounds: Aabb,
}

impl PreparedPyramid {
    /// `None` for a zero-volume pyramid, which sees nothing
    pub fn new(pyramid: Pyramid) -> Option<Self> {
        Some(Self {
            pyramid,
            planes: pyramid.planes()?,
            bounds: pyramid.aabb().expand(PYRAMID_AABB_PADDING),
        })
    }
}

impl VisibilityClassifier {
    pub fn new(facing_tolerance: f64) -> Self {
        Self {
            facing_tolerance,
            clipper: ClippingProcessor::new(),
        }
    }

    #[inline]
    pub fn facing_tolerance(&self) -> f64 {
        self.facing_tolerance
    }

    /// Does the triangle reach into the pyramid volume?
    pub fn intersects(&self, tri: &Triangle, prepared: &PreparedPyramid) -> bool {
        if !tri.aabb().intersects(&prepared.bounds) {
            return false;
        }
        prepared.pyramid.contains_point(&tri.centroid())
            || self.clipper.intersects_convex(tri, &prepared.planes)
    }

    /// Does the triangle face the eye (within the tolerance)?
    ///
    /// Degenerate triangles have no normal and never face anything.
    pub fn faces_eye(&self, tri: &Triangle, eye: &Point3<f64>) -> bool {
        let Some(normal) = tri.unit_normal() else {
            return false;
        };
        let to_eye = eye - tri.centroid();
        match to_eye.try_normalize(1e-12) {
            Some(view_dir) => normal.dot(&view_dir) >= self.facing_tolerance,
            // Eye on the centroid: treat as head-on
            None => true,
        }
    }

    /// Full classification of one triangle
    #[inline]
    pub fn is_visible(
        &self,
        tri: &Triangle,
        prepared: &PreparedPyramid,
        eye: &Point3<f64>,
    ) -> bool {
        self.intersects(tri, prepared) && self.faces_eye(tri, eye)
    }

    /// Indices of all visible faces, ascending
    pub fn visible_faces(
        &self,
        pyramid: &Pyramid,
        mesh: &MeshView<'_>,
        eye: &Point3<f64>,
    ) -> Vec<u32> {
        let Some(prepared) = PreparedPyramid::new(*pyramid) else {
            return Vec::new();
        };
        mesh.triangles()
            .filter(|(_, tri)| self.is_visible(tri, &prepared, eye))
            .map(|(face, _)| face)
            .collect()
    }
}
