// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray casting against the mesh
//!
//! Used to pick a per-viewpoint pyramid depth: the nearest surface along the
//! view direction, or a fallback depth when the ray hits nothing.

use crate::mesh::MeshView;
use crate::pyramid::Viewpoint;
use crate::triangle::{Aabb, Triangle};
use nalgebra::{Point3, Vector3};

/// Determinant threshold below which the ray is parallel to the triangle
pub const PARALLEL_EPSILON: f64 = 1e-12;
/// Hits closer than this are treated as self-intersection noise
pub const MIN_HIT_DISTANCE: f64 = 1e-6;

/// Möller–Trumbore ray-triangle intersection.
///
/// Returns the ray parameter `t` of the hit (any sign), or `None` when the
/// ray is parallel to the triangle or misses it.
#[allow(clippy::many_single_char_names)]
pub fn ray_triangle_intersect(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    tri: &Triangle,
) -> Option<f64> {
    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;

    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - tri.v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    Some(f * edge2.dot(&q))
}

/// Picks a pyramid depth per viewpoint
#[derive(Debug, Clone, Copy)]
pub struct DepthEstimator {
    bounds: Option<Aabb>,
    fallback_depth: f64,
}

impl DepthEstimator {
    /// Create an estimator for a mesh; the mesh bounds are cached for the
    /// slab pre-check
    pub fn new(mesh: &MeshView<'_>, fallback_depth: f64) -> Self {
        Self {
            bounds: mesh.bounds(),
            fallback_depth,
        }
    }

    #[inline]
    pub fn fallback_depth(&self) -> f64 {
        self.fallback_depth
    }

    /// Nearest face hit strictly in front of `origin`, as `(face, t)`
    pub fn first_hit(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        mesh: &MeshView<'_>,
    ) -> Option<(u32, f64)> {
        let bounds = self.bounds?;
        bounds.ray_intersect(origin, direction)?;

        mesh.triangles()
            .filter_map(|(face, tri)| {
                ray_triangle_intersect(origin, direction, &tri)
                    .filter(|t| *t > MIN_HIT_DISTANCE)
                    .map(|t| (face, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Depth for a viewpoint: distance to the nearest hit along the view
    /// direction, or the fallback depth
    pub fn estimate(&self, viewpoint: &Viewpoint, mesh: &MeshView<'_>) -> f64 {
        self.first_hit(&viewpoint.position, &viewpoint.direction, mesh)
            .map(|(_, t)| t * viewpoint.direction.norm())
            .unwrap_or(self.fallback_depth)
    }
}
