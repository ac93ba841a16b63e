// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewpoints and finite viewing pyramids
//!
//! A viewpoint sees a 4-sided pyramid: the apex sits at the camera position,
//! the rectangular base lies `depth` units along the view direction and is
//! sized by the horizontal and vertical field of view.

use crate::clipping::Plane;
use crate::triangle::Aabb;
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vectors shorter than this are treated as zero
pub const DIRECTION_EPSILON: f64 = 1e-6;
/// If |dot(direction, +Y)| exceeds this, +Z is used as the world-up reference
pub const WORLD_UP_COS_LIMIT: f64 = 0.98;
/// Slack on barycentric weights for the tetrahedron containment test
pub const BARYCENTRIC_EPSILON: f64 = 1e-9;
/// Determinants below this mark a degenerate tetrahedron
pub const DETERMINANT_EPSILON: f64 = 1e-18;

/// Direction used when neither the sample nor the caller supplies one
pub fn default_direction() -> Vector3<f64> {
    -Vector3::z()
}

/// Camera viewpoint: position plus unit view direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Point3<f64>,
    /// Unit view direction
    pub direction: Vector3<f64>,
    /// Optional camera up vector; derived from a world-up reference when absent
    pub up: Option<Vector3<f64>>,
}

impl Viewpoint {
    /// Create a viewpoint, normalizing `direction`.
    ///
    /// A near-zero direction is replaced by `fallback`, and a near-zero
    /// fallback by [`default_direction`].
    pub fn new(position: Point3<f64>, direction: Vector3<f64>, fallback: Vector3<f64>) -> Self {
        let direction = direction
            .try_normalize(DIRECTION_EPSILON)
            .or_else(|| fallback.try_normalize(DIRECTION_EPSILON))
            .unwrap_or_else(default_direction);
        Self {
            position,
            direction,
            up: None,
        }
    }

    pub fn with_up(mut self, up: Vector3<f64>) -> Self {
        self.up = Some(up);
        self
    }
}

/// One sample of an imported flight path
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_z: Option<f64>,
}

impl PathSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    pub fn with_normal(mut self, nx: f64, ny: f64, nz: f64) -> Self {
        self.normal_x = Some(nx);
        self.normal_y = Some(ny);
        self.normal_z = Some(nz);
        self
    }

    #[inline]
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Camera normal if all three components are present and non-degenerate
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = Vector3::new(self.normal_x?, self.normal_y?, self.normal_z?);
        (n.norm() > DIRECTION_EPSILON).then_some(n)
    }

    /// Resolve the sample into a viewpoint.
    ///
    /// The sample normal is used as view direction when present; otherwise
    /// the camera looks at `target` (normally the mesh centroid).
    pub fn to_viewpoint(&self, target: Option<Point3<f64>>) -> Viewpoint {
        let position = self.position();
        let toward_target = target
            .map(|t| t - position)
            .unwrap_or_else(Vector3::zeros);
        match self.normal() {
            Some(normal) => Viewpoint::new(position, normal, toward_target),
            None => Viewpoint::new(position, toward_target, default_direction()),
        }
    }
}

/// Finite 4-sided viewing pyramid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pyramid {
    pub apex: Point3<f64>,
    /// Base corners in rotational order
    pub base: [Point3<f64>; 4],
}

impl Pyramid {
    /// Build the pyramid for a camera.
    ///
    /// # Arguments
    /// * `position` - Apex / camera position
    /// * `direction` - View direction (normalized here)
    /// * `up` - Optional camera up; ignored when parallel to `direction`
    /// * `vertical_fov` / `horizontal_fov` - Field of view in degrees
    /// * `depth` - Distance from apex to base
    pub fn build(
        position: Point3<f64>,
        direction: Vector3<f64>,
        up: Option<Vector3<f64>>,
        vertical_fov: f64,
        horizontal_fov: f64,
        depth: f64,
    ) -> Self {
        let direction = direction
            .try_normalize(DIRECTION_EPSILON)
            .unwrap_or_else(default_direction);

        let right = up
            .and_then(|u| direction.cross(&u).try_normalize(DIRECTION_EPSILON))
            .unwrap_or_else(|| {
                let world_up = if direction.dot(&Vector3::y()).abs() > WORLD_UP_COS_LIMIT {
                    Vector3::z()
                } else {
                    Vector3::y()
                };
                direction
                    .cross(&world_up)
                    .try_normalize(DIRECTION_EPSILON)
                    .unwrap_or_else(Vector3::x)
            });
        let up = right.cross(&direction).normalize();

        let center = position + direction * depth;
        let half_w = (horizontal_fov.to_radians() * 0.5).tan() * depth;
        let half_l = (vertical_fov.to_radians() * 0.5).tan() * depth;
        let r = right * half_w;
        let u = up * half_l;

        Self {
            apex: position,
            base: [center + r + u, center - r + u, center - r - u, center + r - u],
        }
    }

    /// Build the pyramid for a viewpoint
    pub fn for_viewpoint(
        viewpoint: &Viewpoint,
        vertical_fov: f64,
        horizontal_fov: f64,
        depth: f64,
    ) -> Self {
        Self::build(
            viewpoint.position,
            viewpoint.direction,
            viewpoint.up,
            vertical_fov,
            horizontal_fov,
            depth,
        )
    }

    /// Apex followed by the four base corners
    pub fn vertices(&self) -> [Point3<f64>; 5] {
        [self.apex, self.base[0], self.base[1], self.base[2], self.base[3]]
    }

    /// Mean of the five vertices; strictly inside for a non-degenerate pyramid
    pub fn interior_point(&self) -> Point3<f64> {
        let sum = self
            .vertices()
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / 5.0)
    }

    /// Four side planes and the base plane, oriented toward the interior.
    /// `None` for a zero-volume pyramid.
    pub fn planes(&self) -> Option<[Plane; 5]> {
        let interior = self.interior_point();
        let b = &self.base;
        let side = |i: usize| {
            Plane::from_points(self.apex, b[i], b[(i + 1) % 4])
                .map(|p| p.oriented_toward(&interior))
        };
        let base = Plane::from_points(b[0], b[1], b[2])?.oriented_toward(&interior);
        Some([side(0)?, side(1)?, side(2)?, side(3)?, base])
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices()).unwrap_or_default()
    }

    /// Point containment through the two tetrahedra (apex, b0, b1, b2) and
    /// (apex, b0, b2, b3) that split the pyramid
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        let b = &self.base;
        point_in_tetrahedron(p, &self.apex, &b[0], &b[1], &b[2])
            || point_in_tetrahedron(p, &self.apex, &b[0], &b[2], &b[3])
    }
}

/// Barycentric point-in-tetrahedron test solved with Cramer's rule
pub fn point_in_tetrahedron(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> bool {
    let e1 = b - a;
    let e2 = c - a;
    let e3 = d - a;
    let rhs = p - a;

    let det = Matrix3::from_columns(&[e1, e2, e3]).determinant();
    if det.abs() < DETERMINANT_EPSILON {
        return false;
    }

    let u = Matrix3::from_columns(&[rhs, e2, e3]).determinant() / det;
    let v = Matrix3::from_columns(&[e1, rhs, e3]).determinant() / det;
    let w = Matrix3::from_columns(&[e1, e2, rhs]).determinant() / det;

    u >= -BARYCENTRIC_EPSILON
        && v >= -BARYCENTRIC_EPSILON
        && w >= -BARYCENTRIC_EPSILON
        && u + v + w <= 1.0 + BARYCENTRIC_EPSILON
}
