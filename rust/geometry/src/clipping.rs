// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-space clipping
//!
//! Sutherland–Hodgman clipping of convex polygons against oriented planes,
//! used to decide whether a triangle reaches into a convex volume.

use crate::triangle::Triangle;
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

/// Clipped polygon. A triangle clipped by five planes has at most 8 vertices.
pub type Polygon = SmallVec<[Point3<f64>; 8]>;

/// Default tolerance for plane side classification
pub const CLIP_EPSILON: f64 = 1e-9;

/// Oriented plane: points with `dot(normal, p) + offset >= 0` are inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal pointing into the inside half-space
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    /// Create a plane through `point` with the given normal.
    /// Returns `None` for a near-zero normal.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let normal = normal.try_normalize(1e-12)?;
        Some(Self {
            normal,
            offset: -normal.dot(&point.coords),
        })
    }

    /// Plane through three points, normal = (b - a) × (c - a)
    pub fn from_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Option<Self> {
        Self::new(a, (b - a).cross(&(c - a)))
    }

    /// Flip the plane if needed so that `interior` lies on the inside
    pub fn oriented_toward(self, interior: &Point3<f64>) -> Self {
        if self.signed_distance(interior) < 0.0 {
            Self {
                normal: -self.normal,
                offset: -self.offset,
            }
        } else {
            self
        }
    }

    /// Calculate signed distance from point to plane.
    /// Positive = inside, Negative = outside
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    #[inline]
    pub fn is_inside(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point) >= 0.0
    }
}

/// Polygon clipping processor
#[derive(Debug, Clone, Copy)]
pub struct ClippingProcessor {
    /// Epsilon for side classification and near-parallel edges
    pub epsilon: f64,
}

impl Default for ClippingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClippingProcessor {
    /// Create a new clipping processor
    pub fn new() -> Self {
        Self {
            epsilon: CLIP_EPSILON,
        }
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Clip a polygon against one plane, keeping the inside part.
    ///
    /// Vertices within `epsilon` of the plane count as inside, so a triangle
    /// touching the volume boundary survives.
    pub fn clip_polygon(&self, polygon: &[Point3<f64>], plane: &Plane) -> Polygon {
        let mut output = Polygon::new();
        let n = polygon.len();
        if n == 0 {
            return output;
        }

        for i in 0..n {
            let current = polygon[i];
            let next = polygon[(i + 1) % n];
            let d_current = plane.signed_distance(&current);
            let d_next = plane.signed_distance(&next);
            let current_inside = d_current >= -self.epsilon;
            let next_inside = d_next >= -self.epsilon;

            if current_inside {
                output.push(current);
            }

            if current_inside != next_inside {
                let denom = d_current - d_next;
                if denom.abs() > self.epsilon {
                    let t = d_current / denom;
                    output.push(current + (next - current) * t);
                }
            }
        }

        output
    }

    /// Test whether a triangle reaches into the convex volume bounded by
    /// `planes` (intersection of their inside half-spaces)
    pub fn intersects_convex(&self, triangle: &Triangle, planes: &[Plane]) -> bool {
        let mut polygon: Polygon = triangle.vertices().into_iter().collect();
        for plane in planes {
            polygon = self.clip_polygon(&polygon, plane);
            if polygon.is_empty() {
                return false;
            }
        }
        true
    }
}
