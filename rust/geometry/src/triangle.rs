// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle and axis-aligned bounding box primitives

use nalgebra::{Point3, Vector3};

/// Triangle definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal (edge1 × edge2), length = 2 × area
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2)
    }

    /// Unit face normal, `None` for degenerate (collinear) triangles
    #[inline]
    pub fn unit_normal(&self) -> Option<Vector3<f64>> {
        self.normal().try_normalize(1e-12)
    }

    /// Triangle area. Independent of winding order.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&[self.v0, self.v1, self.v2]).unwrap_or_default()
    }

    #[inline]
    pub fn vertices(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set, `None` if the set is empty
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for p in rest {
            aabb.include(p);
        }
        Some(aabb)
    }

    /// Grow the box to contain `p`
    #[inline]
    pub fn include(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand AABB by a margin on every side
    #[inline]
    pub fn expand(&self, margin: f64) -> Self {
        let pad = Vector3::repeat(margin);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Overlap test (touching boxes intersect)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    #[inline]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Length of the box diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.extent().norm()
    }

    /// Euclidean distance from `p` to the box (0 inside)
    pub fn distance_to_point(&self, p: &Point3<f64>) -> f64 {
        let dx = (self.min.x - p.x).max(0.0).max(p.x - self.max.x);
        let dy = (self.min.y - p.y).max(0.0).max(p.y - self.max.y);
        let dz = (self.min.z - p.z).max(0.0).max(p.z - self.max.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Slab test for the ray `origin + t·direction`.
    ///
    /// Returns the parametric interval `(t_enter, t_exit)` clipped to `t >= 0`,
    /// or `None` when the ray misses the box or the box lies behind the origin.
    pub fn ray_intersect(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<(f64, f64)> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-12 {
                // Parallel to the slab: must already be inside it
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some((t_min.max(0.0), t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triangle_area() {
        let triangle = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        );
        assert_relative_eq!(triangle.area(), 50.0);
    }

    #[test]
    fn test_area_ignores_winding() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, -1.0, 0.5);
        let c = Point3::new(-2.0, 0.0, 7.0);
        assert_relative_eq!(Triangle::new(a, b, c).area(), Triangle::new(a, c, b).area());
    }

    #[test]
    fn test_unit_normal_and_degenerate() {
        let triangle = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let n = triangle.unit_normal().unwrap();
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);

        let collinear = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert!(collinear.unit_normal().is_none());
        assert_eq!(collinear.area(), 0.0);
    }

    #[test]
    fn test_aabb_intersects_and_contains() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 0.5, 0.5), Point3::new(2.0, 2.0, 2.0));
        let c = Aabb::new(Point3::new(1.5, 1.5, 1.5), Point3::new(2.0, 2.0, 2.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(&Point3::new(0.5, 0.5, 0.5)));
        assert!(!a.contains(&Point3::new(1.5, 0.5, 0.5)));
    }

    #[test]
    fn test_aabb_ray_intersect() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));

        let hit = aabb.ray_intersect(&Point3::new(-5.0, 0.0, 0.0), &Vector3::x());
        let (t0, t1) = hit.unwrap();
        assert_relative_eq!(t0, 4.0);
        assert_relative_eq!(t1, 6.0);

        // Pointing away
        assert!(aabb.ray_intersect(&Point3::new(-5.0, 0.0, 0.0), &-Vector3::x()).is_none());
        // Parallel outside slab
        assert!(aabb.ray_intersect(&Point3::new(-5.0, 3.0, 0.0), &Vector3::x()).is_none());
        // Origin inside
        let (t0, _) = aabb.ray_intersect(&Point3::origin(), &Vector3::z()).unwrap();
        assert_eq!(t0, 0.0);
    }

    #[test]
    fn test_aabb_distance_to_point() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.distance_to_point(&Point3::new(0.5, 0.5, 0.5)), 0.0);
        assert_relative_eq!(aabb.distance_to_point(&Point3::new(4.0, 0.5, 0.5)), 3.0);
    }
}
