// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Voxel occupancy grid
//!
//! A fixed `R×R×R` grid of occupancy flags over the mesh bounding box. Each
//! triangle marks every cell its AABB touches (conservative rasterization).
//! Segments are walked through the grid with the Amanatides & Woo 3D DDA, so
//! the cost of a query depends on the cells crossed, not on the triangle count.

use crate::mesh::MeshView;
use crate::triangle::Aabb;
use nalgebra::{Point3, Vector3};

/// Keeps the far face of the bounds inside the last cell
pub const CELL_MAPPING_EPSILON: f64 = 1e-9;
/// Axis extents below this are treated as 1
pub const DEGENERATE_EXTENT: f64 = 1e-9;
/// Segments shorter than this are treated as points
pub const MIN_SEGMENT_LENGTH: f64 = 1e-12;
/// Direction components below this (in cell units) never cross a boundary
const PARALLEL_EPSILON: f64 = 1e-15;

/// Integer cell coordinate inside a [`VoxelGrid`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VoxelCell {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl VoxelCell {
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

/// Occupancy flags over an axis-aligned box, built once and read-only afterward
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    origin: Point3<f64>,
    /// Per-axis extent, degenerate axes clamped to 1
    extent: Vector3<f64>,
    resolution: usize,
    /// One bit per cell, x fastest
    bits: Vec<u64>,
    occupied: usize,
}

impl VoxelGrid {
    /// Empty grid over `bounds` with `resolution` cells per axis
    pub fn empty(bounds: Aabb, resolution: usize) -> Self {
        let resolution = resolution.max(1);
        let raw = bounds.extent();
        let clamp = |e: f64| if e.abs() < DEGENERATE_EXTENT { 1.0 } else { e };
        let cells = resolution * resolution * resolution;

        Self {
            origin: bounds.min,
            extent: Vector3::new(clamp(raw.x), clamp(raw.y), clamp(raw.z)),
            resolution,
            bits: vec![0; cells.div_ceil(64)],
            occupied: 0,
        }
    }

    /// Voxelize a mesh: every valid triangle marks the cells covered by its AABB.
    ///
    /// Returns `None` when the mesh has no valid triangle.
    pub fn build(mesh: &MeshView<'_>, resolution: usize) -> Option<Self> {
        let bounds = mesh.bounds()?;
        let mut grid = Self::empty(bounds, resolution);
        let mut triangles = 0usize;

        for (_, tri) in mesh.triangles() {
            let aabb = tri.aabb();
            grid.mark_region(&aabb.min, &aabb.max);
            triangles += 1;
        }

        if triangles == 0 {
            return None;
        }

        tracing::debug!(
            resolution = grid.resolution,
            triangles,
            occupied = grid.occupied,
            "Voxel grid built"
        );
        Some(grid)
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Bounds of the grid (degenerate axes widened to 1)
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.origin, self.origin + self.extent)
    }

    /// Number of occupied cells
    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Mark every cell overlapping the box `[min, max]`
    pub fn mark_region(&mut self, min: &Point3<f64>, max: &Point3<f64>) {
        let lo = self.clamped_cell(min);
        let hi = self.clamped_cell(max);

        for z in lo[2].min(hi[2])..=lo[2].max(hi[2]) {
            for y in lo[1].min(hi[1])..=lo[1].max(hi[1]) {
                for x in lo[0].min(hi[0])..=lo[0].max(hi[0]) {
                    self.set(VoxelCell::new(x, y, z));
                }
            }
        }
    }

    /// Cell containing `point`, `None` outside the grid
    pub fn cell_of(&self, point: &Point3<f64>) -> Option<VoxelCell> {
        let g = self.to_grid(point);
        let r = self.resolution as f64;
        if (0..3).any(|a| !(g[a] >= 0.0 && g[a].floor() < r)) {
            return None;
        }
        Some(VoxelCell::new(
            g[0].floor() as usize,
            g[1].floor() as usize,
            g[2].floor() as usize,
        ))
    }

    #[inline]
    pub fn is_cell_occupied(&self, cell: VoxelCell) -> bool {
        if cell.x >= self.resolution || cell.y >= self.resolution || cell.z >= self.resolution {
            return false;
        }
        let index = self.index(cell);
        self.bits[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Point test; points outside the grid are never occupied
    pub fn is_occupied(&self, point: &Point3<f64>) -> bool {
        self.cell_of(point)
            .is_some_and(|cell| self.is_cell_occupied(cell))
    }

    /// Cells crossed by the segment `start → end`, with the distance from
    /// `start` at which each is entered
    pub fn traverse(&self, start: &Point3<f64>, end: &Point3<f64>) -> VoxelTraversal {
        VoxelTraversal::new(self, start, end)
    }

    /// Entry point of the first occupied cell along `start → end`
    pub fn segment_hit(&self, start: &Point3<f64>, end: &Point3<f64>) -> Option<Point3<f64>> {
        let segment = end - start;
        let length = segment.norm();

        let (_, t) = self
            .traverse(start, end)
            .find(|(cell, _)| self.is_cell_occupied(*cell))?;

        if length < MIN_SEGMENT_LENGTH {
            return Some(*start);
        }
        Some(start + segment * (t / length))
    }

    /// Does the segment cross any occupied cell?
    #[inline]
    pub fn segment_collides(&self, start: &Point3<f64>, end: &Point3<f64>) -> bool {
        self.segment_hit(start, end).is_some()
    }

    /// World point → continuous cell coordinates:
    /// `(p - min) / extent * (R - ε)` per axis
    fn to_grid(&self, p: &Point3<f64>) -> [f64; 3] {
        let scale = self.resolution as f64 - CELL_MAPPING_EPSILON;
        let rel = p - self.origin;
        [
            rel.x / self.extent.x * scale,
            rel.y / self.extent.y * scale,
            rel.z / self.extent.z * scale,
        ]
    }

    fn clamped_cell(&self, p: &Point3<f64>) -> [usize; 3] {
        let max = (self.resolution - 1) as f64;
        self.to_grid(p).map(|g| {
            if g.is_nan() {
                0
            } else {
                g.floor().clamp(0.0, max) as usize
            }
        })
    }

    #[inline]
    fn index(&self, cell: VoxelCell) -> usize {
        cell.x + self.resolution * (cell.y + self.resolution * cell.z)
    }

    fn set(&mut self, cell: VoxelCell) {
        let index = self.index(cell);
        let word = &mut self.bits[index / 64];
        let mask = 1u64 << (index % 64);
        if *word & mask == 0 {
            *word |= mask;
            self.occupied += 1;
        }
    }
}

/// Iterator over the cells a segment crosses (3D DDA).
///
/// Yields `(cell, t)` where `t` is the distance from the segment start at which
/// the cell is entered. `t` is strictly increasing and no cell repeats.
/// Traversal runs in cell space, where every cell is a unit cube; a segment is
/// first clipped to the grid box so starts outside the grid are fine.
#[derive(Debug, Clone)]
pub struct VoxelTraversal {
    cell: [i64; 3],
    step: [i64; 3],
    /// Segment parameter (0..1) of the next boundary crossing per axis
    t_max: [f64; 3],
    /// Segment parameter needed to cross one cell per axis
    t_delta: [f64; 3],
    /// Segment parameter where traversal ends
    s_end: f64,
    length: f64,
    resolution: i64,
    last_t: f64,
    pending_first: Option<(VoxelCell, f64)>,
    done: bool,
}

impl VoxelTraversal {
    fn new(grid: &VoxelGrid, start: &Point3<f64>, end: &Point3<f64>) -> Self {
        let resolution = grid.resolution as i64;
        let length = (end - start).norm();
        let mut traversal = Self {
            cell: [0; 3],
            step: [0; 3],
            t_max: [f64::INFINITY; 3],
            t_delta: [f64::INFINITY; 3],
            s_end: 0.0,
            length,
            resolution,
            last_t: 0.0,
            pending_first: None,
            done: true,
        };

        // Zero-length segment: a single point test
        if length < MIN_SEGMENT_LENGTH {
            traversal.pending_first = grid.cell_of(start).map(|cell| (cell, 0.0));
            return traversal;
        }

        let a = grid.to_grid(start);
        let b = grid.to_grid(end);
        let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let r = resolution as f64;

        // Clip s ∈ [0, 1] against the grid box [0, R]^3
        let mut s_enter = 0.0f64;
        let mut s_exit = 1.0f64;
        for axis in 0..3 {
            if d[axis].abs() < PARALLEL_EPSILON {
                if a[axis] < 0.0 || a[axis] >= r {
                    return traversal;
                }
                continue;
            }
            let t1 = -a[axis] / d[axis];
            let t2 = (r - a[axis]) / d[axis];
            s_enter = s_enter.max(t1.min(t2));
            s_exit = s_exit.min(t1.max(t2));
        }
        if s_enter > s_exit {
            return traversal;
        }

        let mut cell = [0i64; 3];
        for axis in 0..3 {
            let e = a[axis] + d[axis] * s_enter;
            // Moving down from an exact boundary starts in the lower cell
            let c = if d[axis] < 0.0 {
                e.ceil() as i64 - 1
            } else {
                e.floor() as i64
            };
            cell[axis] = c.clamp(0, resolution - 1);

            if d[axis].abs() >= PARALLEL_EPSILON {
                traversal.step[axis] = if d[axis] > 0.0 { 1 } else { -1 };
                traversal.t_delta[axis] = 1.0 / d[axis].abs();
                let boundary = if d[axis] > 0.0 {
                    (cell[axis] + 1) as f64
                } else {
                    cell[axis] as f64
                };
                traversal.t_max[axis] = s_enter + (boundary - e) / d[axis];
            }
        }

        traversal.cell = cell;
        traversal.s_end = s_exit;
        traversal.done = false;
        traversal.last_t = s_enter * length;
        traversal.pending_first = Some((to_cell(cell), traversal.last_t));
        traversal
    }
}

#[inline]
fn to_cell(cell: [i64; 3]) -> VoxelCell {
    VoxelCell::new(cell[0] as usize, cell[1] as usize, cell[2] as usize)
}

impl Iterator for VoxelTraversal {
    type Item = (VoxelCell, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.pending_first.take() {
            return Some(first);
        }
        if self.done {
            return None;
        }

        let s = self.t_max.iter().copied().fold(f64::INFINITY, f64::min);
        if !s.is_finite() || s > self.s_end {
            self.done = true;
            return None;
        }

        // Step every axis crossing at `s`; a corner crossing moves diagonally
        for axis in 0..3 {
            if self.t_max[axis] == s {
                self.cell[axis] += self.step[axis];
                self.t_max[axis] += self.t_delta[axis];
            }
        }

        if self.cell.iter().any(|&c| c < 0 || c >= self.resolution) {
            self.done = true;
            return None;
        }

        let mut t = s * self.length;
        if t <= self.last_t {
            t = self.last_t + self.last_t.abs().max(1.0) * f64::EPSILON;
        }
        self.last_t = t;
        Some((to_cell(self.cell), t))
    }
}
