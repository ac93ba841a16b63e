// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! Meshes arrive as flat buffers from the model loader: `vertices` holds
//! `x, y, z` triples and the optional `indices` buffer holds one `u32` triple
//! per face. Without indices the mesh is a triangle soup where face `i`
//! occupies `vertices[9i..9i + 9]`.

use crate::triangle::{Aabb, Triangle};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Owned triangle mesh in flat-buffer form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    #[serde(default)]
    pub vertices: Vec<f64>,
    /// Triangle indices (i0, i1, i2), absent for triangle soups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<u32>>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<f64>, indices: Option<Vec<u32>>) -> Self {
        Self { vertices, indices }
    }

    /// Create an unindexed triangle soup
    pub fn soup(vertices: Vec<f64>) -> Self {
        Self {
            vertices,
            indices: None,
        }
    }

    /// Borrow the mesh for engine calls
    #[inline]
    pub fn view(&self) -> MeshView<'_> {
        MeshView::new(&self.vertices, self.indices.as_deref())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }
}

/// Borrowed view over flat mesh buffers. All engine code works on this.
#[derive(Debug, Clone, Copy)]
pub struct MeshView<'a> {
    vertices: &'a [f64],
    indices: Option<&'a [u32]>,
}

impl<'a> MeshView<'a> {
    pub fn new(vertices: &'a [f64], indices: Option<&'a [u32]>) -> Self {
        Self { vertices, indices }
    }

    /// Raw vertex buffer
    #[inline]
    pub fn vertices(&self) -> &'a [f64] {
        self.vertices
    }

    /// Raw index buffer
    #[inline]
    pub fn indices(&self) -> Option<&'a [u32]> {
        self.indices
    }

    /// Get vertex count (trailing partial triples are ignored)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Get face count
    #[inline]
    pub fn face_count(&self) -> usize {
        match self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Check if mesh has no usable vertex
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Vertex position, `None` if out of range
    #[inline]
    pub fn vertex(&self, index: usize) -> Option<Point3<f64>> {
        let base = index.checked_mul(3)?;
        let chunk = self.vertices.get(base..base + 3)?;
        Some(Point3::new(chunk[0], chunk[1], chunk[2]))
    }

    /// Triangle for a face, `None` when the index buffer references a vertex
    /// that does not exist
    #[inline]
    pub fn triangle(&self, face: usize) -> Option<Triangle> {
        let [i0, i1, i2] = match self.indices {
            Some(indices) => {
                let tri = indices.get(face * 3..face * 3 + 3)?;
                [tri[0] as usize, tri[1] as usize, tri[2] as usize]
            }
            None => [face * 3, face * 3 + 1, face * 3 + 2],
        };
        Some(Triangle::new(
            self.vertex(i0)?,
            self.vertex(i1)?,
            self.vertex(i2)?,
        ))
    }

    /// Iterate valid faces as `(face_index, triangle)`, skipping faces with
    /// out-of-range indices
    pub fn triangles(&self) -> impl Iterator<Item = (u32, Triangle)> + 'a {
        let view = *self;
        (0..view.face_count()).filter_map(move |face| {
            view.triangle(face).map(|tri| (face as u32, tri))
        })
    }

    /// Calculate bounds over all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let mut chunks = self.vertices.chunks_exact(3);
        let first = chunks.next()?;
        let mut aabb = Aabb::new(
            Point3::new(first[0], first[1], first[2]),
            Point3::new(first[0], first[1], first[2]),
        );
        chunks.for_each(|chunk| aabb.include(&Point3::new(chunk[0], chunk[1], chunk[2])));
        Some(aabb)
    }

    /// Average of all vertex positions, `None` for an empty mesh
    pub fn centroid(&self) -> Option<Point3<f64>> {
        let count = self.vertex_count();
        if count == 0 {
            return None;
        }

        let sum = self
            .vertices
            .chunks_exact(3)
            .fold(Vector3::<f64>::zeros(), |acc, chunk| {
                acc + Vector3::new(chunk[0], chunk[1], chunk[2])
            });

        Some(Point3::from(sum / count as f64))
    }

    /// Per-face areas indexed by face; invalid faces get 0
    pub fn face_areas(&self) -> Vec<f64> {
        (0..self.face_count())
            .map(|face| self.triangle(face).map(|tri| tri.area()).unwrap_or(0.0))
            .collect()
    }

    /// Sum of all valid face areas
    pub fn total_area(&self) -> f64 {
        self.triangles().fold(0.0, |acc, (_, tri)| acc + tri.area())
    }
}

impl<'a> From<&'a Mesh> for MeshView<'a> {
    fn from(mesh: &'a Mesh) -> Self {
        mesh.view()
    }
}
