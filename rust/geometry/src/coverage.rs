// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coverage accumulation
//!
//! Runs depth estimation → pyramid construction → visibility for every
//! viewpoint of a path and aggregates the visible faces into per-face hit
//! counts. Covered area counts faces seen at least once, overlap area faces
//! seen at least twice; both are reported as a percentage of the total mesh
//! area.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::mesh::MeshView;
use crate::pyramid::{PathSample, Pyramid, Viewpoint};
use crate::raycast::DepthEstimator;
use crate::visibility::VisibilityClassifier;
use nalgebra::Point3;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Face index → number of viewpoints that saw the face
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceCoverage {
    counts: FxHashMap<u32, u32>,
}

impl FaceCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more sighting of `face`
    #[inline]
    pub fn record(&mut self, face: u32) {
        *self.counts.entry(face).or_insert(0) += 1;
    }

    /// Record the visible-face set of one viewpoint
    pub fn merge_faces(&mut self, faces: &[u32]) {
        for &face in faces {
            self.record(face);
        }
    }

    /// Merge another pass into this one (counts add up)
    pub fn merge(&mut self, other: &FaceCoverage) {
        for (&face, &count) in &other.counts {
            *self.counts.entry(face).or_insert(0) += count;
        }
    }

    #[inline]
    pub fn count(&self, face: u32) -> u32 {
        self.counts.get(&face).copied().unwrap_or(0)
    }

    /// Faces seen at least once
    pub fn covered_faces(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.iter().filter(|(_, &c)| c >= 1).map(|(&f, _)| f)
    }

    /// Faces seen at least twice
    pub fn overlapped_faces(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.iter().filter(|(_, &c)| c >= 2).map(|(&f, _)| f)
    }

    /// Number of distinct faces seen
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts.iter().map(|(&f, &c)| (f, c))
    }
}

/// Area-weighted coverage of a whole path
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMetrics {
    /// Percentage of mesh area seen at least once
    pub coverage: f64,
    /// Percentage of mesh area seen at least twice
    pub overlap: f64,
    pub covered_area: f64,
    pub overlap_area: f64,
}

/// Coverage of a single waypoint. `None` means not computable (no mesh area).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointMetrics {
    pub coverage: Option<f64>,
    pub overlap_with_previous: Option<f64>,
}

/// Coverage computations over one mesh and configuration
#[derive(Debug, Clone)]
pub struct CoverageEngine<'a> {
    mesh: MeshView<'a>,
    config: EngineConfig,
    horizontal_fov: f64,
    face_areas: Vec<f64>,
    total_area: f64,
    centroid: Option<Point3<f64>>,
    depth: DepthEstimator,
    classifier: VisibilityClassifier,
}

impl<'a> CoverageEngine<'a> {
    /// Prepare the engine: per-face areas, total area, centroid and bounds
    /// are computed once here
    pub fn new(mesh: MeshView<'a>, config: EngineConfig) -> Self {
        let config = config.sanitized();
        let face_areas = mesh.face_areas();
        let total_area = face_areas.iter().sum();

        Self {
            mesh,
            config,
            horizontal_fov: config.horizontal_fov(),
            face_areas,
            total_area,
            centroid: mesh.centroid(),
            depth: DepthEstimator::new(&mesh, config.fallback_depth),
            classifier: VisibilityClassifier::new(config.facing_tolerance),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn mesh(&self) -> &MeshView<'a> {
        &self.mesh
    }

    #[inline]
    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Area of one face, 0 for unknown or invalid faces
    #[inline]
    pub fn face_area(&self, face: u32) -> f64 {
        self.face_areas.get(face as usize).copied().unwrap_or(0.0)
    }

    /// Sum of face areas
    pub fn summarize_area(&self, faces: impl IntoIterator<Item = u32>) -> f64 {
        faces
            .into_iter()
            .fold(0.0, |acc, f| acc + self.face_area(f))
    }

    /// Area as a percentage of the total mesh area, clamped to [0, 100]
    pub fn percent_of_total(&self, area: f64) -> f64 {
        if self.total_area <= 0.0 {
            return 0.0;
        }
        (area / self.total_area * 100.0).clamp(0.0, 100.0)
    }

    /// Whether percentages are meaningful for this mesh
    #[inline]
    pub fn has_area(&self) -> bool {
        self.total_area > 0.0
    }

    /// Resolve a path sample; samples without a normal look at the mesh centroid
    pub fn viewpoint_for(&self, sample: &PathSample) -> Viewpoint {
        sample.to_viewpoint(self.centroid)
    }

    /// Viewing pyramid with a depth picked by ray casting
    pub fn pyramid_for(&self, viewpoint: &Viewpoint) -> Pyramid {
        let depth = self.depth.estimate(viewpoint, &self.mesh);
        Pyramid::for_viewpoint(viewpoint, self.config.vertical_fov, self.horizontal_fov, depth)
    }

    /// Faces visible from a viewpoint, ascending
    pub fn visible_faces(&self, viewpoint: &Viewpoint) -> Vec<u32> {
        if self.mesh.face_count() == 0 {
            return Vec::new();
        }
        let pyramid = self.pyramid_for(viewpoint);
        self.classifier
            .visible_faces(&pyramid, &self.mesh, &viewpoint.position)
    }

    /// Visible-face set of every path sample, computed in parallel
    pub fn visible_sets(&self, path: &[PathSample]) -> Vec<Vec<u32>> {
        if self.mesh.face_count() == 0 {
            return vec![Vec::new(); path.len()];
        }
        path.par_iter()
            .map(|sample| self.visible_faces(&self.viewpoint_for(sample)))
            .collect()
    }

    /// Accumulate per-face hit counts over the whole path.
    ///
    /// Viewpoints are processed in parallel; each worker bumps a shared atomic
    /// counter per visible face, so the result does not depend on scheduling.
    pub fn accumulate(&self, path: &[PathSample]) -> FaceCoverage {
        let face_count = self.mesh.face_count();
        if face_count == 0 || path.is_empty() {
            return FaceCoverage::new();
        }

        tracing::debug!(
            viewpoints = path.len(),
            faces = face_count,
            "Accumulating coverage"
        );

        let counts: Vec<AtomicU32> = (0..face_count).map(|_| AtomicU32::new(0)).collect();
        path.par_iter().for_each(|sample| {
            for face in self.visible_faces(&self.viewpoint_for(sample)) {
                counts[face as usize].fetch_add(1, Ordering::Relaxed);
            }
        });

        let counts: FxHashMap<u32, u32> = counts
            .into_iter()
            .enumerate()
            .filter_map(|(face, count)| {
                let count = count.into_inner();
                (count > 0).then_some((face as u32, count))
            })
            .collect();

        tracing::debug!(covered_faces = counts.len(), "Coverage pass complete");
        FaceCoverage { counts }
    }

    /// Area-weighted metrics for accumulated counts
    pub fn metrics(&self, coverage: &FaceCoverage) -> CoverageMetrics {
        let covered_area = self.summarize_area(coverage.covered_faces());
        let overlap_area = self.summarize_area(coverage.overlapped_faces());

        CoverageMetrics {
            coverage: self.percent_of_total(covered_area),
            overlap: self.percent_of_total(overlap_area),
            covered_area,
            overlap_area,
        }
    }

    /// Coverage and overlap of a whole path
    pub fn compute(&self, path: &[PathSample]) -> CoverageMetrics {
        if !self.has_area() || path.is_empty() {
            return CoverageMetrics::default();
        }
        self.metrics(&self.accumulate(path))
    }

    /// Cumulative coverage percentage after each waypoint.
    ///
    /// Entry `k` is the coverage of the union of faces seen by waypoints
    /// `0..=k`. The union and its area are extended incrementally.
    pub fn incremental(&self, path: &[PathSample]) -> Vec<f64> {
        if !self.has_area() {
            return vec![0.0; path.len()];
        }

        let sets = self.visible_sets(path);
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        let mut area = 0.0;

        sets.iter()
            .map(|faces| {
                for &face in faces {
                    if seen.insert(face) {
                        area += self.face_area(face);
                    }
                }
                self.percent_of_total(area)
            })
            .collect()
    }

    /// Percentage of mesh area seen by both face sets. Symmetric.
    pub fn overlap_between(&self, a: &[u32], b: &[u32]) -> f64 {
        self.percent_of_total(self.summarize_area(sorted_intersection(a, b)))
    }

    /// Overlap between two waypoints of a path
    pub fn pairwise_overlap(&self, path: &[PathSample], a: usize, b: usize) -> Result<f64> {
        let sample_a = sample_at(path, a)?;
        let sample_b = sample_at(path, b)?;
        let faces_a = self.visible_faces(&self.viewpoint_for(sample_a));
        let faces_b = self.visible_faces(&self.viewpoint_for(sample_b));
        Ok(self.overlap_between(&faces_a, &faces_b))
    }

    /// Coverage of one waypoint and its overlap with the previous waypoint
    pub fn waypoint_metrics(&self, path: &[PathSample], index: usize) -> Result<WaypointMetrics> {
        let sample = sample_at(path, index)?;
        if !self.has_area() {
            return Ok(WaypointMetrics::default());
        }

        let current = self.visible_faces(&self.viewpoint_for(sample));
        let overlap_with_previous = match index.checked_sub(1) {
            Some(prev) => {
                let previous = self.visible_faces(&self.viewpoint_for(&path[prev]));
                Some(self.overlap_between(&previous, &current))
            }
            None => None,
        };

        Ok(WaypointMetrics {
            coverage: Some(self.percent_of_total(self.summarize_area(current.iter().copied()))),
            overlap_with_previous,
        })
    }

    /// [`Self::waypoint_metrics`] for every waypoint, reusing each visible set
    pub fn all_waypoint_metrics(&self, path: &[PathSample]) -> Vec<WaypointMetrics> {
        if !self.has_area() {
            return vec![WaypointMetrics::default(); path.len()];
        }

        let sets = self.visible_sets(path);
        sets.iter()
            .enumerate()
            .map(|(i, faces)| WaypointMetrics {
                coverage: Some(self.percent_of_total(self.summarize_area(faces.iter().copied()))),
                overlap_with_previous: i
                    .checked_sub(1)
                    .map(|prev| self.overlap_between(&sets[prev], faces)),
            })
            .collect()
    }
}

fn sample_at(path: &[PathSample], index: usize) -> Result<&PathSample> {
    path.get(index).ok_or(Error::WaypointOutOfRange {
        index,
        len: path.len(),
    })
}

/// Intersection of two ascending face lists
fn sorted_intersection(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
