// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use inspect_lite_geometry::{CoverageEngine, EngineConfig, FaceCoverage, Mesh, PathSample};

/// Closed box [0,10]^3, outward winding
fn cube() -> Mesh {
    let vertices = vec![
        0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 0.0, //
        0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0, 10.0, 10.0,
    ];
    let indices = vec![
        0, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7, 0, 1, 5, 0, 5, 4, //
        2, 3, 7, 2, 7, 6, 1, 2, 6, 1, 6, 5, 0, 4, 7, 0, 7, 3,
    ];
    Mesh::new(vertices, Some(indices))
}

/// Eight waypoints circling the cube at mid height, looking at its center
fn orbit() -> Vec<PathSample> {
    (0..8)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::FRAC_PI_4;
            let (x, y) = (5.0 + 25.0 * angle.cos(), 5.0 + 25.0 * angle.sin());
            PathSample::new(x, y, 5.0).with_normal(5.0 - x, 5.0 - y, 0.0)
        })
        .collect()
}

#[test]
fn single_triangle_seen_from_above_is_fully_covered() {
    let mesh = Mesh::soup(vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 0.0]);
    let config = EngineConfig::new()
        .with_vertical_fov(120.0)
        .with_aspect_ratio(1.0)
        .with_fallback_depth(1000.0);
    let engine = CoverageEngine::new(mesh.view(), config);

    let path = [PathSample::new(10.0 / 3.0, 10.0 / 3.0, 50.0).with_normal(0.0, 0.0, -1.0)];
    let metrics = engine.compute(&path);

    assert_relative_eq!(metrics.coverage, 100.0);
    assert_relative_eq!(metrics.covered_area, 50.0);
    assert_eq!(metrics.overlap, 0.0);
}

#[test]
fn overlapping_face_sets_are_area_weighted() {
    // Six faces of area 10 each
    let mut vertices = Vec::new();
    for i in 0..6 {
        let x = i as f64 * 10.0;
        vertices.extend_from_slice(&[x, 0.0, 0.0, x + 4.0, 0.0, 0.0, x, 5.0, 0.0]);
    }
    let mesh = Mesh::soup(vertices);
    let engine = CoverageEngine::new(mesh.view(), EngineConfig::default());
    assert_relative_eq!(engine.total_area(), 60.0);

    let mut coverage = FaceCoverage::new();
    coverage.merge_faces(&[1, 2, 3]);
    coverage.merge_faces(&[3, 4, 5]);
    let metrics = engine.metrics(&coverage);

    assert_relative_eq!(metrics.covered_area, 50.0);
    assert_relative_eq!(metrics.overlap_area, 10.0);
    assert_relative_eq!(metrics.coverage, 50.0 / 60.0 * 100.0);
    assert_relative_eq!(metrics.overlap, 10.0 / 60.0 * 100.0);
    assert_relative_eq!(engine.summarize_area([1, 2, 3]), 30.0);
}

#[test]
fn orbit_metrics_stay_within_bounds() {
    let mesh = cube();
    let engine = CoverageEngine::new(mesh.view(), EngineConfig::default());
    let path = orbit();

    let metrics = engine.compute(&path);
    println!(
        "orbit: coverage={:.2}% overlap={:.2}%",
        metrics.coverage, metrics.overlap
    );

    assert!(metrics.coverage > 0.0 && metrics.coverage <= 100.0);
    assert!(metrics.overlap >= 0.0 && metrics.overlap <= metrics.coverage);
    assert!(metrics.overlap_area <= metrics.covered_area);

    // Top and bottom are never faced from mid height
    assert!(metrics.coverage < 100.0);

    let cumulative = engine.incremental(&path);
    assert_eq!(cumulative.len(), path.len());
    for pair in cumulative.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
    assert_relative_eq!(cumulative[path.len() - 1], metrics.coverage);
}

#[test]
fn repeated_runs_are_identical() {
    let mesh = cube();
    let engine = CoverageEngine::new(mesh.view(), EngineConfig::default());
    let path = orbit();

    assert_eq!(engine.compute(&path), engine.compute(&path));
    assert_eq!(engine.accumulate(&path), engine.accumulate(&path));
    assert_eq!(engine.incremental(&path), engine.incremental(&path));
}

#[test]
fn pairwise_overlap_is_symmetric() {
    let mesh = cube();
    let engine = CoverageEngine::new(mesh.view(), EngineConfig::default());
    let path = orbit();

    for a in 0..path.len() {
        for b in 0..path.len() {
            let ab = engine.pairwise_overlap(&path, a, b).unwrap();
            let ba = engine.pairwise_overlap(&path, b, a).unwrap();
            assert_relative_eq!(ab, ba);
        }
    }
}

#[test]
fn area_ignores_winding() {
    let mesh = cube();
    let flipped_indices: Vec<u32> = mesh
        .indices
        .as_ref()
        .unwrap()
        .chunks_exact(3)
        .flat_map(|t| [t[0], t[2], t[1]])
        .collect();
    let flipped = Mesh::new(mesh.vertices.clone(), Some(flipped_indices));

    assert_relative_eq!(mesh.view().total_area(), 600.0);
    assert_eq!(mesh.view().face_areas(), flipped.view().face_areas());
}

#[test]
fn degenerate_directions_do_not_panic() {
    let mesh = cube();
    let engine = CoverageEngine::new(mesh.view(), EngineConfig::default());
    let path = [
        // Zero normal: falls back to looking at the mesh centroid
        PathSample::new(-20.0, 5.0, 5.0).with_normal(0.0, 0.0, 0.0),
        // Sitting on the centroid: no direction can be derived
        PathSample::new(5.0, 5.0, 5.0),
        // Looking straight up
        PathSample::new(5.0, 5.0, -20.0).with_normal(0.0, 0.0, 1.0),
    ];

    let metrics = engine.compute(&path);
    assert!((0.0..=100.0).contains(&metrics.coverage));

    let all = engine.all_waypoint_metrics(&path);
    assert_eq!(all.len(), 3);
    assert!(all[0].coverage.unwrap() > 0.0);
    assert!(all[2].coverage.unwrap() > 0.0);
}

#[test]
fn empty_inputs_produce_zero_results() {
    let empty = Mesh::default();
    let engine = CoverageEngine::new(empty.view(), EngineConfig::default());
    let path = orbit();

    let metrics = engine.compute(&path);
    assert_eq!(metrics.coverage, 0.0);
    assert_eq!(metrics.covered_area, 0.0);
    assert!(engine.incremental(&path).iter().all(|c| *c == 0.0));
    assert!(engine
        .all_waypoint_metrics(&path)
        .iter()
        .all(|m| m.coverage.is_none() && m.overlap_with_previous.is_none()));

    let mesh = cube();
    let engine = CoverageEngine::new(mesh.view(), EngineConfig::default());
    assert_eq!(engine.compute(&[]).coverage, 0.0);
    assert!(engine.incremental(&[]).is_empty());
}

#[test]
fn path_samples_parse_from_camel_case_json() {
    let json = r#"[
        {"x": 1.0, "y": 2.0, "z": 3.0, "normalX": 0.0, "normalY": 0.0, "normalZ": -1.0},
        {"x": 4.0, "y": 5.0, "z": 6.0}
    ]"#;
    let path: Vec<PathSample> = serde_json::from_str(json).unwrap();

    assert_eq!(path.len(), 2);
    assert_eq!(path[0].normal().unwrap().z, -1.0);
    assert!(path[1].normal().is_none());
}
