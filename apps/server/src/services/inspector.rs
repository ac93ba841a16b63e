// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coverage and collision computations for one request.
//!
//! Everything here is CPU-bound and synchronous; handlers run it on the
//! blocking pool.

use crate::types::InspectionRequest;
use inspect_lite_geometry::{
    CollisionDetector, CollisionResult, CoverageEngine, CoverageMetrics, EngineConfig,
    Result as GeometryResult, WaypointMetrics,
};
use std::time::Instant;

fn engine<'a>(request: &'a InspectionRequest, defaults: &EngineConfig) -> CoverageEngine<'a> {
    let view = request.mesh.view();
    tracing::debug!(
        vertices = view.vertex_count(),
        faces = view.face_count(),
        waypoints = request.path.len(),
        "Preparing coverage engine"
    );
    CoverageEngine::new(view, request.engine_config(defaults))
}

/// Coverage and overlap of the whole path.
pub fn compute_coverage(request: &InspectionRequest, defaults: &EngineConfig) -> CoverageMetrics {
    let start = Instant::now();
    let metrics = engine(request, defaults).compute(&request.path);

    tracing::info!(
        waypoints = request.path.len(),
        coverage = metrics.coverage,
        overlap = metrics.overlap,
        time_ms = start.elapsed().as_millis(),
        "Coverage computed"
    );
    metrics
}

/// Cumulative coverage after each waypoint.
pub fn compute_incremental_coverage(
    request: &InspectionRequest,
    defaults: &EngineConfig,
) -> Vec<f64> {
    let start = Instant::now();
    let coverage = engine(request, defaults).incremental(&request.path);

    tracing::info!(
        waypoints = request.path.len(),
        time_ms = start.elapsed().as_millis(),
        "Incremental coverage computed"
    );
    coverage
}

/// Metrics of one waypoint; out-of-range indices are caller errors.
pub fn compute_waypoint_metrics(
    request: &InspectionRequest,
    defaults: &EngineConfig,
    index: usize,
) -> GeometryResult<WaypointMetrics> {
    engine(request, defaults).waypoint_metrics(&request.path, index)
}

/// Metrics of every waypoint.
pub fn compute_all_waypoint_metrics(
    request: &InspectionRequest,
    defaults: &EngineConfig,
) -> Vec<WaypointMetrics> {
    let start = Instant::now();
    let metrics = engine(request, defaults).all_waypoint_metrics(&request.path);

    tracing::info!(
        waypoints = request.path.len(),
        time_ms = start.elapsed().as_millis(),
        "Waypoint metrics computed"
    );
    metrics
}

/// Point and segment collisions of the path.
pub fn detect_collisions(request: &InspectionRequest, defaults: &EngineConfig) -> CollisionResult {
    let start = Instant::now();
    let config = request.engine_config(defaults);
    let detector = CollisionDetector::new(&request.mesh.view(), &config);
    let build_time = start.elapsed();

    let result = detector.detect(&request.path);

    tracing::info!(
        waypoints = request.path.len(),
        collisions = result.collision_count,
        fallback = detector.is_fallback(),
        build_ms = build_time.as_millis(),
        time_ms = start.elapsed().as_millis(),
        "Collision check complete"
    );
    result
}
