// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coverage endpoints.

use crate::error::ApiError;
use crate::services::{
    compute_all_waypoint_metrics, compute_coverage, compute_incremental_coverage,
    compute_waypoint_metrics,
};
use crate::types::{IncrementalCoverageResponse, InspectionRequest};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use inspect_lite_geometry::{CoverageMetrics, Error, WaypointMetrics};

/// POST /api/v1/coverage - Coverage and overlap of the whole path.
pub async fn coverage(
    State(state): State<AppState>,
    payload: Result<Json<InspectionRequest>, JsonRejection>,
) -> Result<Json<CoverageMetrics>, ApiError> {
    let Json(request) = payload?;
    let defaults = state.config.engine;

    // Process on blocking thread pool (CPU-intensive)
    let metrics =
        tokio::task::spawn_blocking(move || compute_coverage(&request, &defaults)).await?;
    Ok(Json(metrics))
}

/// POST /api/v1/coverage/incremental - Cumulative coverage per waypoint.
pub async fn incremental(
    State(state): State<AppState>,
    payload: Result<Json<InspectionRequest>, JsonRejection>,
) -> Result<Json<IncrementalCoverageResponse>, ApiError> {
    let Json(request) = payload?;
    let defaults = state.config.engine;

    let coverage =
        tokio::task::spawn_blocking(move || compute_incremental_coverage(&request, &defaults))
            .await?;
    Ok(Json(IncrementalCoverageResponse { coverage }))
}

/// POST /api/v1/coverage/waypoints - Metrics of every waypoint.
pub async fn waypoints(
    State(state): State<AppState>,
    payload: Result<Json<InspectionRequest>, JsonRejection>,
) -> Result<Json<Vec<WaypointMetrics>>, ApiError> {
    let Json(request) = payload?;
    let defaults = state.config.engine;

    let metrics =
        tokio::task::spawn_blocking(move || compute_all_waypoint_metrics(&request, &defaults))
            .await?;
    Ok(Json(metrics))
}

/// POST /api/v1/coverage/waypoints/:index - Metrics of one waypoint.
pub async fn waypoint(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    payload: Result<Json<InspectionRequest>, JsonRejection>,
) -> Result<Json<WaypointMetrics>, ApiError> {
    let Json(request) = payload?;
    let defaults = state.config.engine;

    if index >= request.path.len() {
        return Err(Error::WaypointOutOfRange {
            index,
            len: request.path.len(),
        }
        .into());
    }

    let metrics = tokio::task::spawn_blocking(move || {
        compute_waypoint_metrics(&request, &defaults, index)
    })
    .await??;
    Ok(Json(metrics))
}
