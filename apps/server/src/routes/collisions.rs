// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collision endpoint.

use crate::error::ApiError;
use crate::services::detect_collisions;
use crate::types::InspectionRequest;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use inspect_lite_geometry::CollisionResult;

/// POST /api/v1/collisions - Point and segment collisions of the path.
pub async fn collisions(
    State(state): State<AppState>,
    payload: Result<Json<InspectionRequest>, JsonRejection>,
) -> Result<Json<CollisionResult>, ApiError> {
    let Json(request) = payload?;
    let defaults = state.config.engine;

    let result =
        tokio::task::spawn_blocking(move || detect_collisions(&request, &defaults)).await?;
    Ok(Json(result))
}
