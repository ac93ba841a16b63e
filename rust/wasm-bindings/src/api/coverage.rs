// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coverage methods for the Inspect-Lite API

use super::{js_error, path_from_json, InspectionAPI};
use crate::session::to_json;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
impl InspectionAPI {
    /// Coverage and overlap of a whole path
    ///
    /// Returns a JSON string `{coverage, overlap, coveredArea, overlapArea}`
    #[wasm_bindgen(js_name = computeCoverage)]
    pub fn compute_coverage(&self, path_json: &str) -> Result<String, JsError> {
        let path = path_from_json(path_json)?;
        let metrics = self.session.coverage(&path);
        to_json(&metrics).map_err(js_error)
    }

    /// Cumulative coverage percentage after each waypoint (for playback)
    #[wasm_bindgen(js_name = computeIncrementalCoverage)]
    pub fn compute_incremental_coverage(&self, path_json: &str) -> Result<Vec<f64>, JsError> {
        let path = path_from_json(path_json)?;
        Ok(self.session.incremental_coverage(&path))
    }

    /// Coverage of one waypoint and its overlap with the previous one.
    /// Values are `null` when the mesh has no area.
    #[wasm_bindgen(js_name = computeWaypointMetrics)]
    pub fn compute_waypoint_metrics(
        &self,
        path_json: &str,
        index: usize,
    ) -> Result<String, JsError> {
        let path = path_from_json(path_json)?;
        let metrics = self.session.waypoint_metrics(&path, index).map_err(js_error)?;
        to_json(&metrics).map_err(js_error)
    }

    /// Per-waypoint metrics for the whole path, as an array of objects
    #[wasm_bindgen(js_name = computeAllWaypointMetrics)]
    pub fn compute_all_waypoint_metrics(&self, path_json: &str) -> Result<JsValue, JsError> {
        let path = path_from_json(path_json)?;
        let metrics = self.session.all_waypoint_metrics(&path);
        serde_wasm_bindgen::to_value(&metrics)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    /// Percentage of mesh area seen from both waypoints `a` and `b`
    #[wasm_bindgen(js_name = pairwiseOverlap)]
    pub fn pairwise_overlap(&self, path_json: &str, a: usize, b: usize) -> Result<f64, JsError> {
        let path = path_from_json(path_json)?;
        self.session.pairwise_overlap(&path, a, b).map_err(js_error)
    }

    /// Face indices visible from one waypoint
    #[wasm_bindgen(js_name = visibleFaces)]
    pub fn visible_faces(
        &self,
        path_json: &str,
        index: usize,
    ) -> Result<js_sys::Uint32Array, JsError> {
        let path = path_from_json(path_json)?;
        let faces = self.session.visible_faces(&path, index).map_err(js_error)?;
        Ok(js_sys::Uint32Array::from(&faces[..]))
    }

    /// Viewing pyramid of one waypoint: apex followed by the 4 base corners
    /// (15 numbers, for drawing the frustum)
    #[wasm_bindgen(js_name = viewingPyramid)]
    pub fn viewing_pyramid(
        &self,
        path_json: &str,
        index: usize,
    ) -> Result<js_sys::Float64Array, JsError> {
        let path = path_from_json(path_json)?;
        let corners = self.session.viewing_pyramid(&path, index).map_err(js_error)?;
        Ok(js_sys::Float64Array::from(&corners[..]))
    }
}
