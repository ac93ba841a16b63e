// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for Inspect-Lite
//!
//! ```javascript
//! const api = new InspectionAPI();
//! api.setConfig(JSON.stringify({ verticalFov: 60, aspectRatio: 16 / 9 }));
//! api.setMesh(vertices, indices);
//! const metrics = JSON.parse(api.computeCoverage(JSON.stringify(path)));
//! ```

mod collision;
mod coverage;

use crate::session::{parse_path, BindingError, Session};
use inspect_lite_geometry::PathSample;
use wasm_bindgen::prelude::*;

/// Coverage and collision queries over one mesh
#[wasm_bindgen]
#[derive(Default)]
pub struct InspectionAPI {
    session: Session,
}

#[wasm_bindgen]
impl InspectionAPI {
    /// Create a new InspectionAPI instance with default configuration and no mesh
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set engine configuration from JSON
    /// (`verticalFov`, `aspectRatio`, `fallbackDepth`, `voxelResolution`, `facingTolerance`)
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsError> {
        self.session.set_config_json(config_json).map_err(js_error)
    }

    /// Get current configuration as JSON
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> String {
        self.session.config_json()
    }

    /// Set the mesh from a flat vertex buffer and optional triangle indices
    #[wasm_bindgen(js_name = setMesh)]
    pub fn set_mesh(&mut self, vertices: &[f64], indices: Option<Vec<u32>>) {
        self.session.set_mesh(vertices.to_vec(), indices);
    }

    /// Drop the mesh and cached voxel grid
    #[wasm_bindgen(js_name = clearMesh)]
    pub fn clear_mesh(&mut self) {
        self.session.clear_mesh();
    }

    /// Number of faces in the current mesh
    #[wasm_bindgen(getter, js_name = faceCount)]
    pub fn face_count(&self) -> usize {
        self.session.mesh().view().face_count()
    }
}

fn js_error(err: BindingError) -> JsError {
    JsError::new(&err.to_string())
}

fn path_from_json(path_json: &str) -> Result<Vec<PathSample>, JsError> {
    parse_path(path_json).map_err(js_error)
}
