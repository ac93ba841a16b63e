// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collision methods for the Inspect-Lite API

use super::{js_error, path_from_json, InspectionAPI};
use crate::session::to_json;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
impl InspectionAPI {
    /// Check waypoints and segments against the mesh
    ///
    /// Returns a JSON string `{collisionCount, hasCollision, collisions}`.
    /// The voxel grid is built on the first call and reused until the mesh or
    /// voxel resolution changes.
    ///
    /// Example:
    /// ```javascript
    /// const result = JSON.parse(api.detectCollisions(JSON.stringify(path)));
    /// for (const c of result.collisions) {
    ///   markWaypoint(c.pathIndex, c.severity);
    /// }
    /// ```
    #[wasm_bindgen(js_name = detectCollisions)]
    pub fn detect_collisions(&mut self, path_json: &str) -> Result<String, JsError> {
        let path = path_from_json(path_json)?;
        let result = self.session.detect_collisions(&path);
        to_json(&result).map_err(js_error)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::InspectionAPI;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn detect_collisions_returns_json() {
        let mut api = InspectionAPI::new();
        api.set_mesh(&[0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 0.0], None);

        let json = api
            .detect_collisions(r#"[{"x": 2, "y": 2, "z": 5}, {"x": 2, "y": 2, "z": -5}]"#)
            .unwrap();
        assert!(json.contains("\"hasCollision\":true"));
    }

    #[wasm_bindgen_test]
    fn invalid_path_is_an_error() {
        let mut api = InspectionAPI::new();
        assert!(api.detect_collisions("nope").is_err());
        assert!(api.compute_coverage("[]").is_ok());
    }
}
