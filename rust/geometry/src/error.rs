// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the geometry engine.
///
/// Missing data (empty meshes, empty paths, zero-area meshes) is not an error;
/// those inputs produce zero-valued results. Only caller bugs end up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Waypoint index {index} out of range for path of length {len}")]
    WaypointOutOfRange { index: usize, len: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}
