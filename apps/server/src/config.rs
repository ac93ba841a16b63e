// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use inspect_lite_geometry::config::{
    DEFAULT_ASPECT_RATIO, DEFAULT_FACING_TOLERANCE, DEFAULT_FALLBACK_DEPTH, DEFAULT_VERTICAL_FOV,
    DEFAULT_VOXEL_RESOLUTION,
};
use inspect_lite_geometry::EngineConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Maximum request body size in MB (meshes are sent inline).
    pub max_body_size_mb: usize,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of worker threads for parallel processing.
    pub worker_threads: usize,
    /// Engine defaults; requests may override any field.
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .unwrap_or(8080),
            max_body_size_mb: std::env::var("MAX_BODY_SIZE_MB")
                .unwrap_or_else(|_| "200".into())
                .parse()
                .unwrap_or(200),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".into())
                .parse()
                .unwrap_or(120),
            worker_threads: std::env::var("WORKER_THREADS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
            engine: EngineConfig {
                vertical_fov: env_or("VERTICAL_FOV", DEFAULT_VERTICAL_FOV),
                aspect_ratio: env_or("ASPECT_RATIO", DEFAULT_ASPECT_RATIO),
                fallback_depth: env_or("FALLBACK_DEPTH", DEFAULT_FALLBACK_DEPTH),
                voxel_resolution: env_or("VOXEL_RESOLUTION", DEFAULT_VOXEL_RESOLUTION),
                facing_tolerance: env_or("FACING_TOLERANCE", DEFAULT_FACING_TOLERANCE),
            }
            .sanitized(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            max_body_size_mb: 200,
            request_timeout_secs: 120,
            worker_threads: num_cpus::get(),
            engine: EngineConfig::default(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
