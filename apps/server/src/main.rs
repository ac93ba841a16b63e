// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inspect-Lite Server - coverage and collision checks over HTTP.
//!
//! Runs the same geometry engine as the browser bindings, so both sides
//! report identical numbers for the same mesh and path.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `POST /api/v1/coverage` - Coverage and overlap of a path
//! - `POST /api/v1/coverage/incremental` - Cumulative coverage per waypoint
//! - `POST /api/v1/coverage/waypoints` - Metrics of every waypoint
//! - `POST /api/v1/coverage/waypoints/:index` - Metrics of one waypoint
//! - `POST /api/v1/collisions` - Point and segment collisions

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,tower_http=debug,inspect_lite_server=debug")
        }))
        .pretty()
        .init();

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        max_body_size_mb = config.max_body_size_mb,
        worker_threads = config.worker_threads,
        vertical_fov = config.engine.vertical_fov,
        voxel_resolution = config.engine.voxel_resolution,
        "Starting Inspect-Lite Server"
    );

    // Initialize rayon thread pool
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
    {
        tracing::warn!(error = %e, "Rayon thread pool already initialized");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = routes::router(AppState {
        config: Arc::new(config),
    });

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
