// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ConfigStore;

pub use handlers::{SelectionRequest, StatusResponse};

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
}

impl AppState {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build the application router
///
/// `static_dir` holds the UI bundle served for every unmatched path.
pub fn router(state: AppState, static_dir: impl Into<PathBuf>) -> Router {
    Router::new()
        .route("/api/files", get(handlers::list_files))
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::update_config),
        )
        .route("/api/selection", post(handlers::update_selection))
        .route("/feed.xml", get(handlers::rss_feed))
        .route("/rss", get(handlers::rss_feed))
        .route("/audio/{*path}", get(handlers::serve_audio))
        .fallback_service(ServeDir::new(static_dir.into()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
