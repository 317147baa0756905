// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::{Config, FeedMetadata, null_as_default};
use crate::error::ApiError;
use crate::feed::build_feed;
use crate::library::{AudioFile, scan_audio_files};

use super::AppState;

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
const AUDIO_PREFIX: &str = "/audio";

/// Acknowledgement returned by the update endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Body of `POST /api/selection`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<String>,
}

pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<AudioFile>>, ApiError> {
    let config = state.store.snapshot().await;
    let files = scan_audio_files(&config.audio_dir, &config.selected_files)?;
    Ok(Json(files))
}

pub async fn get_config(State(state): State<AppState>) -> Json<Config> {
    Json(state.store.snapshot().await)
}

// Bodies are decoded by hand so every malformed payload is a 400, whatever
// the content type.
pub async fn update_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let metadata: FeedMetadata = serde_json::from_slice(&body)?;
    state.store.update_metadata(metadata).await?;
    Ok(Json(StatusResponse::success()))
}

pub async fn update_selection(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let selection: SelectionRequest = serde_json::from_slice(&body)?;
    state.store.update_selection(selection.files).await?;
    Ok(Json(StatusResponse::success()))
}

pub async fn rss_feed(State(state): State<AppState>) -> Result<Response, ApiError> {
    let config = state.store.snapshot().await;
    let xml = build_feed(&config)?;
    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response())
}

/// Serve a file from the audio directory currently configured
pub async fn serve_audio(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    let audio_dir = state.store.audio_dir().await;
    let (mut parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let stripped = path_and_query
        .strip_prefix(AUDIO_PREFIX)
        .unwrap_or(path_and_query)
        .to_string();
    parts.uri = stripped
        .parse::<Uri>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response = ServeDir::new(audio_dir)
        .oneshot(Request::from_parts(parts, body))
        .await
        .unwrap_or_else(|never| match never {});
    Ok(response.into_response())
}
