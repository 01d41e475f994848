//! HTTP routes: the tile endpoint, dataset exports, status and rebuild.

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crossline_core::Error;
use crossline_core::prelude::{TileCoord, render_tile};

use crate::state::AppState;

const TILE_CONTENT_TYPE: &str = "application/vnd.mapbox-vector-tile";
const TILE_CACHE_CONTROL: &str = "public, max-age=3600";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/tiles/{z}/{x}/{y}", get(tile))
        .route("/dataset/crossings", get(dataset_crossings))
        .route("/dataset/segments", get(dataset_segments))
        .route("/rebuild", post(rebuild))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|_: BoxError| async {
                    StatusCode::REQUEST_TIMEOUT
                }))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .with_state(state)
}

/// Core error mapped to an HTTP response. Bad request input is the
/// client's fault; everything else is reported as an internal error
/// with its message.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match &self.0 {
            Error::InvalidTileCoordinate { .. } | Error::InvalidRegion(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.0.to_string() })),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal error",
                    "message": self.0.to_string(),
                })),
            ),
        };
        response.into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn status(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.snapshot()?;
    Ok(Json(json!({
        "crossings": snapshot.crossings.len(),
        "segments": snapshot.segments.len(),
        "params": snapshot.params,
    })))
}

async fn tile(
    State(state): State<AppState>,
    Path((z, x, y)): Path<(i32, i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let coord = TileCoord::new(z, x, y)?;
    let snapshot = state.snapshot()?;
    let bytes = render_tile(&snapshot, coord)?;
    Ok((
        [
            (header::CONTENT_TYPE, TILE_CONTENT_TYPE),
            (header::CACHE_CONTROL, TILE_CACHE_CONTROL),
        ],
        bytes,
    ))
}

async fn dataset_crossings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.snapshot()?;
    Ok(Json(snapshot.crossings_to_geojson()?))
}

async fn dataset_segments(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.snapshot()?;
    Ok(Json(snapshot.segments_to_geojson()?))
}

async fn rebuild(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.rebuild().await?;
    let snapshot = state.snapshot()?;
    Ok(Json(json!({
        "status": "rebuilt",
        "crossings": snapshot.crossings.len(),
        "segments": snapshot.segments.len(),
    })))
}
