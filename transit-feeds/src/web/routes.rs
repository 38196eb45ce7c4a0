//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::feeds::FeedStatus;
use crate::providers::{ProviderError, ProviderResult};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/feeds", get(list_feeds))
        .route("/feeds/:id", get(feed_detail))
        .route("/api/stations/search", get(search_stations))
        .route("/api/station", get(station_info))
        .route("/api/stop-points/:id", get(stop_point))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
///
/// Reports "degraded" while any feed has never produced a snapshot.
async fn health(State(state): State<AppState>) -> &'static str {
    let uninitialized = state
        .registry
        .iter()
        .any(|feed| feed.reader().status() == FeedStatus::Uninitialized);
    if uninitialized { "degraded" } else { "ok" }
}

async fn list_feeds(State(state): State<AppState>) -> Json<FeedListResponse> {
    let now = Utc::now();
    let feeds = state
        .registry
        .iter()
        .map(|feed| FeedSummary::from_handle(feed, now))
        .collect();
    Json(FeedListResponse { feeds })
}

async fn feed_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FeedDetail>, AppError> {
    let feed = state.registry.get(&id).ok_or_else(|| AppError::NotFound {
        message: format!("Unknown feed: {id}"),
    })?;
    Ok(Json(FeedDetail::from_handle(feed, Utc::now())))
}

/// Search stations by name via Huxley.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Result<Json<Value>, AppError> {
    let query = req.q.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest {
            message: "Missing search query".to_string(),
        });
    }
    passthrough(state.stations.search(query).await)
}

/// TfL info for the monitored station.
async fn station_info(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    passthrough(state.tfl.get_station_info(&state.station_naptan).await)
}

async fn stop_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    passthrough(state.tfl.get_station_info(&id).await)
}

/// Return a provider payload as-is, or map its failure.
fn passthrough(result: ProviderResult) -> Result<Json<Value>, AppError> {
    match result {
        ProviderResult::Success(payload) => Ok(Json(Value::clone(&payload))),
        ProviderResult::Empty(cause) => Err(AppError::from(cause)),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// An upstream provider gave nothing usable
    BadGateway { message: String },
    Internal { message: String },
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Status { status: 404, .. } | ProviderError::NoContent => {
                AppError::NotFound {
                    message: e.to_string(),
                }
            }
            ProviderError::InvalidCredential(_) => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), %message, "request failed");
        } else {
            warn!(status = status.as_u16(), %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
