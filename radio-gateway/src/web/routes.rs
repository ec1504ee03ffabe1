//! HTTP route handlers.

use std::future::Future;
use std::time::Instant;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::directory::{DirectoryError, StationSummary, resolve_by_name};
use crate::metrics::MetricsError;
use crate::proxy::{ProxyError, StreamSession};

use super::dto::*;
use super::state::AppState;

/// Content type of the Prometheus text exposition format.
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Latency label of the streaming endpoint.
const STREAM_ENDPOINT: &str = "/stream";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/stations", get(list_stations))
        .route("/stream/:station", get(stream_station))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(cors)
        .layer(middleware::from_fn(options_no_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answer every `OPTIONS` request with 204, keeping the CORS headers.
async fn options_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Metrics exposition endpoint.
async fn metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.metrics.render() {
        Some(Ok(text)) => Ok(([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], text).into_response()),
        Some(Err(e)) => Err(AppError::from(e)),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// Run `fut` and record its latency under `endpoint`.
async fn timed<T>(state: &AppState, endpoint: &str, fut: impl Future<Output = T>) -> T {
    let started = Instant::now();
    let output = fut.await;
    state.metrics.observe_latency(endpoint, started.elapsed());
    output
}

/// List every station in the directory, exposing only names.
async fn list_stations(
    State(state): State<AppState>,
) -> Result<Json<Vec<StationSummary>>, AppError> {
    let stations = timed(&state, "/stations", state.directory.fetch_stations()).await?;

    let summaries: Vec<StationSummary> = stations.iter().map(StationSummary::from).collect();
    info!(count = summaries.len(), "returned stations");

    Ok(Json(summaries))
}

/// Relay the live audio of a station.
///
/// The response status and headers are sent as soon as the upstream
/// connection is open; the body is relayed by a [`StreamSession`] that
/// outlives this handler. Latency covers the whole request: failures are
/// timed here, streams when their session settles.
async fn stream_station(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> Result<Response, AppError> {
    info!(station = %station, "streaming request");
    state.metrics.station_requested(&station);

    let started = Instant::now();
    let result = open_station_stream(&state, &station, started).await;
    if result.is_err() {
        state.metrics.observe_latency(STREAM_ENDPOINT, started.elapsed());
    }
    result
}

async fn open_station_stream(
    state: &AppState,
    name: &str,
    started: Instant,
) -> Result<Response, AppError> {
    let stations = state.directory.fetch_stations().await?;

    let Some(target) = resolve_by_name(&stations, name) else {
        warn!(station = %name, "station not found");
        return Err(AppError::StationNotFound);
    };

    let upstream = match state.upstream.open(&target.url).await {
        Ok(upstream) => upstream,
        Err(e) => {
            state.metrics.stream_failed();
            return Err(AppError::from(e));
        }
    };

    let session = StreamSession::new(target.name.clone(), state.metrics.clone())
        .timed(STREAM_ENDPOINT, started);
    let (body, _settled) = session.start(upstream.body);

    let headers = [
        (header::CONTENT_TYPE, upstream.content_type),
        (header::TRANSFER_ENCODING, HeaderValue::from_static("chunked")),
    ];
    Ok((headers, Body::from_stream(body)).into_response())
}

/// Application error type.
///
/// Each variant maps to a fixed status and client-facing message.
#[derive(Debug)]
pub enum AppError {
    DirectoryFetch(String),
    DirectoryParse(String),
    StationNotFound,
    UpstreamConnect(String),
    Internal(String),
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Fetch(_) => AppError::DirectoryFetch(e.to_string()),
            DirectoryError::Parse { .. } => AppError::DirectoryParse(e.to_string()),
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(e: ProxyError) -> Self {
        match e {
            ProxyError::Connect(_) => AppError::UpstreamConnect(e.to_string()),
            ProxyError::Client(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<MetricsError> for AppError {
    fn from(e: MetricsError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::DirectoryFetch(detail) => {
                error!(%detail, "error fetching stations");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch stations")
            }
            AppError::DirectoryParse(detail) => {
                error!(%detail, "error parsing stations");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to parse stations")
            }
            AppError::StationNotFound => (StatusCode::NOT_FOUND, "Station not found"),
            AppError::UpstreamConnect(detail) => {
                error!(%detail, "stream connection error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to connect to stream")
            }
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(ErrorResponse {
            error: message.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
