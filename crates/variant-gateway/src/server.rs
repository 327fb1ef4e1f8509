//! HTTP server for the variant gateway
//!
//! Provides /health, POST /files, and GET/DELETE /files/{*key}.

use crate::error::GatewayError;
use crate::gateway::ObjectGateway;
use crate::types::{FetchSource, HealthResponse};
use crate::upload::decode_upload;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, RawPathParams, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub gateway: ObjectGateway,
    pub max_upload_bytes: usize,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(gateway: ObjectGateway, max_upload_bytes: usize) -> Self {
        Self {
            gateway,
            max_upload_bytes,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Gateway {
        message: &'static str,
        error: GatewayError,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            ApiError::Gateway { message, error } => {
                let status = if error.is_not_found() {
                    warn!(error = %error, "{}", message);
                    StatusCode::NOT_FOUND
                } else {
                    error!(error = %error, "{}", message);
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    json!({ "message": message, "errorMessage": error.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Upload request body
#[derive(Deserialize)]
pub struct UploadRequest {
    /// Base64 payload, optionally as a data URL
    file: Option<String>,
    #[serde(rename = "fileKey")]
    file_key: Option<String>,
}

/// Fetch query parameters
#[derive(Deserialize)]
pub struct VariantQuery {
    #[serde(default)]
    variant: Option<String>,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health))
        .route("/files", post(upload_file))
        .route("/files/{*key}", get(get_file).delete(delete_file))
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
    })
}

/// Percent-decode the object key taken from the path
fn object_key(params: &RawPathParams) -> Result<String, ApiError> {
    let raw = params
        .iter()
        .find(|(name, _)| *name == "key")
        .map(|(_, value)| value)
        .unwrap_or_default();

    let key = urlencoding::decode(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid file key encoding: {}", e)))?;

    if key.is_empty() {
        return Err(ApiError::BadRequest("fileKey is required".to_string()));
    }

    Ok(key.into_owned())
}

/// Store an uploaded file and its compressed variant
async fn upload_file(
    State(state): State<SharedState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let key = body
        .file_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::BadRequest("fileKey is required".to_string()))?;
    let file = body
        .file
        .ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;

    let payload = decode_upload(&file).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let outcome = state
        .gateway
        .store(&key, &payload.data, &payload.content_type)
        .await;
    let original_report = outcome.origin_report();
    let compressed_report = outcome.derived_report();

    let outcome = outcome.into_result().map_err(|error| ApiError::Gateway {
        message: "File failed to upload",
        error,
    })?;

    let message = if outcome.derived.is_written() {
        "Successfully uploaded original file and stored compressed image"
    } else {
        "Successfully uploaded original file"
    };

    Ok(Json(json!({
        "message": message,
        "originalUploadResult": original_report,
        "compressedUploadResult": compressed_report,
    }))
    .into_response())
}

/// Get a file, or its compressed variant with `?variant=compressed`
async fn get_file(
    State(state): State<SharedState>,
    params: RawPathParams,
    Query(query): Query<VariantQuery>,
) -> Result<Response, ApiError> {
    let key = object_key(&params)?;
    let want_derived = query.variant.as_deref() == Some("compressed");

    let result = state
        .gateway
        .fetch(&key, want_derived)
        .await
        .map_err(|error| ApiError::Gateway {
            message: "Failed to retrieve file",
            error,
        })?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CACHE_CONTROL, "public, max-age=3600");

    match result.source {
        FetchSource::CacheHit => builder = builder.header("X-Cache", "HIT"),
        FetchSource::CacheMiss => builder = builder.header("X-Cache", "MISS"),
        FetchSource::Origin => {}
    }

    Ok(builder
        .body(Body::from(result.data))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

/// Delete a file from both stores
async fn delete_file(
    State(state): State<SharedState>,
    params: RawPathParams,
) -> Result<Response, ApiError> {
    let key = object_key(&params)?;

    let outcome = state.gateway.remove(&key).await;
    let original_report = outcome.origin_report();
    let compressed_report = outcome.derived_report();

    outcome.into_result().map_err(|error| ApiError::Gateway {
        message: "Failed to delete file",
        error,
    })?;

    Ok(Json(json!({
        "message": "Successfully deleted file from both stores",
        "originalResult": original_report,
        "compressedResult": compressed_report,
    }))
    .into_response())
}
