//! HTTP surface for the gateway.
//!
//! This module exposes a compact Axum router with the public endpoints:
//!
//! - `POST /api/documents/upload` – Multipart upload (`file`, optional `userId`).
//!   Validates the payload by sniffing its content, persists it, and schedules
//!   background processing. Returns `{documentId, status, message}`.
//! - `GET /api/documents/{documentId}` – Full document record, or 404.
//! - `GET /api/documents/list?userId=` – Records for one owner, in upload order.
//! - `DELETE /api/documents/{documentId}` – 204 on success, 404 when absent.
//! - `POST /api/query` – Answer a question against a processed document; 409 while
//!   the document is not yet `processed`.
//! - `GET /health` – Liveness probe.
//! - `GET /metrics` – Gateway activity counters.
//!
//! Wire JSON is camelCase throughout, matching the AI service contract.

use crate::config::get_config;
use crate::documents::{DocumentError, UploadRequest};
use crate::gateway::GatewayApi;
use crate::metrics::MetricsSnapshot;
use crate::query::{QueryError, QueryOutcome};
use crate::store::{DocumentRecord, DocumentStatus};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Owner applied when the client does not supply a `userId`.
const DEFAULT_USER_ID: &str = "default_user";

/// Build the HTTP router exposing the gateway API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: GatewayApi + 'static,
{
    // Twice the upload ceiling: oversized-but-plausible payloads must reach our own
    // validator so the client sees a 400 instead of a bare 413.
    let body_limit = get_config().max_upload_bytes.saturating_mul(2) as usize;

    Router::new()
        .route("/api/documents/upload", post(upload_document::<S>))
        .route("/api/documents/list", get(list_documents::<S>))
        .route(
            "/api/documents/:document_id",
            get(get_document::<S>).delete(delete_document::<S>),
        )
        .route("/api/query", post(answer_query::<S>))
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

/// Success response for `POST /api/documents/upload`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    document_id: String,
    status: DocumentStatus,
    message: &'static str,
}

/// Accept a multipart upload and schedule background processing.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: GatewayApi,
{
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(format!("Malformed multipart body: {error}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let original_file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(|error| {
                    AppError::BadRequest(format!("Failed to read file field: {error}"))
                })?;
                file = Some((bytes.to_vec(), original_file_name));
            }
            Some("userId") => {
                let value = field.text().await.map_err(|error| {
                    AppError::BadRequest(format!("Failed to read userId field: {error}"))
                })?;
                user_id = Some(value);
            }
            _ => {}
        }
    }

    let (bytes, original_file_name) = file.ok_or_else(|| {
        AppError::BadRequest("Multipart field 'file' is required".to_string())
    })?;
    let owner_id = user_id
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

    let record = service
        .submit(UploadRequest {
            bytes,
            original_file_name,
            owner_id,
        })
        .await?;
    tracing::info!(
        document_id = %record.id,
        owner_id = %record.owner_id,
        file_size = record.file_size,
        file_type = %record.file_type,
        "Upload accepted"
    );

    Ok(Json(UploadResponse {
        document_id: record.id,
        status: record.status,
        message: "Document uploaded successfully and is being processed",
    }))
}

/// Return the full record for one document.
async fn get_document<S>(
    State(service): State<Arc<S>>,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentRecord>, AppError>
where
    S: GatewayApi,
{
    let record = service.get_document(&document_id).await?;
    Ok(Json(record))
}

/// Query parameters for `GET /api/documents/list`.
#[derive(Deserialize)]
struct ListParams {
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
}

/// List the documents belonging to one owner.
async fn list_documents<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<DocumentRecord>>, AppError>
where
    S: GatewayApi,
{
    let owner_id = params
        .user_id
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    let records = service.list_documents(&owner_id).await?;
    Ok(Json(records))
}

/// Delete a document's file and metadata record.
async fn delete_document<S>(
    State(service): State<Arc<S>>,
    Path(document_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: GatewayApi,
{
    service.delete_document(&document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for `POST /api/query`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    document_id: String,
    query: String,
}

/// Response body for `POST /api/query`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponseBody {
    answer: String,
    sources: Vec<SourceBody>,
    processing_time: f64,
    confidence: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceBody {
    page: u32,
    snippet: String,
    relevance_score: f64,
}

/// Answer a question against a processed document.
async fn answer_query<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponseBody>, AppError>
where
    S: GatewayApi,
{
    let outcome = service
        .answer_query(&request.document_id, &request.query)
        .await?;
    Ok(Json(render_outcome(outcome)))
}

fn render_outcome(outcome: QueryOutcome) -> QueryResponseBody {
    QueryResponseBody {
        answer: outcome.answer,
        sources: outcome
            .sources
            .into_iter()
            .map(|source| SourceBody {
                page: source.page,
                snippet: source.snippet,
                relevance_score: source.relevance_score,
            })
            .collect(),
        processing_time: outcome.processing_time_seconds,
        confidence: outcome.confidence,
    }
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Liveness probe.
async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "DocuMind Gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Return gateway activity counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: GatewayApi,
{
    Json(service.metrics_snapshot())
}

/// Error wrapper translating service errors into HTTP responses.
enum AppError {
    Document(DocumentError),
    Query(QueryError),
    BadRequest(String),
}

impl From<DocumentError> for AppError {
    fn from(inner: DocumentError) -> Self {
        Self::Document(inner)
    }
}

impl From<QueryError> for AppError {
    fn from(inner: QueryError) -> Self {
        Self::Query(inner)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, body) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::Document(error) => {
                let status_code = match &error {
                    DocumentError::Validation(_) => StatusCode::BAD_REQUEST,
                    DocumentError::NotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status_code, json!({ "error": error.to_string() }))
            }
            Self::Query(error) => match &error {
                QueryError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, json!({ "error": error.to_string() }))
                }
                QueryError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, json!({ "error": error.to_string() }))
                }
                QueryError::NotReady { status, .. } => (
                    StatusCode::CONFLICT,
                    json!({ "error": error.to_string(), "status": status }),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": error.to_string() }),
                ),
            },
        };
        (status_code, Json(body)).into_response()
    }
}
