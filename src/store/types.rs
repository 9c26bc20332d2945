//! Shared record types used by the stores and the services above them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced document id does not exist in the store.
    #[error("document {0} not found")]
    NotFound(String),
    /// The store rejected the write (duplicate id, backend failure).
    #[error("store rejected operation: {0}")]
    Rejected(String),
}

/// Lifecycle state of an uploaded document.
///
/// Transitions are linear per document: `uploaded → processing → processed | failed`.
/// `processed` and `failed` are terminal; a failed document requires a fresh upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Record persisted, file on disk, background processing not yet started.
    Uploaded,
    /// A background worker has picked the document up and the AI call is in flight.
    Processing,
    /// The AI service accepted the document; it is ready for queries.
    Processed,
    /// Processing failed; the document cannot be queried.
    Failed,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Persisted metadata describing one uploaded file and its processing status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Unique identifier generated at upload time, immutable.
    pub id: String,
    /// On-disk file name, derived from the id and the original extension.
    pub file_name: String,
    /// File name as supplied by the client.
    pub original_file_name: String,
    /// Size of the uploaded payload in bytes.
    pub file_size: u64,
    /// MIME type detected by content sniffing (never the client-declared value).
    pub file_type: String,
    /// Opaque identifier of the uploading user.
    pub owner_id: String,
    /// Current lifecycle state.
    pub status: DocumentStatus,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp refreshed on every status transition.
    pub updated_at: String,
}

/// Append-only log entry pairing a query with its answer and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryRecord {
    /// Identifier generated at write time.
    pub id: String,
    /// Non-owning reference to the queried document; may dangle after deletion.
    pub document_id: String,
    /// Query text as submitted.
    pub query: String,
    /// Answer returned by the AI service.
    pub answer: String,
    /// Wall-clock time spent answering, in seconds.
    pub response_time_seconds: f64,
    /// RFC 3339 timestamp of the query.
    pub timestamp: String,
}

/// Current UTC time formatted as RFC 3339.
pub fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
