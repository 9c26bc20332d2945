//! Wire types and errors for the AI service client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while calling the AI service.
#[derive(Debug, Error)]
pub enum AiClientError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid AI service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before a usable response arrived, or the body was malformed.
    #[error("AI service request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The AI service responded with an unexpected status code.
    #[error("Unexpected AI service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the AI service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Acknowledgement returned by `POST /process-document`.
///
/// Parsed leniently: the gateway only needs the 200 status, the rest is diagnostics.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAck {
    /// Upstream status label, e.g. `"success"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Number of chunks the AI service produced for the document.
    #[serde(default)]
    pub chunk_count: Option<u64>,
    /// Upstream-reported processing time in seconds.
    #[serde(default)]
    pub processing_time: Option<f64>,
    /// Human-readable diagnostic message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer payload returned by `POST /query`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnswer {
    /// Answer text. A body without this field counts as malformed.
    pub answer: String,
    /// Citations backing the answer. The upstream leaves these unpopulated today,
    /// so absence is tolerated; the field is parsed whenever present.
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
    /// Upstream-reported processing time in seconds.
    #[serde(default)]
    pub processing_time: f64,
    /// Upstream confidence estimate in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
}

/// One citation attached to an answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCitation {
    /// Page number the snippet was taken from.
    #[serde(default)]
    pub page: u32,
    /// Text excerpt supporting the answer.
    #[serde(default)]
    pub snippet: String,
    /// Relevance score reported by the retriever.
    #[serde(default)]
    pub relevance: f64,
}
