//! HTTP client wrapper for the external AI service.

use crate::ai::types::{AiClientError, ProcessAck, QueryAnswer};
use crate::config::get_config;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Lightweight HTTP client for the AI service's two operations.
///
/// Both calls are single-attempt: no retries, no circuit breaking. A request timeout is
/// applied only when `AI_SERVICE_TIMEOUT_SECS` is configured; the default preserves the
/// upstream contract of waiting indefinitely.
pub struct AiServiceClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl AiServiceClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, AiClientError> {
        let config = get_config();
        let mut builder = Client::builder().user_agent("documind-gateway/0.1");
        if let Some(secs) = config.ai_service_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let base_url =
            normalize_base_url(&config.ai_service_url).map_err(AiClientError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            timeout_secs = ?config.ai_service_timeout_secs,
            "Initialized AI service HTTP client"
        );

        Ok(Self { client, base_url })
    }

    /// Submit a stored document for processing.
    ///
    /// Success means the AI service returned 200; anything else (transport failure,
    /// non-success status, malformed body) is an error the caller turns into the
    /// `failed` lifecycle state.
    pub async fn process_document(
        &self,
        document_id: &str,
        file_path: &str,
    ) -> Result<ProcessAck, AiClientError> {
        let body = json!({
            "documentId": document_id,
            "filePath": file_path,
        });

        let response = self
            .client
            .post(format_endpoint(&self.base_url, "process-document"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = AiClientError::UnexpectedStatus { status, body };
            tracing::error!(document_id, error = %error, "AI service rejected document");
            return Err(error);
        }

        let ack: ProcessAck = response.json().await?;
        tracing::info!(
            document_id,
            chunks = ?ack.chunk_count,
            upstream_time = ?ack.processing_time,
            "Document accepted by AI service"
        );
        Ok(ack)
    }

    /// Answer a natural-language query against a processed document.
    pub async fn query_document(
        &self,
        document_id: &str,
        query: &str,
    ) -> Result<QueryAnswer, AiClientError> {
        let body = json!({
            "documentId": document_id,
            "query": query,
        });

        let response = self
            .client
            .post(format_endpoint(&self.base_url, "query"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = AiClientError::UnexpectedStatus { status, body };
            tracing::error!(document_id, error = %error, "AI service query failed");
            return Err(error);
        }

        let answer: QueryAnswer = response.json().await?;
        tracing::debug!(
            document_id,
            sources = answer.sources.len(),
            confidence = answer.confidence,
            "AI service answered query"
        );
        Ok(answer)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
