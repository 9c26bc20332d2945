//! Query orchestration against processed documents.
//!
//! Validates that the target document is query-ready, delegates to the AI service,
//! stamps the answer with measured wall-clock latency, and appends an audit entry to
//! the query history. The history write is best-effort: an answer that has already
//! been computed is never discarded because an audit write failed.

use crate::{
    ai::{AiClientError, AiServiceClient},
    metrics::GatewayMetrics,
    store::{
        DocumentStatus, DocumentStore, QueryHistoryRecord, QueryHistoryStore, StoreError,
        current_timestamp_rfc3339,
    },
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// Errors emitted while orchestrating a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Blank document id or query text.
    #[error("Invalid query: {0}")]
    Validation(String),
    /// Referenced document id does not exist.
    #[error("Document {0} not found")]
    NotFound(String),
    /// The document has not reached the `processed` state.
    #[error("Document {document_id} is not ready for queries. Current status: {status}")]
    NotReady {
        /// Document the query targeted.
        document_id: String,
        /// Lifecycle state observed at query time.
        status: DocumentStatus,
    },
    /// The AI service query call failed.
    #[error("AI service failure: {0}")]
    Upstream(#[from] AiClientError),
    /// The document store failed while resolving the record.
    #[error("Document store failure: {0}")]
    Store(StoreError),
}

/// Answer produced for a query, ready for the HTTP surface.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Answer text returned by the AI service.
    pub answer: String,
    /// Citations backing the answer; empty when the upstream supplies none.
    pub sources: Vec<SourceRef>,
    /// Wall-clock time spent answering, measured by the gateway.
    pub processing_time_seconds: f64,
    /// Upstream confidence estimate.
    pub confidence: f64,
}

/// One citation surfaced with an answer.
#[derive(Debug, Clone)]
pub struct SourceRef {
    /// Page number the snippet was taken from.
    pub page: u32,
    /// Text excerpt supporting the answer.
    pub snippet: String,
    /// Relevance score reported by the retriever.
    pub relevance_score: f64,
}

/// Orchestrates query answering over the document store and the AI service.
///
/// Reads document status but never writes it; the lifecycle manager owns transitions.
pub struct QueryService {
    documents: Arc<dyn DocumentStore>,
    history: Arc<dyn QueryHistoryStore>,
    ai_client: Arc<AiServiceClient>,
    metrics: Arc<GatewayMetrics>,
}

impl QueryService {
    /// Build a query orchestrator over shared stores and the AI client.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        history: Arc<dyn QueryHistoryStore>,
        ai_client: Arc<AiServiceClient>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            documents,
            history,
            ai_client,
            metrics,
        }
    }

    /// Answer a natural-language query against a processed document.
    pub async fn answer(
        &self,
        document_id: &str,
        query_text: &str,
    ) -> Result<QueryOutcome, QueryError> {
        if document_id.trim().is_empty() {
            return Err(QueryError::Validation("Document ID is required".to_string()));
        }
        if query_text.trim().is_empty() {
            return Err(QueryError::Validation("Query text is required".to_string()));
        }

        let record = self
            .documents
            .get(document_id)
            .await
            .map_err(QueryError::Store)?
            .ok_or_else(|| QueryError::NotFound(document_id.to_string()))?;

        if record.status != DocumentStatus::Processed {
            return Err(QueryError::NotReady {
                document_id: document_id.to_string(),
                status: record.status,
            });
        }

        let started = Instant::now();
        let upstream = self.ai_client.query_document(document_id, query_text).await?;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        let outcome = QueryOutcome {
            answer: upstream.answer,
            sources: upstream
                .sources
                .into_iter()
                .map(|source| SourceRef {
                    page: source.page,
                    snippet: source.snippet,
                    relevance_score: source.relevance,
                })
                .collect(),
            // The gateway-measured latency supersedes the upstream-reported time.
            processing_time_seconds: elapsed_seconds,
            confidence: upstream.confidence,
        };

        self.append_history(document_id, query_text, &outcome).await;
        self.metrics.record_query();
        tracing::info!(
            document_id,
            elapsed_seconds,
            sources = outcome.sources.len(),
            "Query answered"
        );

        Ok(outcome)
    }

    /// Append one audit entry; failures are logged, never propagated.
    async fn append_history(&self, document_id: &str, query_text: &str, outcome: &QueryOutcome) {
        let record = QueryHistoryRecord {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            query: query_text.to_string(),
            answer: outcome.answer.clone(),
            response_time_seconds: outcome.processing_time_seconds,
            timestamp: current_timestamp_rfc3339(),
        };
        if let Err(error) = self.history.append(record).await {
            tracing::warn!(document_id, error = %error, "Failed to record query history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        DocumentRecord, InMemoryDocumentStore, InMemoryQueryHistoryStore, QueryHistoryRecord,
    };
    use async_trait::async_trait;
    use httpmock::{Method::POST, MockServer};

    struct Fixture {
        service: QueryService,
        documents: Arc<dyn DocumentStore>,
        history: Arc<InMemoryQueryHistoryStore>,
    }

    fn fixture(server: &MockServer) -> Fixture {
        let documents: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let history = Arc::new(InMemoryQueryHistoryStore::new());
        let service = QueryService::new(
            Arc::clone(&documents),
            Arc::clone(&history) as Arc<dyn QueryHistoryStore>,
            Arc::new(AiServiceClient {
                client: reqwest::Client::new(),
                base_url: server.base_url(),
            }),
            Arc::new(GatewayMetrics::new()),
        );
        Fixture {
            service,
            documents,
            history,
        }
    }

    async fn insert_document(store: &Arc<dyn DocumentStore>, id: &str, status: DocumentStatus) {
        store
            .insert(DocumentRecord {
                id: id.to_string(),
                file_name: format!("{id}.txt"),
                original_file_name: "notes.txt".into(),
                file_size: 24,
                file_type: "text/plain".into(),
                owner_id: "alice".into(),
                status,
                created_at: current_timestamp_rfc3339(),
                updated_at: current_timestamp_rfc3339(),
            })
            .await
            .expect("insert");
    }

    #[tokio::test]
    async fn answers_and_appends_exactly_one_history_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/query");
                then.status(200).json_body(serde_json::json!({
                    "answer": "It covers Rust.",
                    "processingTime": 0.2,
                    "confidence": 0.8
                }));
            })
            .await;
        let fx = fixture(&server);
        insert_document(&fx.documents, "doc_1", DocumentStatus::Processed).await;

        let outcome = fx
            .service
            .answer("doc_1", "What is this about?")
            .await
            .expect("answer");
        assert_eq!(outcome.answer, "It covers Rust.");
        assert!(outcome.processing_time_seconds >= 0.0);
        assert!(outcome.sources.is_empty());

        let entries = fx.history.list_by_document("doc_1").await.expect("history");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "What is this about?");
        assert_eq!(entries[0].answer, "It covers Rust.");
        assert!(entries[0].response_time_seconds >= 0.0);
    }

    #[tokio::test]
    async fn not_ready_carries_current_status() {
        let server = MockServer::start_async().await;
        let fx = fixture(&server);
        insert_document(&fx.documents, "doc_1", DocumentStatus::Processing).await;

        let error = fx.service.answer("doc_1", "anything").await.unwrap_err();
        match error {
            QueryError::NotReady {
                document_id,
                status,
            } => {
                assert_eq!(document_id, "doc_1");
                assert_eq!(status, DocumentStatus::Processing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn blank_inputs_are_rejected_before_any_lookup() {
        let server = MockServer::start_async().await;
        let fx = fixture(&server);

        assert!(matches!(
            fx.service.answer("  ", "a query").await.unwrap_err(),
            QueryError::Validation(_)
        ));
        assert!(matches!(
            fx.service.answer("doc_1", "").await.unwrap_err(),
            QueryError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn unknown_document_yields_not_found() {
        let server = MockServer::start_async().await;
        let fx = fixture(&server);

        assert!(matches!(
            fx.service.answer("doc_missing", "a query").await.unwrap_err(),
            QueryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_as_upstream_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/query");
                then.status(500).body("model unavailable");
            })
            .await;
        let fx = fixture(&server);
        insert_document(&fx.documents, "doc_1", DocumentStatus::Processed).await;

        let error = fx.service.answer("doc_1", "a query").await.unwrap_err();
        assert!(matches!(error, QueryError::Upstream(_)));
        assert!(fx
            .history
            .list_by_document("doc_1")
            .await
            .expect("history")
            .is_empty());
    }

    struct FailingHistoryStore;

    #[async_trait]
    impl QueryHistoryStore for FailingHistoryStore {
        async fn append(&self, _record: QueryHistoryRecord) -> Result<(), StoreError> {
            Err(StoreError::Rejected("history backend down".into()))
        }

        async fn list_by_document(
            &self,
            _document_id: &str,
        ) -> Result<Vec<QueryHistoryRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn history_write_failure_does_not_fail_the_query() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/query");
                then.status(200).json_body(serde_json::json!({
                    "answer": "Still answered.",
                    "processingTime": 0.1,
                    "confidence": 0.6
                }));
            })
            .await;

        let documents: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        insert_document(&documents, "doc_1", DocumentStatus::Processed).await;
        let service = QueryService::new(
            documents,
            Arc::new(FailingHistoryStore),
            Arc::new(AiServiceClient {
                client: reqwest::Client::new(),
                base_url: server.base_url(),
            }),
            Arc::new(GatewayMetrics::new()),
        );

        let outcome = service.answer("doc_1", "a query").await.expect("answer");
        assert_eq!(outcome.answer, "Still answered.");
    }
}
