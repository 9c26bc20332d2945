//! Top-level service wiring and the trait the HTTP surface consumes.

use crate::{
    ai::{AiClientError, AiServiceClient},
    config::get_config,
    documents::{DocumentError, DocumentService, LifecycleSettings, UploadRequest},
    metrics::{GatewayMetrics, MetricsSnapshot},
    query::{QueryError, QueryOutcome, QueryService},
    store::{
        DocumentRecord, DocumentStore, InMemoryDocumentStore, InMemoryQueryHistoryStore,
        QueryHistoryStore,
    },
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Abstraction over the gateway's operations used by the HTTP surface.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Validate and persist an upload, scheduling background processing.
    async fn submit(&self, upload: UploadRequest) -> Result<DocumentRecord, DocumentError>;

    /// Fetch a single document record.
    async fn get_document(&self, document_id: &str) -> Result<DocumentRecord, DocumentError>;

    /// List the documents belonging to an owner.
    async fn list_documents(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, DocumentError>;

    /// Delete a document's file and metadata record.
    async fn delete_document(&self, document_id: &str) -> Result<(), DocumentError>;

    /// Answer a query against a processed document.
    async fn answer_query(
        &self,
        document_id: &str,
        query_text: &str,
    ) -> Result<QueryOutcome, QueryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Concrete gateway wiring: in-memory stores, one AI client, shared metrics.
///
/// Construct once near process start and share through an `Arc`; the document and
/// query services reuse the same store and client handles.
pub struct GatewayService {
    documents: DocumentService,
    queries: QueryService,
    metrics: Arc<GatewayMetrics>,
}

impl GatewayService {
    /// Build the gateway from the environment-derived configuration.
    pub fn new() -> Result<Self, AiClientError> {
        let config = get_config();
        let document_store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let history_store: Arc<dyn QueryHistoryStore> = Arc::new(InMemoryQueryHistoryStore::new());
        let ai_client = Arc::new(AiServiceClient::new()?);
        let metrics = Arc::new(GatewayMetrics::new());

        let documents = DocumentService::new(
            Arc::clone(&document_store),
            Arc::clone(&ai_client),
            Arc::clone(&metrics),
            LifecycleSettings {
                upload_dir: PathBuf::from(&config.upload_dir),
                max_upload_bytes: config.max_upload_bytes,
                processing_concurrency: config.processing_concurrency,
            },
        );
        let queries = QueryService::new(document_store, history_store, ai_client, Arc::clone(&metrics));

        Ok(Self {
            documents,
            queries,
            metrics,
        })
    }
}

#[async_trait]
impl GatewayApi for GatewayService {
    async fn submit(&self, upload: UploadRequest) -> Result<DocumentRecord, DocumentError> {
        self.documents.submit(upload).await
    }

    async fn get_document(&self, document_id: &str) -> Result<DocumentRecord, DocumentError> {
        self.documents.get(document_id).await
    }

    async fn list_documents(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, DocumentError> {
        self.documents.list(owner_id).await
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), DocumentError> {
        self.documents.delete(document_id).await
    }

    async fn answer_query(
        &self,
        document_id: &str,
        query_text: &str,
    ) -> Result<QueryOutcome, QueryError> {
        self.queries.answer(document_id, query_text).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
