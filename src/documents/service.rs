//! Lifecycle manager coordinating validation, file persistence, and background processing.

use crate::{
    ai::AiServiceClient,
    documents::{
        sniff,
        types::{DocumentError, LifecycleSettings, UploadRequest},
    },
    metrics::GatewayMetrics,
    store::{DocumentRecord, DocumentStatus, DocumentStore, current_timestamp_rfc3339},
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Owns the state machine of a document from upload through processing.
///
/// `submit` returns as soon as the record is durably `uploaded`; the transition to
/// `processing` and the remote AI call happen on a spawned task gated by a semaphore,
/// so the request path never blocks on the AI service and the number of in-flight
/// processing attempts stays bounded.
///
/// This service is the only writer of a record's `status` field. Every id is generated
/// fresh per upload, so there is never more than one processing attempt per id.
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    ai_client: Arc<AiServiceClient>,
    metrics: Arc<GatewayMetrics>,
    settings: LifecycleSettings,
    processing_permits: Arc<Semaphore>,
}

impl DocumentService {
    /// Build a lifecycle manager over the given store and AI client.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        ai_client: Arc<AiServiceClient>,
        metrics: Arc<GatewayMetrics>,
        settings: LifecycleSettings,
    ) -> Self {
        let processing_permits = Arc::new(Semaphore::new(settings.processing_concurrency.max(1)));
        Self {
            store,
            ai_client,
            metrics,
            settings,
            processing_permits,
        }
    }

    /// Validate an upload, persist the file and metadata record, and schedule processing.
    ///
    /// Validation happens before any persistence: a rejected upload leaves no file and
    /// no record behind. The returned record is always in the `uploaded` state.
    pub async fn submit(&self, upload: UploadRequest) -> Result<DocumentRecord, DocumentError> {
        let file_type = self.validate(&upload.bytes)?;

        let document_id = format!("doc_{}", Uuid::new_v4());
        let file_name = format!(
            "{document_id}{}",
            original_extension(&upload.original_file_name)
        );

        tokio::fs::create_dir_all(&self.settings.upload_dir).await?;
        let file_path = self.settings.upload_dir.join(&file_name);
        tokio::fs::write(&file_path, &upload.bytes).await?;
        tracing::info!(%document_id, path = %file_path.display(), "File saved");

        let now = current_timestamp_rfc3339();
        let record = DocumentRecord {
            id: document_id,
            file_name,
            original_file_name: upload.original_file_name,
            file_size: upload.bytes.len() as u64,
            file_type: file_type.to_string(),
            owner_id: upload.owner_id,
            status: DocumentStatus::Uploaded,
            created_at: now.clone(),
            updated_at: now,
        };
        self.store.insert(record.clone()).await?;
        self.metrics.record_upload();

        self.spawn_processing(
            record.id.clone(),
            file_path.to_string_lossy().into_owned(),
        );

        Ok(record)
    }

    /// Fetch a document record by id.
    pub async fn get(&self, document_id: &str) -> Result<DocumentRecord, DocumentError> {
        self.store
            .get(document_id)
            .await?
            .ok_or_else(|| DocumentError::NotFound(document_id.to_string()))
    }

    /// List all documents belonging to an owner, in upload order.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, DocumentError> {
        Ok(self.store.list_by_owner(owner_id).await?)
    }

    /// Remove a document's stored file and metadata record.
    ///
    /// A missing or undeletable file is logged and skipped; only a failing
    /// metadata delete fails the operation.
    pub async fn delete(&self, document_id: &str) -> Result<(), DocumentError> {
        let record = self.get(document_id).await?;

        let file_path = self.settings.upload_dir.join(&record.file_name);
        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => tracing::debug!(document_id, "Stored file removed"),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(document_id, "Stored file already missing during delete");
            }
            Err(error) => {
                tracing::warn!(document_id, error = %error, "Failed to remove stored file; deleting metadata anyway");
            }
        }

        self.store.remove(document_id).await?;
        tracing::info!(document_id, "Document deleted");
        Ok(())
    }

    fn validate(&self, bytes: &[u8]) -> Result<&'static str, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Validation("File is empty".to_string()));
        }
        if bytes.len() as u64 > self.settings.max_upload_bytes {
            return Err(DocumentError::Validation(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.settings.max_upload_bytes
            )));
        }
        sniff::detect_content_type(bytes).ok_or_else(|| {
            DocumentError::Validation(
                "Invalid file type. Only PDF, DOCX, and TXT files are allowed".to_string(),
            )
        })
    }

    fn spawn_processing(&self, document_id: String, file_path: String) {
        let store = Arc::clone(&self.store);
        let ai_client = Arc::clone(&self.ai_client);
        let metrics = Arc::clone(&self.metrics);
        let permits = Arc::clone(&self.processing_permits);

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                // Closed semaphore means the process is shutting down.
                Err(_) => return,
            };
            run_processing(store, ai_client, metrics, document_id, file_path).await;
        });
    }
}

/// Advance one document through the background half of the state machine.
///
/// The `processing` write happens before the remote call; any failure afterwards is
/// captured into the `failed` state so a document is never left ambiguously stuck.
async fn run_processing(
    store: Arc<dyn DocumentStore>,
    ai_client: Arc<AiServiceClient>,
    metrics: Arc<GatewayMetrics>,
    document_id: String,
    file_path: String,
) {
    if let Err(error) = store
        .set_status(&document_id, DocumentStatus::Processing)
        .await
    {
        tracing::warn!(%document_id, error = %error, "Document vanished before processing started");
        mark_failed(store.as_ref(), &metrics, &document_id).await;
        return;
    }

    match ai_client.process_document(&document_id, &file_path).await {
        Ok(_ack) => match store
            .set_status(&document_id, DocumentStatus::Processed)
            .await
        {
            Ok(_) => {
                metrics.record_processed();
                tracing::info!(%document_id, "Document processed successfully");
            }
            Err(error) => {
                tracing::warn!(%document_id, error = %error, "Document vanished after processing completed");
                metrics.record_failed();
            }
        },
        Err(error) => {
            tracing::error!(%document_id, error = %error, "Error processing document");
            mark_failed(store.as_ref(), &metrics, &document_id).await;
        }
    }
}

/// Best-effort transition to `failed`; the record may already be gone.
async fn mark_failed(store: &dyn DocumentStore, metrics: &GatewayMetrics, document_id: &str) {
    if let Err(error) = store.set_status(document_id, DocumentStatus::Failed).await {
        tracing::warn!(document_id, error = %error, "Could not mark document as failed");
    }
    metrics.record_failed();
}

/// Extension of the client-supplied file name, including the leading dot.
fn original_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
