//! In-memory store implementations backing the default process wiring.
//!
//! Records live in `RwLock`-guarded vectors shared through `Arc`. Lookups are linear,
//! which is fine at the scale these stores see; insertion order doubles as the stable
//! listing order.

use crate::store::{
    DocumentRecord, DocumentStatus, DocumentStore, QueryHistoryRecord, QueryHistoryStore,
    StoreError, current_timestamp_rfc3339,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<Vec<DocumentRecord>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, record: DocumentRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(StoreError::Rejected(format!(
                "duplicate document id {}",
                record.id
            )));
        }
        records.push(record);
        Ok(())
    }

    async fn get(&self, document_id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|record| record.id == document_id)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
    ) -> Result<DocumentRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| record.id == document_id)
            .ok_or_else(|| StoreError::NotFound(document_id.to_string()))?;
        record.status = status;
        record.updated_at = current_timestamp_rfc3339();
        Ok(record.clone())
    }

    async fn remove(&self, document_id: &str) -> Result<DocumentRecord, StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record.id == document_id)
            .ok_or_else(|| StoreError::NotFound(document_id.to_string()))?;
        Ok(records.remove(index))
    }
}

/// In-memory [`QueryHistoryStore`].
#[derive(Default)]
pub struct InMemoryQueryHistoryStore {
    entries: RwLock<Vec<QueryHistoryRecord>>,
}

impl InMemoryQueryHistoryStore {
    /// Create an empty history log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryHistoryStore for InMemoryQueryHistoryStore {
    async fn append(&self, record: QueryHistoryRecord) -> Result<(), StoreError> {
        self.entries.write().await.push(record);
        Ok(())
    }

    async fn list_by_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<QueryHistoryRecord>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|entry| entry.document_id == document_id)
            .cloned()
            .collect())
    }
}
