//! Persistence boundaries for document metadata and query history.
//!
//! The gateway treats storage technology as an external concern: components depend on the
//! [`DocumentStore`] and [`QueryHistoryStore`] traits, and the process wires in the in-memory
//! implementations from [`memory`]. Only the document lifecycle manager writes `status`;
//! the query orchestrator appends history and never mutates existing entries.

pub mod memory;
mod types;

pub use memory::{InMemoryDocumentStore, InMemoryQueryHistoryStore};
pub use types::{
    DocumentRecord, DocumentStatus, QueryHistoryRecord, StoreError, current_timestamp_rfc3339,
};

use async_trait::async_trait;

/// Metadata store for uploaded documents, keyed by document id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a newly created record. The id must not already exist.
    async fn insert(&self, record: DocumentRecord) -> Result<(), StoreError>;

    /// Fetch a record by id, returning `None` when absent.
    async fn get(&self, document_id: &str) -> Result<Option<DocumentRecord>, StoreError>;

    /// Return all records belonging to the owner, in insertion order.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, StoreError>;

    /// Update the lifecycle status of a record, refreshing its `updated_at` timestamp.
    ///
    /// Fails with [`StoreError::NotFound`] when the record has vanished (for example,
    /// deleted while a processing attempt was in flight).
    async fn set_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
    ) -> Result<DocumentRecord, StoreError>;

    /// Remove a record, returning it. Fails with [`StoreError::NotFound`] when absent.
    async fn remove(&self, document_id: &str) -> Result<DocumentRecord, StoreError>;
}

/// Append-only audit log pairing queries with their answers.
#[async_trait]
pub trait QueryHistoryStore: Send + Sync {
    /// Append one history entry. Entries are never mutated or deleted.
    async fn append(&self, record: QueryHistoryRecord) -> Result<(), StoreError>;

    /// Return all entries recorded for a document id, oldest first.
    ///
    /// The reference is non-owning: entries survive document deletion.
    async fn list_by_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<QueryHistoryRecord>, StoreError>;
}
