//! Inputs, settings, and error definitions for the document lifecycle.

use crate::ai::AiClientError;
use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors emitted by the document lifecycle manager.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Upload rejected before any persistence occurred.
    #[error("Invalid upload: {0}")]
    Validation(String),
    /// Referenced document id does not exist.
    #[error("Document {0} not found")]
    NotFound(String),
    /// Filesystem interaction with the upload directory failed.
    #[error("Upload storage failure: {0}")]
    Io(#[from] std::io::Error),
    /// The metadata store rejected a write.
    #[error("Document store failure: {0}")]
    Store(StoreError),
    /// The AI service call failed.
    #[error("AI service failure: {0}")]
    Upstream(#[from] AiClientError),
}

impl From<StoreError> for DocumentError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// An upload as received from the HTTP surface, prior to validation.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw file payload.
    pub bytes: Vec<u8>,
    /// File name supplied by the client; only its extension is trusted.
    pub original_file_name: String,
    /// Identifier of the uploading user.
    pub owner_id: String,
}

/// Explicit settings for the lifecycle manager, passed at construction.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Directory uploaded files are written to.
    pub upload_dir: PathBuf,
    /// Maximum accepted payload size in bytes.
    pub max_upload_bytes: u64,
    /// Upper bound on concurrent background processing attempts.
    pub processing_concurrency: usize,
}
