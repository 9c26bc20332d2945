//! Document lifecycle management.
//!
//! Owns the upload path (validation, file persistence, record creation) and the
//! background state machine `uploaded → processing → processed | failed`.

mod service;
pub mod sniff;
mod types;

pub use service::DocumentService;
pub use types::{DocumentError, LifecycleSettings, UploadRequest};
