//! HTTP boundary to the external AI service.
//!
//! Two remote calls live behind this module: submitting a document for processing and
//! answering a natural-language query. The client is a thin `reqwest` wrapper with no
//! retries, caching, or circuit breaking; failure policy belongs to the callers.

mod client;
mod types;

pub use client::AiServiceClient;
pub use types::{AiClientError, ProcessAck, QueryAnswer, SourceCitation};
