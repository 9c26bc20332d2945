#![deny(missing_docs)]

//! Core library for the DocuMind gateway.
//!
//! The gateway accepts document uploads over HTTP, stores metadata, hands the file to an
//! external AI service for processing, and answers natural-language queries against
//! processed documents by delegating to that same service.

/// HTTP client boundary to the external AI service.
pub mod ai;
/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Document lifecycle management and upload validation.
pub mod documents;
/// Service wiring and the gateway API trait.
pub mod gateway;
/// Structured logging and tracing setup.
pub mod logging;
/// Gateway activity counters.
pub mod metrics;
/// Query orchestration and history recording.
pub mod query;
/// Store traits and in-memory implementations.
pub mod store;
