#![deny(missing_docs)]

//! Core library for the student registry HTTP service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging, tracing setup, and request logging middleware.
pub mod logging;
/// Student records, validation, and the in-memory store.
pub mod students;
/// Summary generation through an external text generation service.
pub mod summarization;
