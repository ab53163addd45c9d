//! Observability for the edge response cache.
//!
//! This crate provides:
//! - `CacheLogger` - The logger collaborator (`debug` / `warn`)
//! - `NullLogger` - Null object used when no logger is configured
//! - `TracingLogger` - Bridge to the `tracing` facade
//! - `RecordingLogger` - In-memory capture for assertions and diagnostics

mod logging;

pub use logging::*;
