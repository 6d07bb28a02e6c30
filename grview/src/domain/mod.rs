//! Domain model for grview
//!
//! This module contains core domain types and errors that provide:
//! - A single place to build the pprof goroutine URL
//! - Structured error handling for fetching, ingestion, export and the terminal

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::Target;

pub use errors::{ExportError, IngestError, SourceError, TuiError};
