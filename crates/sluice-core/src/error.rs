//! # Error Types
//!
//! Construction-time failures. Everything after construction is
//! expressed through the status protocol — a running pipeline never
//! returns a `Result`, it goes `Err` and stays there.

use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while assembling a pipeline.
///
/// - No silent failures
/// - Factories return `Result<Stream, CoreError>`; they never panic
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A factory argument was empty, zero, or otherwise unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A pipeline was assembled from zero stages.
    #[error("Pipeline has no stages")]
    EmptyPipeline,
}
