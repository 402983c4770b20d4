//! # Error Types
//!
//! Construction-time failures for the adapter factories. Everything
//! after construction surfaces through the status protocol on pull.

use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while setting up the event loop or an adapter.
#[derive(Debug, Error)]
pub enum IoError {
    /// A factory argument was empty, zero, or unparseable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The runtime backing the event loop could not be built.
    #[error("Event loop setup failed: {0}")]
    Setup(#[from] std::io::Error),
}
