//! # Pipeline Assembly
//!
//! Chains stages source-to-sink and hands back the terminal stage.
//! Ownership follows the wiring: each stage owns its upstream, so the
//! returned stage owns the whole chain and dropping it tears the
//! pipeline down.

use crate::error::CoreError;
use crate::stream::Stream;

// =============================================================================
// PIPELINE
// =============================================================================

/// Wire `stages` in order — first is the primary source, last is the
/// terminal stage — and return the terminal stage.
///
/// # Errors
/// Returns `CoreError::EmptyPipeline` when `stages` yields nothing.
pub fn pipeline(stages: impl IntoIterator<Item = Stream>) -> Result<Stream, CoreError> {
    let mut stages = stages.into_iter();
    let mut head = stages.next().ok_or(CoreError::EmptyPipeline)?;

    for mut next in stages {
        next.set_source(head);
        head = next;
    }

    Ok(head)
}

// =============================================================================
// TESTS
// =============================================================================
