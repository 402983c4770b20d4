//! # sluice-core
//!
//! The deterministic pull engine for Sluice - THE LOGIC.
//!
//! This crate implements the CORE protocol - a pull-based,
//! backpressure-native stream composition engine: three handle kinds
//! (stream, duplex, value), a tri-state status protocol, and a library
//! of synchronous operators that compose into pipelines.
//!
//! ## Pull model
//!
//! A driver repeatedly calls [`Stream::pull`] on the terminal stage of
//! a pipeline. Each stage pulls its upstream source, transforms or
//! buffers the result, and returns either a value or nothing. Nothing
//! plus status `Ok` means "try again later" — the convention that
//! stands in for blocking. Asynchronous adapters (see the `sluice-io`
//! crate) obey the same contract, returning nothing until an external
//! event loop has completed the pending operation.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is pure Rust: no async, no network dependencies, no clocks
//! - Is single-threaded: one logical thread of control, no locking
//! - Never blocks: every pull returns immediately
//! - Never panics: construction errors are `Result`s, runtime failures
//!   are `Status::Err`

// =============================================================================
// MODULES
// =============================================================================

pub mod duplex;
pub mod error;
pub mod handle;
pub mod ops;
pub mod pipeline;
pub mod status;
pub mod stream;
pub mod value;

// =============================================================================
// RE-EXPORTS: Protocol Types
// =============================================================================

pub use duplex::Duplex;
pub use error::CoreError;
pub use handle::Handle;
pub use status::Status;
pub use stream::{Link, Operator, Stream};
pub use value::{Payload, Value};

// =============================================================================
// RE-EXPORTS: Assembly
// =============================================================================

pub use pipeline::pipeline;
