//! # sluice-io
//!
//! Event-loop adapters for the sluice pull engine - THE EDGE.
//!
//! Everything here bridges asynchronous completion into the synchronous
//! pull contract of `sluice-core`: a pull on an adapter stage is
//! non-blocking and returns nothing until the corresponding completion
//! task has fired and stored a result.
//!
//! ## Driving pattern
//!
//! ```no_run
//! use sluice_core::{Status, pipeline};
//! use sluice_io::{EventLoop, file_sink, file_source};
//!
//! # fn main() -> Result<(), sluice_io::IoError> {
//! let event_loop = EventLoop::new()?;
//! let source = file_source("in.bin", &event_loop)?;
//! let sink = file_sink("out.bin", &event_loop)?;
//! let mut chain = pipeline([source, sink]).expect("two stages");
//!
//! while chain.status() == Status::Ok {
//!     event_loop.poll();
//!     let _ = chain.pull(Status::Ok);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architectural Constraints
//!
//! - One logical thread of control: the runtime is current-thread and
//!   completion tasks only run inside [`EventLoop::poll`]
//! - No wake mechanism: liveness depends on the caller's poll cadence
//! - At most one async operation in flight per adapter, enforced by
//!   the typed in-flight slot

// =============================================================================
// MODULES
// =============================================================================

pub mod error;
pub mod event_loop;
pub mod file;
pub mod tcp;

mod inflight;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use error::IoError;
pub use event_loop::{EventLoop, LoopHandle};
pub use file::{file_sink, file_source};
pub use tcp::{TcpServerHandle, tcp_client, tcp_server};
