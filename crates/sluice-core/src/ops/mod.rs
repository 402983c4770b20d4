//! # Synchronous Operators
//!
//! The built-in stage library. One factory per operator; each returns a
//! wired-up [`Stream`](crate::Stream) (or `Result` where construction
//! can fail on bad arguments).
//!
//! Sources: [`counter`], [`single_value`], [`user_value`].
//! Transforms: [`nooper`], [`multiplier`], [`reverser`], [`taker`],
//! [`splitter`], [`collector`], [`hex_printer`].

mod collector;
mod counter;
mod hex_printer;
mod multiplier;
mod nooper;
mod reverser;
mod single_value;
mod splitter;
mod taker;
mod user_value;

pub use collector::collector;
pub use counter::counter;
pub use hex_printer::hex_printer;
pub use multiplier::multiplier;
pub use nooper::nooper;
pub use reverser::reverser;
pub use single_value::single_value;
pub use splitter::splitter;
pub use taker::taker;
pub use user_value::{UserValueHandle, user_value};
