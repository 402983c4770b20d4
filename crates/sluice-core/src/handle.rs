//! # Handles
//!
//! Closed polymorphism over the three pipeline participants. Drivers
//! that hold heterogeneous stages — a wiring table, a teardown list —
//! store them as `Handle`s and use the single status entry point plus
//! the type-safe downcasts.

use crate::duplex::Duplex;
use crate::status::Status;
use crate::stream::Stream;
use crate::value::Value;

// =============================================================================
// HANDLE
// =============================================================================

/// Any pipeline participant.
#[derive(Debug)]
pub enum Handle {
    /// A pullable stage.
    Stream(Stream),
    /// A sink/source pair.
    Duplex(Duplex),
    /// A buffered payload.
    Value(Value),
}

impl Handle {
    /// Apply the status protocol to any handle.
    ///
    /// A value has no independently computable status, so querying one
    /// is always `Err` — the protocol-error analogue of handing a
    /// stage where none exists.
    pub fn apply_status(&mut self, requested: Status) -> Status {
        match self {
            Self::Stream(stream) => stream.apply_status(requested),
            Self::Duplex(duplex) => duplex.apply_status(requested),
            Self::Value(_) => Status::Err,
        }
    }

    /// Downcast to a stream.
    pub fn as_stream_mut(&mut self) -> Option<&mut Stream> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Downcast to a duplex.
    pub fn as_duplex_mut(&mut self) -> Option<&mut Duplex> {
        match self {
            Self::Duplex(duplex) => Some(duplex),
            _ => None,
        }
    }

    /// Consume into a stream.
    #[must_use]
    pub fn into_stream(self) -> Option<Stream> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Consume into a duplex.
    #[must_use]
    pub fn into_duplex(self) -> Option<Duplex> {
        match self {
            Self::Duplex(duplex) => Some(duplex),
            _ => None,
        }
    }

    /// Consume into a value.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Stream> for Handle {
    fn from(stream: Stream) -> Self {
        Self::Stream(stream)
    }
}

impl From<Duplex> for Handle {
    fn from(duplex: Duplex) -> Self {
        Self::Duplex(duplex)
    }
}

impl From<Value> for Handle {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

// =============================================================================
// TESTS
// =============================================================================
