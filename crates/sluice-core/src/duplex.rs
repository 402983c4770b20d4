//! # Duplex
//!
//! A paired sink/source representing one bidirectional channel, such as
//! a connected socket: the `sink` half accepts externally bound data,
//! the `source` half produces externally arriving data.
//!
//! The duplex is a shell around its two halves. Callers may drive the
//! halves in place (`sink_mut`/`source_mut`) or take them out entirely
//! to wire them into larger pipelines — an echo loop takes both halves
//! and feeds the sink from the source.

use crate::status::Status;
use crate::stream::Stream;

// =============================================================================
// DUPLEX
// =============================================================================

/// A sink/source pair with its own stored status.
#[derive(Debug, Default)]
pub struct Duplex {
    status: Status,
    sink: Option<Stream>,
    source: Option<Stream>,
}

impl Duplex {
    /// An empty shell; reports `Err` until both halves are set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a duplex from its two halves.
    #[must_use]
    pub fn from_halves(sink: Stream, source: Stream) -> Self {
        Self {
            status: Status::Ok,
            sink: Some(sink),
            source: Some(source),
        }
    }

    /// The stored status from the last protocol interaction.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Install the write-path half.
    pub fn set_sink(&mut self, sink: Stream) {
        self.sink = Some(sink);
    }

    /// Install the read-path half.
    pub fn set_source(&mut self, source: Stream) {
        self.source = Some(source);
    }

    /// Mutably borrow the write-path half.
    pub fn sink_mut(&mut self) -> Option<&mut Stream> {
        self.sink.as_mut()
    }

    /// Mutably borrow the read-path half.
    pub fn source_mut(&mut self) -> Option<&mut Stream> {
        self.source.as_mut()
    }

    /// Remove and return the write-path half.
    pub fn take_sink(&mut self) -> Option<Stream> {
        self.sink.take()
    }

    /// Remove and return the read-path half.
    pub fn take_source(&mut self) -> Option<Stream> {
        self.source.take()
    }

    /// Apply the status protocol to the pair.
    ///
    /// `Err` when either half is missing, and that `Err` is written
    /// into the duplex's own status field. With both halves present,
    /// each is queried with `requested`; `Err` on either half
    /// dominates, then `Done`, else `Ok`. One half `Done` while the
    /// other is still `Ok` reports `Done` — a channel whose write or
    /// read direction has finished is finished as a conversation.
    /// Terminal results are sticky.
    pub fn apply_status(&mut self, requested: Status) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }

        let (Some(sink), Some(source)) = (&mut self.sink, &mut self.source) else {
            self.status = Status::Err;
            return Status::Err;
        };

        let sink_status = sink.apply_status(requested);
        let source_status = source.apply_status(requested);

        let effective = if sink_status == Status::Err || source_status == Status::Err {
            Status::Err
        } else if sink_status == Status::Done || source_status == Status::Done {
            Status::Done
        } else {
            Status::Ok
        };

        if effective.is_terminal() {
            self.status = effective;
        }
        effective
    }
}

// =============================================================================
// TESTS
// =============================================================================
