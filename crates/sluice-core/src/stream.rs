//! # Streams
//!
//! A `Stream` is the workhorse stage: stored [`Status`], an optional
//! owned upstream source, and a boxed [`Operator`] holding the
//! stage-local state. Composition over inheritance: operators never see
//! each other, only the [`Link`] that exposes the shared fields and the
//! two protocol helpers.
//!
//! ## Pull contract
//!
//! `pull(requested)` is synchronous and non-blocking. It returns
//! `Some(Value)` when the stage produced data for this request and
//! `None` otherwise; `None` with status `Ok` means "poll the event loop
//! and pull again", `None` with a terminal status means the stage is
//! finished. Status changes ripple in both directions: terminal source
//! statuses are adopted downstream on the next pull, and a terminal
//! `requested` is pushed upstream through the recursive pull in
//! [`Link::apply`].

use crate::status::Status;
use crate::value::Value;

// =============================================================================
// OPERATOR TRAIT
// =============================================================================

/// Stage-local transform logic.
///
/// Implementations keep their private state in `self` and reach the
/// shared stage fields (status, upstream source) only through the
/// [`Link`] they are handed on every pull.
pub trait Operator {
    /// Produce the next value for this stage, if any.
    ///
    /// Must not block. Side effects on the stage's status go through
    /// the link so the propagation rules hold for every operator.
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value>;
}

// =============================================================================
// LINK
// =============================================================================

/// Split-borrow view of a stage's shared fields, handed to its operator
/// for the duration of one pull.
pub struct Link<'a> {
    status: &'a mut Status,
    source: Option<&'a mut Stream>,
}

impl Link<'_> {
    /// The stage's stored status.
    #[must_use]
    pub fn status(&self) -> Status {
        *self.status
    }

    /// Whether an upstream source is wired.
    #[must_use]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Raw status write, bypassing stickiness.
    ///
    /// Only for documented drain semantics: a stage holding buffered
    /// data (splitter tail, collector output, an unflushed sink write)
    /// reports `Ok` until the buffer has drained, even though its
    /// source already went terminal.
    pub fn force_status(&mut self, status: Status) {
        *self.status = status;
    }

    /// Apply the status protocol to this stage.
    ///
    /// - A stored terminal status wins; `requested` is ignored.
    /// - Otherwise a terminal status on the source is adopted.
    /// - A terminal `requested` is then stored and pushed upstream by
    ///   pulling the source with it; the pulled value (if any) is
    ///   discarded, which is fine because a source being driven
    ///   terminal has nothing left to say.
    ///
    /// Returns the effective status for this request: the stored
    /// terminal value, the terminal `requested`, or `Ok`.
    pub fn apply(&mut self, requested: Status) -> Status {
        if self.status.is_terminal() {
            return *self.status;
        }

        if let Some(source) = &self.source {
            if source.status().is_terminal() {
                *self.status = source.status();
            }
        }

        if requested.is_terminal() {
            *self.status = requested;
            if let Some(source) = &mut self.source {
                let _ = source.pull(requested);
            }
            return requested;
        }

        requested
    }

    /// Pull one value from the upstream source, propagating status both
    /// ways.
    ///
    /// Applies `requested` first and bails on a terminal result. A
    /// stage with no source cannot transform anything, so the absence
    /// of one is an error here — primary sources never call this.
    /// After the source responds, its resulting status is re-applied to
    /// this stage so errors and completion bubble downstream
    /// immediately.
    pub fn pull_source(&mut self, requested: Status) -> Option<Value> {
        if self.apply(requested).is_terminal() {
            return None;
        }

        if self.source.is_none() {
            *self.status = Status::Err;
            return None;
        }

        let (value, after) = match &mut self.source {
            Some(source) => (source.pull(requested), source.status()),
            None => return None,
        };

        self.apply(after);
        value
    }
}

// =============================================================================
// STREAM
// =============================================================================

/// A pullable pipeline stage.
///
/// Owns its upstream source (if any), so dropping the terminal stage of
/// a pipeline releases the whole chain, including any buffered values.
pub struct Stream {
    status: Status,
    source: Option<Box<Stream>>,
    operator: Box<dyn Operator>,
}

impl Stream {
    /// Wrap an operator into a fresh, unwired stage with status `Ok`.
    #[must_use]
    pub fn new(operator: impl Operator + 'static) -> Self {
        Self {
            status: Status::Ok,
            source: None,
            operator: Box::new(operator),
        }
    }

    /// The stored status. Pull-driven: reflects the last interaction,
    /// not any event that completed since.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Wire `source` as this stage's upstream, replacing any previous
    /// wiring.
    pub fn set_source(&mut self, source: Stream) {
        self.source = Some(Box::new(source));
    }

    /// Borrow the upstream source.
    #[must_use]
    pub fn source(&self) -> Option<&Stream> {
        self.source.as_deref()
    }

    /// Mutably borrow the upstream source.
    pub fn source_mut(&mut self) -> Option<&mut Stream> {
        self.source.as_deref_mut()
    }

    /// Unwire and return the upstream source.
    pub fn take_source(&mut self) -> Option<Stream> {
        self.source.take().map(|boxed| *boxed)
    }

    /// Apply the status protocol without invoking the operator.
    pub fn apply_status(&mut self, requested: Status) -> Status {
        let mut link = Link {
            status: &mut self.status,
            source: self.source.as_deref_mut(),
        };
        link.apply(requested)
    }

    /// Request the next value from this stage.
    pub fn pull(&mut self, requested: Status) -> Option<Value> {
        let mut link = Link {
            status: &mut self.status,
            source: self.source.as_deref_mut(),
        };
        self.operator.pull(&mut link, requested)
    }
}

impl core::fmt::Debug for Stream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stream")
            .field("status", &self.status)
            .field("wired", &self.source.is_some())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Emits one fixed byte per pull, forever.
    struct Fixed(u8);

    impl Operator for Fixed {
        fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
            if link.apply(requested).is_terminal() {
                return None;
            }
            Some(Value::from_bytes(vec![self.0]))
        }
    }

    /// Forwards upstream values untouched.
    struct Forward;

    impl Operator for Forward {
        fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
            link.pull_source(requested)
        }
    }

    #[test]
    fn fresh_stream_is_ok_and_unwired() {
        let stream = Stream::new(Fixed(7));
        assert_eq!(stream.status(), Status::Ok);
        assert!(stream.source().is_none());
    }

    #[test]
    fn apply_status_is_sticky() {
        let mut stream = Stream::new(Fixed(7));
        assert_eq!(stream.apply_status(Status::Ok), Status::Ok);
        assert_eq!(stream.apply_status(Status::Done), Status::Done);
        // A later Ok request does not un-terminate the stage.
        assert_eq!(stream.apply_status(Status::Ok), Status::Done);
        assert_eq!(stream.apply_status(Status::Err), Status::Done);
    }

    #[test]
    fn transform_without_source_errors() {
        let mut stream = Stream::new(Forward);
        assert!(stream.pull(Status::Ok).is_none());
        assert_eq!(stream.status(), Status::Err);
    }

    #[test]
    fn terminal_request_propagates_upstream() {
        let mut through = Stream::new(Forward);
        through.set_source(Stream::new(Fixed(1)));

        assert!(through.pull(Status::Ok).is_some());
        assert!(through.pull(Status::Done).is_none());

        assert_eq!(through.status(), Status::Done);
        assert_eq!(through.source().map(Stream::status), Some(Status::Done));
    }

    #[test]
    fn take_source_unwires() {
        let mut through = Stream::new(Forward);
        through.set_source(Stream::new(Fixed(1)));
        let source = through.take_source();
        assert!(source.is_some());
        assert!(through.source().is_none());
    }
}
