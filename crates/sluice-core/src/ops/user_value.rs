//! Externally fed source.

use std::cell::RefCell;
use std::rc::Rc;

use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

type Slot = Rc<RefCell<Option<Value>>>;

struct UserValue {
    slot: Slot,
}

impl Operator for UserValue {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        match link.apply(requested) {
            Status::Ok => self.slot.borrow_mut().take(),
            Status::Err => {
                // Failed stages surrender whatever was queued.
                self.slot.borrow_mut().take();
                None
            }
            // A finished stage still hands over a late injection; the
            // feeder side is allowed to outlive the stream's lifecycle.
            Status::Done => self.slot.borrow_mut().take(),
        }
    }
}

// =============================================================================
// FEEDER HANDLE
// =============================================================================

/// Feeder side of a [`user_value`] source. Cloneable; injecting a new
/// value replaces any value still queued.
#[derive(Clone)]
pub struct UserValueHandle {
    slot: Slot,
}

impl UserValueHandle {
    /// Queue a copy of `text`'s bytes as the next value.
    pub fn set_str(&self, text: &str) {
        self.set_bytes(text.as_bytes());
    }

    /// Queue a copy of `bytes` as the next value.
    ///
    /// The bytes land in a fresh heap buffer so the emitted value owns
    /// its payload like every other producer's.
    pub fn set_bytes(&self, bytes: &[u8]) {
        *self.slot.borrow_mut() = Some(Value::from_bytes(bytes.to_vec()));
    }
}

/// Source whose values are injected by external code, at any time —
/// even after the stage has drained to `Done`. A pull with nothing
/// queued returns `None` with status `Ok`.
#[must_use]
pub fn user_value() -> (Stream, UserValueHandle) {
    let slot: Slot = Rc::new(RefCell::new(None));
    let stream = Stream::new(UserValue {
        slot: Rc::clone(&slot),
    });
    (stream, UserValueHandle { slot })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_stays_ok() {
        let (mut source, _feeder) = user_value();
        assert!(source.pull(Status::Ok).is_none());
        assert_eq!(source.status(), Status::Ok);
    }

    #[test]
    fn injected_text_comes_back_out() {
        let (mut source, feeder) = user_value();
        feeder.set_str("first");

        let value = source.pull(Status::Ok).expect("value");
        assert_eq!(value.bytes(), Some(b"first".as_slice()));

        // Drained again; still Ok, still re-armable.
        assert!(source.pull(Status::Ok).is_none());
        feeder.set_str("second");
        let value = source.pull(Status::Ok).expect("value");
        assert_eq!(value.bytes(), Some(b"second".as_slice()));
    }

    #[test]
    fn reinjection_replaces_the_queued_value() {
        let (mut source, feeder) = user_value();
        feeder.set_str("stale");
        feeder.set_str("fresh");
        let value = source.pull(Status::Ok).expect("value");
        assert_eq!(value.bytes(), Some(b"fresh".as_slice()));
    }

    #[test]
    fn injection_after_done_still_drains() {
        let (mut source, feeder) = user_value();
        assert_eq!(source.apply_status(Status::Done), Status::Done);

        feeder.set_bytes(b"late");
        let value = source.pull(Status::Ok).expect("value");
        assert_eq!(value.bytes(), Some(b"late".as_slice()));
        assert_eq!(source.status(), Status::Done);
    }

    #[test]
    fn err_discards_the_queued_value() {
        let (mut source, feeder) = user_value();
        feeder.set_str("doomed");
        assert!(source.pull(Status::Err).is_none());
        assert!(source.pull(Status::Ok).is_none());
        assert_eq!(source.status(), Status::Err);
    }
}
