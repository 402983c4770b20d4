//! # In-flight Operation State
//!
//! Every adapter may have at most one asynchronous operation
//! outstanding. Encoding the slot as an enum makes that invariant a
//! type-level fact: there is nowhere to put a second request.

// =============================================================================
// INFLIGHT
// =============================================================================

/// State of an adapter's single asynchronous operation slot.
#[derive(Debug)]
pub(crate) enum Inflight<T> {
    /// No operation outstanding; a pull may issue one.
    Idle,
    /// An operation was issued and has not completed. Pulls return
    /// nothing and must not issue another.
    Pending,
    /// The operation completed; its result is waiting for the next
    /// pull.
    Ready(T),
}

// Hand-written so the slot is takeable for payload types that have no
// Default of their own (sockets, io::Result).
impl<T> Default for Inflight<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> Inflight<T> {
    /// True while an operation is outstanding.
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Consume a completed result, resetting the slot to idle.
    pub(crate) fn take_ready(&mut self) -> Option<T> {
        if matches!(self, Self::Ready(_)) {
            match core::mem::take(self) {
                Self::Ready(result) => Some(result),
                _ => None,
            }
        } else {
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_by_default() {
        let slot: Inflight<u8> = Inflight::default();
        assert!(!slot.is_pending());
    }

    #[test]
    fn take_ready_resets_to_idle() {
        let mut slot = Inflight::Ready(42u8);
        assert_eq!(slot.take_ready(), Some(42));
        assert!(matches!(slot, Inflight::Idle));
        assert_eq!(slot.take_ready(), None);
    }

    #[test]
    fn pending_yields_nothing() {
        let mut slot: Inflight<u8> = Inflight::Pending;
        assert!(slot.is_pending());
        assert_eq!(slot.take_ready(), None);
        // Taking from a pending slot must not clobber the pending state.
        assert!(slot.is_pending());
    }
}
