//! Counting source: successive `u64` values, one per pull.

use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct Counter {
    next: u64,
}

impl Operator for Counter {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if link.apply(requested).is_terminal() {
            return None;
        }

        let value = Value::from_bytes(self.next.to_le_bytes().to_vec());
        self.next = self.next.wrapping_add(1);
        Some(value)
    }
}

/// Infinite source of successive unsigned 64-bit integers, starting at
/// 0, emitted as 8-byte little-endian values. Ignores any upstream.
#[must_use]
pub fn counter() -> Stream {
    Stream::new(Counter { next: 0 })
}

// =============================================================================
// TESTS
// =============================================================================
