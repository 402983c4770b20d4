//! Multiplying transform over 8-byte unsigned values.

use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct Multiplier {
    scale: u64,
}

impl Operator for Multiplier {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        let input = link.pull_source(requested)?;

        // Anything without at least one u64 of payload is malformed.
        let word = input.bytes().and_then(|bytes| bytes.get(..8));
        let Some(word) = word else {
            link.apply(Status::Err);
            return None;
        };

        let mut raw = [0u8; 8];
        raw.copy_from_slice(word);
        let product = u64::from_le_bytes(raw).wrapping_mul(self.scale);

        Some(Value::from_bytes(product.to_le_bytes().to_vec()))
    }
}

/// Pulls one 8-byte little-endian unsigned value per request and emits
/// its product with `scale`. An upstream value shorter than 8 bytes
/// reports `Err` and destroys the input.
#[must_use]
pub fn multiplier(scale: u64) -> Stream {
    Stream::new(Multiplier { scale })
}

// =============================================================================
// TESTS
// =============================================================================
