//! Accumulating sink-side transform: one big value out at the end.

use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct Collector {
    /// `Some` while accumulating; taken when the buffer is emitted.
    buffer: Option<Vec<u8>>,
}

impl Operator for Collector {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if link.status().is_terminal() {
            return None;
        }

        if self.buffer.is_none() {
            // Already emitted; completion is the only thing left.
            link.apply(Status::Done);
            return None;
        }

        let value = link.pull_source(requested);

        match link.status() {
            // Drop the partial buffer on failure.
            Status::Err => {
                self.buffer = None;
                None
            }

            // Keep accumulating; nothing leaves until the source ends.
            Status::Ok => {
                if let Some(value) = value {
                    let Some(bytes) = value.into_bytes() else {
                        link.apply(Status::Err);
                        self.buffer = None;
                        return None;
                    };
                    if let Some(buffer) = &mut self.buffer {
                        buffer.extend_from_slice(&bytes);
                    }
                }
                None
            }

            // Source finished: emit everything, exactly once. This pull
            // reports Ok so the caller treats the buffer as live data;
            // the next pull observes Done.
            Status::Done => {
                let buffer = self.buffer.take()?;
                link.force_status(Status::Ok);
                Some(Value::from_bytes(buffer))
            }
        }
    }
}

/// Concatenates every upstream value until the source reports `Done`,
/// then emits the full buffer exactly once (status `Ok` on that pull,
/// `Done` thereafter). Upstream `Err` discards the partial buffer.
#[must_use]
pub fn collector() -> Stream {
    Stream::new(Collector {
        buffer: Some(Vec::new()),
    })
}

// =============================================================================
// TESTS
// =============================================================================
