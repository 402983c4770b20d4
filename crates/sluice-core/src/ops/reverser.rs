//! Byte-reversing through stream.

use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct Reverser;

impl Operator for Reverser {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        if link.apply(requested).is_terminal() {
            return None;
        }

        let mut value = link.pull_source(Status::Ok)?;
        if let Some(bytes) = value.bytes_mut() {
            bytes.reverse();
        }
        Some(value)
    }
}

/// Reverses each value's bytes in place and forwards it — no
/// allocation. Empty values pass through unchanged.
#[must_use]
pub fn reverser() -> Stream {
    Stream::new(Reverser)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::single_value;
    use crate::pipeline::pipeline;

    fn reverse_of(input: &[u8]) -> Vec<u8> {
        let source = single_value(input).expect("source");
        let mut chain = pipeline([source, reverser()]).expect("pipeline");
        chain
            .pull(Status::Ok)
            .expect("value")
            .into_bytes()
            .expect("bytes")
    }

    #[test]
    fn odd_length() {
        assert_eq!(reverse_of(b"hello"), b"olleh".to_vec());
    }

    #[test]
    fn even_length() {
        assert_eq!(reverse_of(b"hello!"), b"!olleh".to_vec());
    }

    #[test]
    fn single_byte() {
        assert_eq!(reverse_of(b"x"), b"x".to_vec());
    }

    #[test]
    fn exhausted_source_completes() {
        let source = single_value(b"ab").expect("source");
        let mut chain = pipeline([source, reverser()]).expect("pipeline");
        assert!(chain.pull(Status::Ok).is_some());
        assert!(chain.pull(Status::Ok).is_none());
        assert_eq!(chain.status(), Status::Done);
    }
}
