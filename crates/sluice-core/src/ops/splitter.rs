//! Delimiter-splitting through stream.

use crate::error::CoreError;
use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct Splitter {
    delimiter: Vec<u8>,
    /// Bytes pulled from upstream but not yet emitted.
    buffer: Vec<u8>,
}

impl Splitter {
    /// First complete delimiter occurrence in the pending buffer.
    fn find_delimiter(&self) -> Option<usize> {
        if self.buffer.len() < self.delimiter.len() {
            return None;
        }
        self.buffer
            .windows(self.delimiter.len())
            .position(|window| window == self.delimiter)
    }

    /// Emit the chunk before `at`, consuming it and the delimiter.
    fn emit_chunk(&mut self, at: usize) -> Value {
        let mut chunk: Vec<u8> = self.buffer.drain(..at + self.delimiter.len()).collect();
        chunk.truncate(at);
        Value::from_bytes(chunk)
    }
}

impl Operator for Splitter {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        match link.apply(requested) {
            Status::Err => {
                self.buffer.clear();
                return None;
            }
            Status::Done => {
                if self.buffer.is_empty() {
                    return None;
                }
                // Hold Ok until the buffered tail has drained.
                link.force_status(Status::Ok);
            }
            Status::Ok => {}
        }

        loop {
            if let Some(at) = self.find_delimiter() {
                return Some(self.emit_chunk(at));
            }

            match link.pull_source(Status::Ok) {
                Some(value) => {
                    let Some(bytes) = value.into_bytes() else {
                        link.apply(Status::Err);
                        self.buffer.clear();
                        return None;
                    };
                    self.buffer.extend_from_slice(&bytes);
                }
                None => {
                    return match link.status() {
                        // Upstream exhausted: flush the partial tail
                        // once, reporting Ok for this final chunk.
                        Status::Done if !self.buffer.is_empty() => {
                            link.force_status(Status::Ok);
                            Some(Value::from_bytes(core::mem::take(&mut self.buffer)))
                        }
                        Status::Err => {
                            self.buffer.clear();
                            None
                        }
                        // Nothing available yet; retry after the next
                        // event-loop poll.
                        _ => None,
                    };
                }
            }
        }
    }
}

/// Splits the upstream byte flow on `delimiter` (any length ≥ 1),
/// emitting one chunk per pull. Consecutive delimiters yield empty
/// chunks. When upstream finishes, any partial tail is flushed once,
/// then the stage reports `Done`.
///
/// # Errors
/// Returns `CoreError::InvalidArgument` for an empty delimiter.
pub fn splitter(delimiter: &[u8]) -> Result<Stream, CoreError> {
    if delimiter.is_empty() {
        return Err(CoreError::InvalidArgument("delimiter"));
    }

    Ok(Stream::new(Splitter {
        delimiter: delimiter.to_vec(),
        buffer: Vec::new(),
    }))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::single_value;
    use crate::pipeline::pipeline;

    fn split_all(input: &[u8], delimiter: &[u8]) -> (Vec<Vec<u8>>, Status) {
        let source = single_value(input).expect("source");
        let split = splitter(delimiter).expect("splitter");
        let mut chain = pipeline([source, split]).expect("pipeline");

        let mut chunks = Vec::new();
        while let Some(value) = chain.pull(Status::Ok) {
            chunks.push(value.into_bytes().expect("bytes"));
        }
        (chunks, chain.status())
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        assert_eq!(
            splitter(b"").err(),
            Some(CoreError::InvalidArgument("delimiter"))
        );
    }

    #[test]
    fn splits_on_newline() {
        let (chunks, status) = split_all(b"hello\nworld", b"\n");
        assert_eq!(chunks, vec![b"hello".to_vec(), b"world".to_vec()]);
        assert_eq!(status, Status::Done);
    }

    #[test]
    fn splits_on_multi_byte_delimiter() {
        let (chunks, status) = split_all(b"hello\r\n\r\nworld", b"\r\n\r\n");
        assert_eq!(chunks, vec![b"hello".to_vec(), b"world".to_vec()]);
        assert_eq!(status, Status::Done);
    }

    #[test]
    fn consecutive_delimiters_yield_empty_chunks() {
        let (chunks, status) = split_all(b"a\n\nb", b"\n");
        assert_eq!(
            chunks,
            vec![b"a".to_vec(), b"".to_vec(), b"b".to_vec()]
        );
        assert_eq!(status, Status::Done);
    }

    #[test]
    fn trailing_delimiter_emits_no_tail() {
        let (chunks, status) = split_all(b"one\ntwo\n", b"\n");
        assert_eq!(chunks, vec![b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(status, Status::Done);
    }

    #[test]
    fn delimiter_free_input_flushes_once() {
        let (chunks, status) = split_all(b"monolith", b"\n");
        assert_eq!(chunks, vec![b"monolith".to_vec()]);
        assert_eq!(status, Status::Done);
    }

    #[test]
    fn unwired_splitter_errors() {
        let mut lone = splitter(b"\n").expect("splitter");
        assert!(lone.pull(Status::Ok).is_none());
        assert_eq!(lone.status(), Status::Err);
    }
}
