//! Diagnostic through stream: hex + ASCII dump of everything forwarded.

use std::io::Write;

use crate::status::Status;
use crate::stream::{Link, Operator, Stream};
use crate::value::Value;

struct HexPrinter<W: Write> {
    output: W,
}

/// Render `data` as rows of 16 bytes: two-digit uppercase hex, an extra
/// space after each 8-byte group, a right-padded final row, and an
/// ASCII gutter with `.` standing in for non-printable bytes.
fn dump_hex<W: Write>(output: &mut W, data: &[u8]) -> std::io::Result<()> {
    let mut ascii = [0u8; 16];

    for (i, byte) in data.iter().enumerate() {
        write!(output, "{byte:02X} ")?;
        ascii[i % 16] = if byte.is_ascii_graphic() || *byte == b' ' {
            *byte
        } else {
            b'.'
        };

        let column = i + 1;
        if column % 8 == 0 || column == data.len() {
            write!(output, " ")?;
            if column % 16 == 0 {
                let text = String::from_utf8_lossy(&ascii);
                writeln!(output, "|  {text} ")?;
            } else if column == data.len() {
                let used = column % 16;
                if used <= 8 {
                    write!(output, " ")?;
                }
                for _ in used..16 {
                    write!(output, "   ")?;
                }
                let text = String::from_utf8_lossy(&ascii[..used]);
                writeln!(output, "|  {text} ")?;
            }
        }
    }

    Ok(())
}

impl<W: Write> Operator for HexPrinter<W> {
    fn pull(&mut self, link: &mut Link<'_>, requested: Status) -> Option<Value> {
        let value = link.pull_source(requested)?;

        if let Some(bytes) = value.bytes() {
            if dump_hex(&mut self.output, bytes).is_err() {
                // A dead output sink is an I/O failure like any other.
                link.apply(Status::Err);
                return None;
            }
        }

        Some(value)
    }
}

/// Pass-through that dumps every forwarded value to `output` before
/// handing it on. Does not terminate the output sink, so stdout and
/// stderr are fine targets. A write failure reports `Err` and destroys
/// the value in flight.
#[must_use]
pub fn hex_printer(output: impl Write + 'static) -> Stream {
    Stream::new(HexPrinter { output })
}

// =============================================================================
// TESTS
// =============================================================================
