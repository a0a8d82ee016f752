//! Walker for chunked resource streams.
//!
//! A chunk stream is a concatenation of `(u16 type, u32 length,
//! payload[length])` records. Each resource declares its own terminating
//! type code; everything else about the stream is decoder-defined.

use crate::cursor::Cursor;
use crate::diag::{DiagnosticSink, Warning};
use crate::error::{Error, Result};

/// Walk the chunk records of `cursor` until the `end` chunk has been
/// consumed, handing each payload to `decode` as an isolated sub-cursor.
///
/// `decode` returns whether it recognized the chunk type. Unrecognized
/// chunks are reported and their payload discarded; recognized chunks
/// that leave bytes unconsumed are reported as well. Either way the
/// parent cursor advances by the declared length, so a misbehaving
/// decoder cannot desynchronize the chunks that follow.
pub fn walk_chunks<'a>(
    cursor: &mut Cursor<'a>,
    end: u16,
    diag: &mut dyn DiagnosticSink,
    mut decode: impl FnMut(u16, &mut Cursor<'a>, &mut dyn DiagnosticSink) -> Result<bool>,
) -> Result<()> {
    loop {
        let offset = cursor.position();
        let id = cursor.read_u16()?;
        let length = cursor.read_u32()? as usize;
        if length > cursor.remaining() {
            return Err(Error::BadChunk {
                offset,
                length,
                remaining: cursor.remaining(),
            });
        }

        let mut payload = cursor.extract(length)?;
        if decode(id, &mut payload, diag)? {
            if payload.remaining() != 0 {
                diag.report(Warning::LeftoverChunkBytes {
                    chunk: id,
                    remaining: payload.remaining(),
                });
            }
        } else if id != end {
            diag.report(Warning::UnknownChunk { chunk: id });
        }

        if id == end {
            return Ok(());
        }
    }
}
