//! Object framing for the BINARY wire variant.
//!
//! Binary archives carry no per-field tags: values are raw little-endian
//! and the caller's read order is the schema. Objects are framed by a
//! leading byte size instead of an end marker, so ends are detected by
//! position and a malformed object can always be skipped by seeking.

use crate::cursor::Cursor;
use crate::error::Result;

use super::{ascii, ArchiveObject};

/// Object header: `u32 size` (measured from the start of this field to
/// the object end), `u16 version`, `u32 index`, then the object name and
/// class name as `\n`-terminated lines.
pub(super) fn read_object_begin(
    cur: &mut Cursor<'_>,
    object_end: &mut Vec<usize>,
) -> Result<ArchiveObject> {
    let start = cur.position();
    let size = cur.read_u32()? as usize;
    let version = cur.read_u16()?;
    let index = cur.read_u32()?;
    let object_name = cur.read_line()?;
    let class_name = cur.read_line()?;
    object_end.push(start + size);
    Ok(ArchiveObject {
        object_name: ascii::unescape_name(&object_name),
        class_name,
        version,
        index,
    })
}

/// Whether the innermost object's declared extent has been reached; pops
/// it if so.
pub(super) fn read_object_end(cur: &Cursor<'_>, object_end: &mut Vec<usize>) -> bool {
    match object_end.last() {
        Some(&end) if cur.position() >= end => {
            object_end.pop();
            true
        }
        Some(_) => false,
        None => cur.is_eof(),
    }
}
