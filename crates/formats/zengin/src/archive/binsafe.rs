//! Field handling for the BIN_SAFE wire variant.
//!
//! Every field is `u8 0x12, u32 key_index, u8 type_tag, value`. The key
//! index points into a string table stored behind the archive body, so a
//! mismatched field can be reported by name and skipped using its
//! self-described size. Schema drift degrades into warnings instead of
//! desynchronizing the stream.

use glam::{Vec2, Vec3};

use crate::cursor::{decode_cp1252, Cursor};
use crate::diag::{DiagnosticSink, Warning};
use crate::error::{Error, Result};
use crate::math::Color;

const TAG_STRING: u8 = 0x1;
const TAG_INT: u8 = 0x2;
const TAG_FLOAT: u8 = 0x3;
const TAG_BYTE: u8 = 0x4;
const TAG_WORD: u8 = 0x5;
const TAG_BOOL: u8 = 0x6;
const TAG_VEC3: u8 = 0x7;
const TAG_COLOR: u8 = 0x8;
const TAG_RAW: u8 = 0x9;
const TAG_RAW_FLOAT: u8 = 0x10;
const TAG_ENUM: u8 = 0x11;
const TAG_HASH: u8 = 0x12;

/// Read the key table referenced by the header trailer. Entries land at
/// their insertion index.
pub(super) fn read_key_table(cur: &Cursor<'_>, offset: usize) -> Result<Vec<String>> {
    let mut c = cur.clone();
    c.set_position(offset)?;

    let count = c.read_u32()? as usize;
    let mut keys = Vec::new();
    for _ in 0..count {
        let key_length = c.read_u16()? as usize;
        let insertion_index = c.read_u16()? as usize;
        let _hash = c.read_u32()?;
        let key = decode_cp1252(c.read_bytes(key_length)?);
        if keys.len() <= insertion_index {
            keys.resize(insertion_index + 1, String::new());
        }
        keys[insertion_index] = key;
    }
    Ok(keys)
}

fn field_head(cur: &mut Cursor<'_>) -> Result<(u32, u8)> {
    let hash_tag = cur.read_u8()?;
    if hash_tag != TAG_HASH {
        return Err(Error::Parse {
            context: "archive",
            message: format!("binsafe field starts with {hash_tag:#04x}, not a key hash"),
        });
    }
    let key_index = cur.read_u32()?;
    let tag = cur.read_u8()?;
    Ok((key_index, tag))
}

fn skip_value(cur: &mut Cursor<'_>, tag: u8) -> Result<()> {
    match tag {
        TAG_STRING | TAG_RAW | TAG_RAW_FLOAT => {
            let n = cur.read_u16()? as usize;
            cur.skip(n)
        }
        TAG_INT | TAG_FLOAT | TAG_BOOL | TAG_ENUM | TAG_COLOR => cur.skip(4),
        TAG_BYTE => cur.skip(1),
        TAG_WORD => cur.skip(2),
        TAG_VEC3 => cur.skip(12),
        _ => Err(Error::Parse {
            context: "archive",
            message: format!("cannot skip binsafe field with unknown type tag {tag:#04x}"),
        }),
    }
}

fn key_name(keys: &[String], index: u32) -> String {
    match keys.get(index as usize) {
        Some(key) if !key.is_empty() => key.clone(),
        _ => format!("#{index}"),
    }
}

/// Consume a field head and check its type tag. On a mismatch the value
/// is skipped, a warning reported and `false` returned; the caller
/// substitutes the type's default.
fn expect(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
    expected: u8,
    expected_name: &'static str,
) -> Result<bool> {
    let (key_index, tag) = field_head(cur)?;
    if tag == expected {
        return Ok(true);
    }
    skip_value(cur, tag)?;
    diag.report(Warning::FieldTypeMismatch {
        key: key_name(keys, key_index),
        expected: expected_name,
        found: tag,
    });
    Ok(false)
}

fn read_length_prefixed<'a>(cur: &mut Cursor<'a>) -> Result<&'a [u8]> {
    let n = cur.read_u16()? as usize;
    cur.read_bytes(n)
}

pub(super) fn read_bool(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<bool>> {
    Ok(match expect(cur, keys, diag, TAG_BOOL, "bool")? {
        true => Some(cur.read_u32()? != 0),
        false => None,
    })
}

pub(super) fn read_byte(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<u8>> {
    Ok(match expect(cur, keys, diag, TAG_BYTE, "byte")? {
        true => Some(cur.read_u8()?),
        false => None,
    })
}

pub(super) fn read_word(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<u16>> {
    Ok(match expect(cur, keys, diag, TAG_WORD, "word")? {
        true => Some(cur.read_u16()?),
        false => None,
    })
}

pub(super) fn read_int(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<i32>> {
    Ok(match expect(cur, keys, diag, TAG_INT, "int")? {
        true => Some(cur.read_i32()?),
        false => None,
    })
}

pub(super) fn read_float(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<f32>> {
    Ok(match expect(cur, keys, diag, TAG_FLOAT, "float")? {
        true => Some(cur.read_f32()?),
        false => None,
    })
}

pub(super) fn read_enum(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<u32>> {
    Ok(match expect(cur, keys, diag, TAG_ENUM, "enum")? {
        true => Some(cur.read_u32()?),
        false => None,
    })
}

pub(super) fn read_string(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<String>> {
    Ok(match expect(cur, keys, diag, TAG_STRING, "string")? {
        true => Some(decode_cp1252(read_length_prefixed(cur)?)),
        false => None,
    })
}

pub(super) fn read_color(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<Color>> {
    Ok(match expect(cur, keys, diag, TAG_COLOR, "color")? {
        true => Some(Color::parse_bgra(cur)?),
        false => None,
    })
}

pub(super) fn read_vec2(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<Vec2>> {
    if !expect(cur, keys, diag, TAG_RAW_FLOAT, "rawFloat")? {
        return Ok(None);
    }
    let bytes = read_length_prefixed(cur)?;
    if bytes.len() != 8 {
        return Err(Error::Parse {
            context: "archive",
            message: format!("rawFloat field has {} bytes, expected 8", bytes.len()),
        });
    }
    let mut c = Cursor::new(bytes);
    Ok(Some(c.read_vec2()?))
}

pub(super) fn read_vec3(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<Vec3>> {
    Ok(match expect(cur, keys, diag, TAG_VEC3, "vec3")? {
        true => Some(cur.read_vec3()?),
        false => None,
    })
}

pub(super) fn read_raw(
    cur: &mut Cursor<'_>,
    keys: &[String],
    diag: &mut dyn DiagnosticSink,
) -> Result<Option<Vec<u8>>> {
    Ok(match expect(cur, keys, diag, TAG_RAW, "raw")? {
        true => Some(read_length_prefixed(cur)?.to_vec()),
        false => None,
    })
}

/// Strictly read a string field without reporting. Used to peek at
/// object markers; the caller restores the cursor when this returns
/// `None` or an error.
pub(super) fn peek_string(cur: &mut Cursor<'_>, _keys: &[String]) -> Result<Option<String>> {
    let (_key, tag) = field_head(cur)?;
    if tag != TAG_STRING {
        return Ok(None);
    }
    Ok(Some(decode_cp1252(read_length_prefixed(cur)?)))
}

/// Consume one field of any type. Returns the text of string fields so
/// object nesting can be tracked while skipping.
pub(super) fn skip_field(cur: &mut Cursor<'_>, _keys: &[String]) -> Result<Option<String>> {
    let (_key, tag) = field_head(cur)?;
    if tag == TAG_STRING {
        return Ok(Some(decode_cp1252(read_length_prefixed(cur)?)));
    }
    skip_value(cur, tag)?;
    Ok(None)
}
