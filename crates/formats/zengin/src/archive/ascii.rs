//! Field and object-line handling for the ASCII wire variant.

use glam::{Vec2, Vec3};

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::math::Color;

use super::ArchiveObject;

/// Read one `key=type:value` field line and return the value text.
/// The type label must match `expected`; ASCII archives are
/// self-describing, so a mismatch means the caller's schema is wrong.
pub(super) fn read_entry(cur: &mut Cursor<'_>, expected: &'static str) -> Result<String> {
    let line = cur.read_line()?;
    let line = line.trim();
    let (_key, rest) = line.split_once('=').ok_or_else(|| Error::Parse {
        context: "archive",
        message: format!("malformed field line {line:?}"),
    })?;
    let (ty, value) = rest.split_once(':').ok_or_else(|| Error::Parse {
        context: "archive",
        message: format!("field line {line:?} has no type label"),
    })?;
    if ty != expected {
        return Err(Error::TypeMismatch {
            context: "archive",
            expected,
            found: ty.to_owned(),
        });
    }
    Ok(value.to_owned())
}

/// Parse an `[object_name class_name version index]` marker line.
/// Returns `None` for anything else, including the `[]` end marker.
pub(super) fn parse_object_line(line: &str) -> Option<ArchiveObject> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let mut parts = inner.split_whitespace();
    let object_name = parts.next()?;
    let class_name = parts.next()?;
    let version = parts.next()?.parse().ok()?;
    let index = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(ArchiveObject {
        object_name: unescape_name(object_name),
        class_name: class_name.to_owned(),
        version,
        index,
    })
}

/// Unnamed objects archive their name slot as `%`.
pub(super) fn unescape_name(name: &str) -> String {
    if name == "%" {
        String::new()
    } else {
        name.to_owned()
    }
}

pub(super) fn parse_color(value: &str) -> Result<Color> {
    let mut it = value.split_whitespace().map(|p| p.parse::<u8>());
    let mut next = || -> Result<u8> {
        it.next()
            .ok_or_else(|| Error::Parse {
                context: "archive",
                message: format!("malformed color value {value:?}"),
            })?
            .map_err(bad_number)
    };
    Ok(Color {
        r: next()?,
        g: next()?,
        b: next()?,
        a: next()?,
    })
}

pub(super) fn parse_vec2(value: &str) -> Result<Vec2> {
    let v = parse_floats(value, 2)?;
    Ok(Vec2::new(v[0], v[1]))
}

pub(super) fn parse_vec3(value: &str) -> Result<Vec3> {
    let v = parse_floats(value, 3)?;
    Ok(Vec3::new(v[0], v[1], v[2]))
}

fn parse_floats(value: &str, n: usize) -> Result<Vec<f32>> {
    let parts: Vec<f32> = value
        .split_whitespace()
        .map(|p| p.parse::<f32>().map_err(bad_number))
        .collect::<Result<_>>()?;
    if parts.len() != n {
        return Err(Error::Parse {
            context: "archive",
            message: format!("expected {n} floats, found {} in {value:?}", parts.len()),
        });
    }
    Ok(parts)
}

/// Decode a hex-encoded raw field value.
pub(super) fn parse_hex(value: &str) -> Result<Vec<u8>> {
    let value = value.trim();
    if value.len() % 2 != 0 {
        return Err(Error::Parse {
            context: "archive",
            message: "raw field has an odd number of hex digits".to_owned(),
        });
    }
    (0..value.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&value[i..i + 2], 16).map_err(|_| Error::Parse {
                context: "archive",
                message: format!("invalid hex in raw field: {:?}", &value[i..i + 2]),
            })
        })
        .collect()
}

pub(super) fn bad_number<E: std::fmt::Display>(e: E) -> Error {
    Error::Parse {
        context: "archive",
        message: format!("malformed number: {e}"),
    }
}
