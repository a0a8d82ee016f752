//! Reader for the engine's self-describing object-graph archives.
//!
//! An archive opens with a short ASCII header that announces one of
//! three wire variants:
//!
//! - **ASCII**: newline-delimited `key=type:value` fields,
//! - **BINARY**: untagged raw little-endian values; the caller's read
//!   order *is* the schema,
//! - **BIN_SAFE**: binary values, each preceded by a key hash and a type
//!   tag so a schema drift degrades into skipped fields instead of
//!   garbage.
//!
//! Archives carry a tree of objects delimited by begin/end markers. An
//! object may be a *reference* (class name `§`) to an object read
//! earlier; the reader resolves those through an index table it owns for
//! the lifetime of the decode.

mod ascii;
mod binary;
mod binsafe;

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Mat3, Vec2, Vec3};

use crate::cursor::Cursor;
use crate::diag::{DiagnosticSink, Warning};
use crate::error::{Error, Result};
use crate::math::Color;

/// Class name marking a back-reference to a previously read object.
const REFERENCE_CLASS: &str = "\u{A7}";

/// The archive wire variant, detected from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Ascii,
    Binary,
    BinSafe,
}

/// The decoded text header of an archive.
#[derive(Debug, Clone)]
pub struct ArchiveHeader {
    pub version: u32,
    pub archiver: String,
    pub format: ArchiveFormat,
    pub save_game: bool,
    pub date: Option<String>,
    pub user: Option<String>,
    pub object_count: u32,
}

/// An object begin marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveObject {
    pub object_name: String,
    pub class_name: String,
    pub version: u16,
    pub index: u32,
}

impl ArchiveObject {
    /// Whether this marker references a previously read object.
    pub fn is_reference(&self) -> bool {
        self.class_name == REFERENCE_CLASS
    }

    /// The leading segment of the class hierarchy, e.g. `oCItem` for
    /// `oCItem:zCVob`.
    pub fn class_root(&self) -> &str {
        self.class_name.split(':').next().unwrap_or("")
    }
}

enum State {
    Ascii,
    Binary { object_end: Vec<usize> },
    BinSafe { keys: Vec<String> },
}

/// Archive reader over a byte slice. See the module docs.
pub struct Archive<'a, 'd> {
    header: ArchiveHeader,
    cur: Cursor<'a>,
    diag: &'d mut dyn DiagnosticSink,
    state: State,
    refs: HashMap<u32, Rc<dyn Any>>,
}

impl<'a, 'd> Archive<'a, 'd> {
    /// Detect the wire variant from the header block and position the
    /// reader at the first object.
    pub fn open(mut cur: Cursor<'a>, diag: &'d mut dyn DiagnosticSink) -> Result<Self> {
        let intro = cur.read_line()?;
        if intro != "ZenGin Archive" {
            return Err(Error::BadSignature {
                expected: "ZenGin Archive",
                found: intro,
            });
        }

        let version = parse_keyed_u32(&cur.read_line()?, "ver")?;
        let archiver = cur.read_line()?;
        let format = match cur.read_line()?.as_str() {
            "ASCII" => ArchiveFormat::Ascii,
            "BINARY" => ArchiveFormat::Binary,
            "BIN_SAFE" => ArchiveFormat::BinSafe,
            other => {
                return Err(Error::Parse {
                    context: "archive",
                    message: format!("unknown wire variant {other:?}"),
                })
            }
        };
        let save_game = parse_keyed_u32(&cur.read_line()?, "saveGame")? != 0;

        let mut date = None;
        let mut user = None;
        loop {
            let line = cur.read_line()?;
            if line == "END" {
                break;
            } else if let Some(rest) = line.strip_prefix("date ") {
                date = Some(rest.to_owned());
            } else if let Some(rest) = line.strip_prefix("user ") {
                user = Some(rest.to_owned());
            }
            // Other header lines are tolerated and ignored.
        }

        let (object_count, state) = match format {
            ArchiveFormat::Ascii | ArchiveFormat::Binary => {
                let count = parse_keyed_u32(&cur.read_line()?, "objects")?;
                let end = cur.read_line()?;
                if end != "END" {
                    return Err(Error::Parse {
                        context: "archive",
                        message: format!("expected END after object count, found {end:?}"),
                    });
                }
                // One blank separator line.
                cur.read_line()?;
                let state = match format {
                    ArchiveFormat::Ascii => State::Ascii,
                    _ => State::Binary { object_end: Vec::new() },
                };
                (count, state)
            }
            ArchiveFormat::BinSafe => {
                let _bs_version = cur.read_u32()?;
                let count = cur.read_u32()?;
                let hash_table_offset = cur.read_u32()? as usize;
                let keys = binsafe::read_key_table(&cur, hash_table_offset)?;
                (count, State::BinSafe { keys })
            }
        };

        Ok(Self {
            header: ArchiveHeader {
                version,
                archiver,
                format,
                save_game,
                date,
                user,
                object_count,
            },
            cur,
            diag,
            state,
            refs: HashMap::new(),
        })
    }

    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    pub fn format(&self) -> ArchiveFormat {
        self.header.format
    }

    /// Direct access to the underlying cursor and the diagnostic sink.
    ///
    /// Compiled worlds embed raw chunked blocks (mesh, BSP) in the
    /// middle of the archive; those are read past the archive
    /// abstraction through this escape hatch.
    pub fn raw_parts(&mut self) -> (&mut Cursor<'a>, &mut dyn DiagnosticSink) {
        (&mut self.cur, &mut *self.diag)
    }

    /// The diagnostic sink this reader reports into.
    pub fn diag(&mut self) -> &mut dyn DiagnosticSink {
        &mut *self.diag
    }

    // ── object framing ──────────────────────────────────────────────────

    /// Read the next object begin marker.
    pub fn read_object_begin(&mut self) -> Result<ArchiveObject> {
        match &mut self.state {
            State::Ascii => {
                let line = self.cur.read_line()?;
                ascii::parse_object_line(line.trim()).ok_or_else(|| Error::Parse {
                    context: "archive",
                    message: format!("expected object begin, found {line:?}"),
                })
            }
            State::Binary { object_end } => binary::read_object_begin(&mut self.cur, object_end),
            State::BinSafe { keys } => {
                let line = binsafe::read_string(&mut self.cur, keys, self.diag)?
                    .unwrap_or_default();
                ascii::parse_object_line(line.trim()).ok_or_else(|| Error::Parse {
                    context: "archive",
                    message: format!("expected object begin, found {line:?}"),
                })
            }
        }
    }

    /// Consume an object end marker if one is next. Returns whether it
    /// was there.
    pub fn read_object_end(&mut self) -> Result<bool> {
        match &mut self.state {
            State::Ascii => {
                let pos = self.cur.position();
                match self.cur.read_line() {
                    Ok(line) if line.trim() == "[]" => Ok(true),
                    Ok(_) => {
                        self.cur.set_position(pos)?;
                        Ok(false)
                    }
                    Err(_) => {
                        self.cur.set_position(pos)?;
                        Ok(self.cur.is_eof())
                    }
                }
            }
            State::Binary { object_end } => Ok(binary::read_object_end(&self.cur, object_end)),
            State::BinSafe { keys } => {
                if self.cur.is_eof() {
                    return Ok(true);
                }
                let pos = self.cur.position();
                match binsafe::peek_string(&mut self.cur, keys) {
                    Ok(Some(line)) if line.trim() == "[]" => Ok(true),
                    _ => {
                        self.cur.set_position(pos)?;
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Skip the remainder of the current object, including nested
    /// objects, leaving the reader just past its end marker.
    pub fn skip_object(&mut self) -> Result<()> {
        match &mut self.state {
            State::Ascii => {
                let mut depth = 1usize;
                while depth > 0 {
                    let line = self.cur.read_line()?;
                    let line = line.trim();
                    if line == "[]" {
                        depth -= 1;
                    } else if line.starts_with('[') && line.ends_with(']') {
                        depth += 1;
                    }
                }
                Ok(())
            }
            State::Binary { object_end } => {
                let end = object_end.pop().ok_or(Error::Parse {
                    context: "archive",
                    message: "skip_object outside of an object".to_owned(),
                })?;
                self.cur.set_position(end)
            }
            State::BinSafe { keys } => {
                let mut depth = 1usize;
                while depth > 0 {
                    match binsafe::skip_field(&mut self.cur, keys)? {
                        Some(line) if line.trim() == "[]" => depth -= 1,
                        Some(line) if line.trim_start().starts_with('[') => depth += 1,
                        _ => {}
                    }
                }
                Ok(())
            }
        }
    }

    /// Read a complete object: begin marker, fields via `parse`, end
    /// marker. Back-references resolve to the shared handle of the
    /// previously materialized instance without re-reading any fields.
    pub fn read_object<T, F>(
        &mut self,
        expected_class: Option<&'static str>,
        parse: F,
    ) -> Result<Rc<T>>
    where
        T: 'static,
        F: FnOnce(&mut Self, &ArchiveObject) -> Result<T>,
    {
        let obj = self.read_object_begin()?;

        if obj.is_reference() {
            if !self.read_object_end()? {
                self.skip_object()?;
            }
            let rc = self
                .refs
                .get(&obj.index)
                .cloned()
                .ok_or(Error::IndexOutOfRange {
                    kind: "object reference",
                    index: obj.index as usize,
                    len: self.refs.len(),
                })?;
            return rc.downcast::<T>().map_err(|_| Error::Parse {
                context: "archive",
                message: format!("reference {} resolves to an object of a different type", obj.index),
            });
        }

        if let Some(expected) = expected_class {
            if obj.class_root() != expected {
                return Err(Error::TypeMismatch {
                    context: "archive",
                    expected,
                    found: obj.class_name.clone(),
                });
            }
        }

        let value = parse(self, &obj)?;
        if !self.read_object_end()? {
            self.diag.report(Warning::LeftoverObjectFields {
                class_name: obj.class_name.clone(),
            });
            self.skip_object()?;
        }

        let rc = Rc::new(value);
        self.refs.insert(obj.index, rc.clone());
        Ok(rc)
    }

    // ── typed field reads ───────────────────────────────────────────────

    pub fn read_bool(&mut self) -> Result<bool> {
        match &mut self.state {
            State::Ascii => Ok(ascii::read_entry(&mut self.cur, "bool")?.trim().parse::<u32>().map_err(ascii::bad_number)? != 0),
            State::Binary { .. } => Ok(self.cur.read_u8()? != 0),
            State::BinSafe { keys } => {
                Ok(binsafe::read_bool(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        match &mut self.state {
            State::Ascii => ascii::read_entry(&mut self.cur, "int")?.trim().parse().map_err(ascii::bad_number),
            State::Binary { .. } => self.cur.read_u8(),
            State::BinSafe { keys } => {
                Ok(binsafe::read_byte(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_word(&mut self) -> Result<u16> {
        match &mut self.state {
            State::Ascii => ascii::read_entry(&mut self.cur, "int")?.trim().parse().map_err(ascii::bad_number),
            State::Binary { .. } => self.cur.read_u16(),
            State::BinSafe { keys } => {
                Ok(binsafe::read_word(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_int(&mut self) -> Result<i32> {
        match &mut self.state {
            State::Ascii => ascii::read_entry(&mut self.cur, "int")?.trim().parse().map_err(ascii::bad_number),
            State::Binary { .. } => self.cur.read_i32(),
            State::BinSafe { keys } => {
                Ok(binsafe::read_int(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_float(&mut self) -> Result<f32> {
        match &mut self.state {
            State::Ascii => ascii::read_entry(&mut self.cur, "float")?.trim().parse().map_err(ascii::bad_number),
            State::Binary { .. } => self.cur.read_f32(),
            State::BinSafe { keys } => {
                Ok(binsafe::read_float(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_enum(&mut self) -> Result<u32> {
        match &mut self.state {
            State::Ascii => ascii::read_entry(&mut self.cur, "enum")?.trim().parse().map_err(ascii::bad_number),
            State::Binary { .. } => Ok(self.cur.read_u8()? as u32),
            State::BinSafe { keys } => {
                Ok(binsafe::read_enum(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_string(&mut self) -> Result<String> {
        match &mut self.state {
            State::Ascii => ascii::read_entry(&mut self.cur, "string"),
            State::Binary { .. } => self.cur.read_line(),
            State::BinSafe { keys } => {
                Ok(binsafe::read_string(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_color(&mut self) -> Result<Color> {
        match &mut self.state {
            State::Ascii => ascii::parse_color(&ascii::read_entry(&mut self.cur, "color")?),
            State::Binary { .. } => Color::parse_bgra(&mut self.cur),
            State::BinSafe { keys } => {
                Ok(binsafe::read_color(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        match &mut self.state {
            State::Ascii => ascii::parse_vec2(&ascii::read_entry(&mut self.cur, "rawFloat")?),
            State::Binary { .. } => self.cur.read_vec2(),
            State::BinSafe { keys } => {
                Ok(binsafe::read_vec2(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        match &mut self.state {
            State::Ascii => ascii::parse_vec3(&ascii::read_entry(&mut self.cur, "vec3")?),
            State::Binary { .. } => self.cur.read_vec3(),
            State::BinSafe { keys } => {
                Ok(binsafe::read_vec3(&mut self.cur, keys, self.diag)?.unwrap_or_default())
            }
        }
    }

    /// Read a row-major 3x3 matrix, archived as 36 raw bytes.
    pub fn read_mat3(&mut self) -> Result<Mat3> {
        let raw = self.read_raw(36)?;
        let mut c = Cursor::new(&raw);
        c.read_mat3()
    }

    pub fn read_raw(&mut self, n: usize) -> Result<Vec<u8>> {
        let raw = match &mut self.state {
            State::Ascii => ascii::parse_hex(&ascii::read_entry(&mut self.cur, "raw")?)?,
            State::Binary { .. } => self.cur.read_bytes(n)?.to_vec(),
            State::BinSafe { keys } => binsafe::read_raw(&mut self.cur, keys, self.diag)?
                .unwrap_or_else(|| vec![0; n]),
        };
        if raw.len() != n {
            return Err(Error::Parse {
                context: "archive",
                message: format!("raw field has {} bytes, expected {n}", raw.len()),
            });
        }
        Ok(raw)
    }
}

fn parse_keyed_u32(line: &str, key: &'static str) -> Result<u32> {
    line.strip_prefix(key)
        .and_then(|rest| rest.trim().parse().ok())
        .ok_or_else(|| Error::Parse {
            context: "archive",
            message: format!("malformed header line {line:?}, expected \"{key} <n>\""),
        })
}
