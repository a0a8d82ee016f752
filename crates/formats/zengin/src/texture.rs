//! Decoder for the engine's compiled texture format: a fixed header, an
//! optional 256-entry palette, and a mipmap chain stored smallest level
//! first. Block-compressed levels are decompressed to RGBA8 on parse.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::math::Color;

const SIGNATURE: &str = "ZTEX";
const PALETTE_ENTRIES: usize = 256;

/// Pixel layout of the stored mipmap data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TextureFormat {
    B8G8R8A8 = 0,
    R8G8B8A8 = 1,
    A8B8G8R8 = 2,
    A8R8G8B8 = 3,
    B8G8R8 = 4,
    R8G8B8 = 5,
    A4R4G4B4 = 6,
    A1R5G5B5 = 7,
    R5G6B5 = 8,
    P8 = 9,
    Dxt1 = 0xA,
    Dxt2 = 0xB,
    Dxt3 = 0xC,
    Dxt4 = 0xD,
    Dxt5 = 0xE,
}

impl TextureFormat {
    fn from_raw(raw: u32) -> Result<Self> {
        Ok(match raw {
            0 => Self::B8G8R8A8,
            1 => Self::R8G8B8A8,
            2 => Self::A8B8G8R8,
            3 => Self::A8R8G8B8,
            4 => Self::B8G8R8,
            5 => Self::R8G8B8,
            6 => Self::A4R4G4B4,
            7 => Self::A1R5G5B5,
            8 => Self::R5G6B5,
            9 => Self::P8,
            0xA => Self::Dxt1,
            0xB => Self::Dxt2,
            0xC => Self::Dxt3,
            0xD => Self::Dxt4,
            0xE => Self::Dxt5,
            other => return Err(Error::UnsupportedFormat(format!("texture format {other}"))),
        })
    }
}

/// Byte size of mipmap `level` for a `width` x `height` texture.
pub(crate) fn mipmap_size(format: TextureFormat, width: u32, height: u32, level: u32) -> usize {
    let mut x = width.max(1) as usize;
    let mut y = height.max(1) as usize;
    for _ in 0..level {
        if x > 1 {
            x >>= 1;
        }
        if y > 1 {
            y >>= 1;
        }
    }

    use TextureFormat::*;
    match format {
        B8G8R8A8 | R8G8B8A8 | A8B8G8R8 | A8R8G8B8 => x * y * 4,
        B8G8R8 | R8G8B8 => x * y * 3,
        A4R4G4B4 | A1R5G5B5 | R5G6B5 => x * y * 2,
        P8 => x * y,
        Dxt1 => (x / 4).max(1) * (y / 4).max(1) * 8,
        Dxt2 | Dxt3 | Dxt4 | Dxt5 => (x / 4).max(1) * (y / 4).max(1) * 16,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    format: TextureFormat,
    width: u32,
    height: u32,
    mipmap_count: u32,
    ref_width: u32,
    ref_height: u32,
    average_color: [u8; 4],
    palette: Option<Vec<Color>>,
    /// Smallest level first; index `mipmap_count - 1` is full size.
    mipmaps: Vec<Vec<u8>>,
}

impl Texture {
    pub fn parse(data: &[u8]) -> Result<Texture> {
        let mut c = Cursor::new(data);

        let signature = c.read_string(4)?;
        if signature != SIGNATURE {
            return Err(Error::BadSignature {
                expected: SIGNATURE,
                found: signature,
            });
        }
        let version = c.read_u32()?;
        if version != 0 {
            return Err(Error::BadSignature {
                expected: "version 0",
                found: format!("version {version}"),
            });
        }

        let mut format = TextureFormat::from_raw(c.read_u32()?)?;
        let width = c.read_u32()?;
        let height = c.read_u32()?;
        let mipmap_count = c.read_u32()?.max(1);
        let ref_width = c.read_u32()?;
        let ref_height = c.read_u32()?;
        let average_color = [c.read_u8()?, c.read_u8()?, c.read_u8()?, c.read_u8()?];

        let palette = if format == TextureFormat::P8 {
            let mut palette = Vec::with_capacity(PALETTE_ENTRIES);
            for _ in 0..PALETTE_ENTRIES {
                palette.push(Color::parse_bgra(&mut c)?);
            }
            Some(palette)
        } else {
            None
        };

        // Smallest mipmap level first.
        let mut mipmaps = Vec::with_capacity(mipmap_count as usize);
        let mut dxt_decompressed = false;
        for level in (0..mipmap_count).rev() {
            let size = mipmap_size(format, width, height, level);
            let stored = c.read_bytes(size)?;

            match format {
                TextureFormat::Dxt1 | TextureFormat::Dxt3 | TextureFormat::Dxt5 => {
                    let w = (width >> level).max(1) as usize;
                    let h = (height >> level).max(1) as usize;
                    let codec = match format {
                        TextureFormat::Dxt1 => texpresso::Format::Bc1,
                        TextureFormat::Dxt3 => texpresso::Format::Bc2,
                        _ => texpresso::Format::Bc3,
                    };
                    let mut rgba = vec![0u8; w * h * 4];
                    codec.decompress(stored, w, h, &mut rgba);
                    mipmaps.push(rgba);
                    dxt_decompressed = true;
                }
                _ => mipmaps.push(stored.to_vec()),
            }
        }

        if dxt_decompressed {
            format = TextureFormat::R8G8B8A8;
        }

        Ok(Texture {
            format,
            width,
            height,
            mipmap_count,
            ref_width,
            ref_height,
            average_color,
            palette,
            mipmaps,
        })
    }

    /// The in-memory pixel layout. [`TextureFormat::R8G8B8A8`] if any
    /// block-compressed level was decompressed on parse.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mipmap_count(&self) -> u32 {
        self.mipmap_count
    }

    pub fn ref_width(&self) -> u32 {
        self.ref_width
    }

    pub fn ref_height(&self) -> u32 {
        self.ref_height
    }

    /// Average color of the texture, as stored: BGRA.
    pub fn average_color(&self) -> [u8; 4] {
        self.average_color
    }

    pub fn palette(&self) -> Option<&[Color]> {
        self.palette.as_deref()
    }

    /// Mipmap levels as stored, smallest first.
    pub fn mipmaps(&self) -> &[Vec<u8>] {
        &self.mipmaps
    }

    pub fn mipmap_width(&self, level: u32) -> u32 {
        (self.width >> level).max(1)
    }

    pub fn mipmap_height(&self, level: u32) -> u32 {
        (self.height >> level).max(1)
    }

    /// Pixel data of a level in engine numbering: level 0 is the
    /// full-resolution image.
    pub fn data(&self, level: u32) -> Result<&[u8]> {
        let index = (self.mipmap_count as usize)
            .checked_sub(1 + level as usize)
            .ok_or(Error::IndexOutOfRange {
                kind: "mipmap",
                index: level as usize,
                len: self.mipmap_count as usize,
            })?;
        Ok(&self.mipmaps[index])
    }

    /// Convert a level to tightly packed RGBA8.
    pub fn as_rgba8(&self, level: u32) -> Result<Vec<u8>> {
        let map = self.data(level)?;

        use TextureFormat::*;
        Ok(match self.format {
            B8G8R8A8 => map
                .chunks_exact(4)
                .flat_map(|p| [p[2], p[1], p[0], p[3]])
                .collect(),
            R8G8B8A8 => map.to_vec(),
            A8B8G8R8 => map
                .chunks_exact(4)
                .flat_map(|p| [p[3], p[2], p[1], p[0]])
                .collect(),
            A8R8G8B8 => map
                .chunks_exact(4)
                .flat_map(|p| [p[1], p[2], p[3], p[0]])
                .collect(),
            B8G8R8 => map
                .chunks_exact(3)
                .flat_map(|p| [p[2], p[1], p[0], 0xFF])
                .collect(),
            R8G8B8 => map
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 0xFF])
                .collect(),
            R5G6B5 => map
                .chunks_exact(2)
                .flat_map(|p| {
                    let v = u16::from_le_bytes([p[0], p[1]]);
                    let r = ((v >> 11) & 0x1F) as u8;
                    let g = ((v >> 5) & 0x3F) as u8;
                    let b = (v & 0x1F) as u8;
                    [
                        (r << 3) | (r >> 2),
                        (g << 2) | (g >> 4),
                        (b << 3) | (b >> 2),
                        0xFF,
                    ]
                })
                .collect(),
            P8 => {
                let palette = self.palette.as_ref().ok_or_else(|| Error::Parse {
                    context: "texture",
                    message: "palettized texture without a palette".to_owned(),
                })?;
                map.iter()
                    .map(|&i| palette[i as usize])
                    .flat_map(|c| [c.r, c.g, c.b, c.a])
                    .collect()
            }
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "cannot convert {other:?} to rgba"
                )))
            }
        })
    }
}
