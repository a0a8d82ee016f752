//! Plain geometric records shared by the mesh and world decoders.

use glam::Vec3;

use crate::cursor::Cursor;
use crate::error::Result;

/// An RGBA color, stored on the wire as BGRA bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub(crate) fn parse_bgra(c: &mut Cursor<'_>) -> Result<Self> {
        let b = c.read_u8()?;
        let g = c.read_u8()?;
        let r = c.read_u8()?;
        let a = c.read_u8()?;
        Ok(Self { r, g, b, a })
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub(crate) fn parse(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            min: c.read_vec3()?,
            max: c.read_vec3()?,
        })
    }
}

/// An oriented bounding box. Boxes nest: each may carry child boxes
/// refining the volume.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Obb {
    pub center: Vec3,
    pub axes: [Vec3; 3],
    pub half_width: Vec3,
    pub children: Vec<Obb>,
}

impl Obb {
    pub(crate) fn parse(c: &mut Cursor<'_>) -> Result<Self> {
        let center = c.read_vec3()?;
        let axes = [c.read_vec3()?, c.read_vec3()?, c.read_vec3()?];
        let half_width = c.read_vec3()?;

        let child_count = c.read_u16()? as usize;
        let mut children = Vec::with_capacity(child_count);
        for _ in 0..child_count {
            children.push(Obb::parse(c)?);
        }

        Ok(Self {
            center,
            axes,
            half_width,
            children,
        })
    }
}
