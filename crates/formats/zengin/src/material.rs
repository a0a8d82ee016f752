use glam::Vec2;

use crate::archive::Archive;
use crate::error::Result;
use crate::math::Color;

/// Object version written by Gothic 2 material archives. Older archives
/// carry engine-specific values below this; the exact value only matters
/// for distinguishing the two field layouts.
const MATERIAL_VERSION_GOTHIC2: u16 = 39939;

/// Surface class of a material, used by the engine for footstep sounds
/// and particle effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialGroup {
    #[default]
    Undef,
    Metal,
    Stone,
    Wood,
    Earth,
    Water,
    Snow,
}

impl MaterialGroup {
    /// Out-of-range values archive as `Undef`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Metal,
            2 => Self::Stone,
            3 => Self::Wood,
            4 => Self::Earth,
            5 => Self::Water,
            6 => Self::Snow,
            _ => Self::Undef,
        }
    }
}

/// A surface material referenced by mesh polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub group: MaterialGroup,
    pub color: Color,
    pub smooth_angle: f32,
    pub texture: String,
    pub texture_scale: Vec2,
    pub texture_anim_fps: f32,
    pub disable_collision: bool,
    pub disable_lightmap: bool,
}

impl Material {
    /// Read one material: a standalone slot-name field followed by the
    /// `zCMaterial` object. The object version selects the Gothic 1 or
    /// Gothic 2 field layout.
    pub(crate) fn parse(archive: &mut Archive<'_, '_>) -> Result<Material> {
        let _slot_name = archive.read_string()?;
        let material = archive.read_object(Some("zCMaterial"), |ar, obj| {
            let name = ar.read_string()?;
            let group = MaterialGroup::from_raw(ar.read_enum()?);
            let color = ar.read_color()?;
            let smooth_angle = ar.read_float()?;
            let texture = ar.read_string()?;
            let texture_scale = ar.read_vec2()?;
            let texture_anim_fps = ar.read_float()?;

            let (disable_collision, disable_lightmap) = if obj.version >= MATERIAL_VERSION_GOTHIC2 {
                (ar.read_bool()?, ar.read_bool()?)
            } else {
                (false, false)
            };

            Ok(Material {
                name,
                group,
                color,
                smooth_angle,
                texture,
                texture_scale,
                texture_anim_fps,
                disable_collision,
                disable_lightmap,
            })
        })?;
        Ok((*material).clone())
    }
}
