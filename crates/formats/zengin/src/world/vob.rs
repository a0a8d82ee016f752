//! Decoder for the virtual-object forest of a world.
//!
//! Every VOB archives the same base record; concrete classes append
//! their own fields. Children are archived after the object's end
//! marker: an `int` count followed by that many sibling objects, so a
//! class this library cannot decode still yields a usable node with its
//! subtree intact.

use glam::{Mat3, Vec3};

use crate::archive::Archive;
use crate::diag::Warning;
use crate::error::Result;
use crate::math::{BoundingBox, Color};
use crate::GameVersion;

/// Class-specific extension data of a [`Vob`].
#[derive(Debug, Clone, PartialEq)]
pub enum VobData {
    /// Plain `zCVob`.
    Vob,
    /// Level compound: groups the static level geometry.
    LevelCompo,
    /// Free point used by scripts and AI.
    Spot,
    /// Player start point.
    Startpoint,
    Item {
        instance: String,
    },
    Light {
        preset: String,
        light_type: u8,
        range: f32,
        color: Color,
        cone_angle: f32,
        is_static: bool,
        quality: u8,
    },
    Sound {
        volume: f32,
        mode: u8,
        random_delay: f32,
        random_delay_var: f32,
        start_on: bool,
        name: String,
    },
    MobContainer {
        locked: bool,
        key_instance: String,
        pick_string: String,
        contents: String,
    },
    Trigger {
        target: String,
        flags: [u8; 2],
        retrigger_delay: f32,
    },
    ZoneMusic {
        enabled: bool,
        priority: i32,
        ellipsoid: bool,
        reverb: f32,
        volume: f32,
        looping: bool,
    },
    /// A class without a decoder; base fields only.
    Unknown {
        class_name: String,
    },
}

/// A node of the world's object graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Vob {
    pub bbox: BoundingBox,
    pub rotation: Mat3,
    pub position: Vec3,
    pub preset_name: String,
    pub vob_name: String,
    pub visual_name: String,
    pub show_visual: bool,
    pub camera_alignment: u8,
    pub animation_mode: u8,
    pub animation_strength: f32,
    pub far_clip_scale: f32,
    pub cd_static: bool,
    pub cd_dynamic: bool,
    pub vob_static: bool,
    pub ambient: bool,
    pub physics_enabled: bool,
    pub dynamic_shadows: u8,
    pub bias: i8,
    pub data: VobData,
    /// Child objects, in file order.
    pub children: Vec<Vob>,
}

impl Vob {
    pub(crate) fn parse(archive: &mut Archive<'_, '_>, version: GameVersion) -> Result<Vob> {
        let vob = archive.read_object(None, |ar, obj| {
            let preset_name = ar.read_string()?;
            let bbox = BoundingBox {
                min: ar.read_vec3()?,
                max: ar.read_vec3()?,
            };
            let rotation = ar.read_mat3()?;
            let position = ar.read_vec3()?;
            let vob_name = ar.read_string()?;
            let visual_name = ar.read_string()?;
            let show_visual = ar.read_bool()?;
            let camera_alignment = ar.read_enum()? as u8;
            let cd_static = ar.read_bool()?;
            let cd_dynamic = ar.read_bool()?;
            let vob_static = ar.read_bool()?;
            let dynamic_shadows = ar.read_enum()? as u8;
            let animation_mode = ar.read_enum()? as u8;
            let animation_strength = ar.read_float()?;
            let far_clip_scale = ar.read_float()?;

            let (bias, ambient, physics_enabled) = match version {
                GameVersion::Gothic1 => (0, false, false),
                GameVersion::Gothic2 => {
                    (ar.read_int()? as i8, ar.read_bool()?, ar.read_bool()?)
                }
            };

            let data = Self::parse_data(ar, obj.class_root())?;

            Ok(Vob {
                bbox,
                rotation,
                position,
                preset_name,
                vob_name,
                visual_name,
                show_visual,
                camera_alignment,
                animation_mode,
                animation_strength,
                far_clip_scale,
                cd_static,
                cd_dynamic,
                vob_static,
                ambient,
                physics_enabled,
                dynamic_shadows,
                bias,
                data,
                children: Vec::new(),
            })
        })?;

        // The reader keeps a shared handle for back-references; the tree
        // owns a copy.
        let mut vob = (*vob).clone();

        let child_count = archive.read_int()?.max(0) as usize;
        vob.children.reserve(child_count);
        for _ in 0..child_count {
            vob.children.push(Vob::parse(archive, version)?);
        }

        Ok(vob)
    }

    fn parse_data(ar: &mut Archive<'_, '_>, class: &str) -> Result<VobData> {
        Ok(match class {
            "zCVob" => VobData::Vob,
            "zCVobLevelCompo" => VobData::LevelCompo,
            "zCVobSpot" => VobData::Spot,
            "zCVobStartpoint" => VobData::Startpoint,
            "oCItem" => VobData::Item {
                instance: ar.read_string()?,
            },
            "zCVobLight" => VobData::Light {
                preset: ar.read_string()?,
                light_type: ar.read_enum()? as u8,
                range: ar.read_float()?,
                color: ar.read_color()?,
                cone_angle: ar.read_float()?,
                is_static: ar.read_bool()?,
                quality: ar.read_enum()? as u8,
            },
            "zCVobSound" => VobData::Sound {
                volume: ar.read_float()?,
                mode: ar.read_enum()? as u8,
                random_delay: ar.read_float()?,
                random_delay_var: ar.read_float()?,
                start_on: ar.read_bool()?,
                name: ar.read_string()?,
            },
            "oCMobContainer" => VobData::MobContainer {
                locked: ar.read_bool()?,
                key_instance: ar.read_string()?,
                pick_string: ar.read_string()?,
                contents: ar.read_string()?,
            },
            "zCTrigger" => {
                let target = ar.read_string()?;
                let raw = ar.read_raw(2)?;
                VobData::Trigger {
                    target,
                    flags: [raw[0], raw[1]],
                    retrigger_delay: ar.read_float()?,
                }
            }
            "oCZoneMusic" => VobData::ZoneMusic {
                enabled: ar.read_bool()?,
                priority: ar.read_int()?,
                ellipsoid: ar.read_bool()?,
                reverb: ar.read_float()?,
                volume: ar.read_float()?,
                looping: ar.read_bool()?,
            },
            other => {
                let class_name = other.to_owned();
                ar.diag().report(Warning::UnknownObjectClass {
                    class_name: class_name.clone(),
                });
                // Subclass fields are left for the object-end resync.
                VobData::Unknown { class_name }
            }
        })
    }
}
