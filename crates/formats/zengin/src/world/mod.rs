//! Decoder for serialized worlds: the compiled mesh, the BSP tree over
//! its polygons, and the virtual-object forest.

pub mod bsp;
pub mod mesh;
pub mod vob;

pub use bsp::{BspLeaf, BspNode, BspTree, BspTreeMode};
pub use mesh::{Mesh, Polygon, PolygonIndex};
pub use vob::{Vob, VobData};

use crate::archive::Archive;
use crate::cursor::Cursor;
use crate::diag::{DiagnosticSink, Warning};
use crate::error::{Error, Result};
use crate::GameVersion;

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub mesh: Mesh,
    pub bsp_tree: BspTree,
    /// Root objects of the VOB forest, in file order.
    pub vobs: Vec<Vob>,
}

impl World {
    pub fn parse(
        data: &[u8],
        version: GameVersion,
        diag: &mut dyn DiagnosticSink,
    ) -> Result<World> {
        let mut archive = Archive::open(Cursor::new(data), diag)?;

        let root = archive.read_object_begin()?;
        if root.class_root() != "oCWorld" && root.class_root() != "zCWorld" {
            return Err(Error::TypeMismatch {
                context: "world",
                expected: "oCWorld",
                found: root.class_name,
            });
        }

        let mut mesh = None;
        let mut bsp_tree = None;
        let mut vobs = Vec::new();

        while !archive.read_object_end()? {
            let obj = archive.read_object_begin()?;
            match obj.object_name.as_str() {
                "MeshAndBsp" => {
                    let (cur, diag) = archive.raw_parts();

                    let _bsp_version = cur.read_u32()?;
                    let _block_length = cur.read_u32()?;

                    // Mesh chunks come first; remember where they start,
                    // step over them to reach the BSP data, then decode
                    // the mesh from the saved position.
                    let mesh_start = cur.position();
                    loop {
                        let id = cur.read_u16()?;
                        let length = cur.read_u32()? as usize;
                        cur.skip(length)?;
                        if id == mesh::CHUNK_END {
                            break;
                        }
                    }

                    bsp_tree = Some(BspTree::parse(cur, diag)?);

                    let mut mesh_cur = cur.clone();
                    mesh_cur.set_position(mesh_start)?;
                    mesh = Some(Mesh::parse(&mut mesh_cur, diag)?);

                    if !archive.read_object_end()? {
                        archive.skip_object()?;
                    }
                }
                "VobTree" => {
                    let root_count = archive.read_int()?.max(0) as usize;
                    vobs.reserve(root_count);
                    for _ in 0..root_count {
                        vobs.push(Vob::parse(&mut archive, version)?);
                    }
                    if !archive.read_object_end()? {
                        archive.skip_object()?;
                    }
                }
                _ => {
                    archive.diag().report(Warning::UnknownObjectClass {
                        class_name: obj.class_name,
                    });
                    archive.skip_object()?;
                }
            }
        }

        Ok(World {
            mesh: mesh.ok_or(Error::Parse {
                context: "world",
                message: "archive has no MeshAndBsp block".to_owned(),
            })?,
            bsp_tree: bsp_tree.ok_or(Error::Parse {
                context: "world",
                message: "archive has no BSP tree".to_owned(),
            })?,
            vobs,
        })
    }
}
