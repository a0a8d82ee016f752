//! Decoder for soft-skinned meshes: a proto-mesh plus per-vertex bone
//! weights, wedge normals and the node list the skin is rigged to.

use glam::Vec3;

use crate::chunk::walk_chunks;
use crate::cursor::Cursor;
use crate::diag::{DiagnosticSink, Warning};
use crate::error::Result;
use crate::math::Obb;
use crate::proto::ProtoMesh;

const CHUNK_HEADER: u16 = 0xE100;
const CHUNK_PROTO: u16 = 0xB100;
const CHUNK_NODES: u16 = 0xB1FF;
const CHUNK_END: u16 = 0xE110;

/// One vertex-to-node attachment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Weight {
    pub weight: f32,
    pub position: Vec3,
    pub node_index: u8,
}

/// A per-wedge override normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WedgeNormal {
    pub normal: Vec3,
    pub index: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SoftSkinOptions {
    /// The original engine's loader drops every weight record: it takes
    /// a capacity from the declared count but then iterates an empty
    /// vector, so nothing is materialized. `true` (the default)
    /// reproduces that; `false` reads all declared records.
    pub legacy_weights: bool,
}

impl Default for SoftSkinOptions {
    fn default() -> Self {
        Self {
            legacy_weights: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoftSkinMesh {
    pub mesh: ProtoMesh,
    pub weights: Vec<Weight>,
    pub wedge_normals: Vec<WedgeNormal>,
    pub nodes: Vec<i32>,
    /// One bounding volume per node.
    pub bboxes: Vec<Obb>,
}

impl SoftSkinMesh {
    pub fn parse(
        cur: &mut Cursor<'_>,
        options: SoftSkinOptions,
        diag: &mut dyn DiagnosticSink,
    ) -> Result<Self> {
        let mut msh = SoftSkinMesh::default();

        walk_chunks(cur, CHUNK_END, diag, |id, chunk, diag| {
            Ok(match id {
                CHUNK_HEADER => {
                    let _version = chunk.read_u32()?;
                    true
                }
                CHUNK_PROTO => {
                    msh.mesh = ProtoMesh::parse(chunk, diag)?;
                    true
                }
                CHUNK_NODES => {
                    // Weight block: a byte length covering the count
                    // field and the records, so a reader can always step
                    // over it.
                    let weight_block_size = chunk.read_u32()? as usize;
                    let weight_block_end = chunk.position() + weight_block_size;

                    let declared = chunk.read_u32()? as usize;
                    msh.weights.reserve(declared);
                    if !options.legacy_weights {
                        for _ in 0..declared {
                            msh.weights.push(Weight {
                                weight: chunk.read_f32()?,
                                position: chunk.read_vec3()?,
                                node_index: chunk.read_u8()?,
                            });
                        }
                    }
                    if msh.weights.len() != declared {
                        diag.report(Warning::WeightCountMismatch {
                            declared,
                            materialized: msh.weights.len(),
                        });
                    }
                    chunk.set_position(weight_block_end)?;

                    let normal_count = chunk.read_u32()? as usize;
                    msh.wedge_normals.reserve(normal_count);
                    for _ in 0..normal_count {
                        msh.wedge_normals.push(WedgeNormal {
                            normal: chunk.read_vec3()?,
                            index: chunk.read_u32()?,
                        });
                    }

                    let node_count = chunk.read_u16()? as usize;
                    msh.nodes.reserve(node_count);
                    for _ in 0..node_count {
                        msh.nodes.push(chunk.read_i32()?);
                    }
                    msh.bboxes.reserve(node_count);
                    for _ in 0..node_count {
                        msh.bboxes.push(Obb::parse(chunk)?);
                    }
                    true
                }
                CHUNK_END => true,
                _ => false,
            })
        })?;

        Ok(msh)
    }
}
