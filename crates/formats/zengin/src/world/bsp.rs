//! Decoder for the binary space partition over the world mesh.

use glam::Vec4;

use crate::chunk::walk_chunks;
use crate::cursor::Cursor;
use crate::diag::DiagnosticSink;
use crate::error::{Error, Result};
use crate::math::BoundingBox;

const CHUNK_HEADER: u16 = 0xC000;
const CHUNK_POLYGONS: u16 = 0xC010;
const CHUNK_NODES: u16 = 0xC040;
const CHUNK_LEAVES: u16 = 0xC045;
pub(crate) const CHUNK_END: u16 = 0xC0FF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BspTreeMode {
    Indoor,
    #[default]
    Outdoor,
}

/// An inner node of the tree. Child indices of -1 mean "no child".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BspNode {
    pub plane: Vec4,
    pub bbox: BoundingBox,
    pub front: i32,
    pub back: i32,
}

/// A leaf, covering a contiguous run of `polygon_indices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BspLeaf {
    pub first_index: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BspTree {
    pub mode: BspTreeMode,
    pub polygon_indices: Vec<u32>,
    pub nodes: Vec<BspNode>,
    pub leaves: Vec<BspLeaf>,
}

impl BspTree {
    pub(crate) fn parse(cur: &mut Cursor<'_>, diag: &mut dyn DiagnosticSink) -> Result<Self> {
        let mut tree = BspTree::default();

        walk_chunks(cur, CHUNK_END, diag, |id, chunk, _diag| {
            Ok(match id {
                CHUNK_HEADER => {
                    tree.mode = match chunk.read_u32()? {
                        0 => BspTreeMode::Indoor,
                        1 => BspTreeMode::Outdoor,
                        other => {
                            return Err(Error::Parse {
                                context: "bsp tree",
                                message: format!("unknown tree mode {other}"),
                            })
                        }
                    };
                    true
                }
                CHUNK_POLYGONS => {
                    let count = chunk.read_u32()? as usize;
                    tree.polygon_indices.reserve(count);
                    for _ in 0..count {
                        tree.polygon_indices.push(chunk.read_u32()?);
                    }
                    true
                }
                CHUNK_NODES => {
                    let count = chunk.read_u32()? as usize;
                    tree.nodes.reserve(count);
                    for _ in 0..count {
                        tree.nodes.push(BspNode {
                            plane: chunk.read_vec4()?,
                            bbox: BoundingBox::parse(chunk)?,
                            front: chunk.read_i32()?,
                            back: chunk.read_i32()?,
                        });
                    }
                    true
                }
                CHUNK_LEAVES => {
                    let count = chunk.read_u32()? as usize;
                    tree.leaves.reserve(count);
                    for _ in 0..count {
                        tree.leaves.push(BspLeaf {
                            first_index: chunk.read_u32()?,
                            count: chunk.read_u32()?,
                        });
                    }
                    true
                }
                CHUNK_END => true,
                _ => false,
            })
        })?;

        Ok(tree)
    }
}
