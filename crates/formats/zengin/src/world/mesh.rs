//! Decoder for the compiled world mesh embedded in world archives.

use glam::{Vec3, Vec4};

use crate::archive::Archive;
use crate::chunk::walk_chunks;
use crate::cursor::Cursor;
use crate::diag::DiagnosticSink;
use crate::error::Result;
use crate::material::Material;
use crate::proto::VertexFeature;

const CHUNK_MESH: u16 = 0xB000;
const CHUNK_BBOX: u16 = 0xB010;
const CHUNK_MATERIALS: u16 = 0xB020;
const CHUNK_VERTICES: u16 = 0xB030;
const CHUNK_FEATURES: u16 = 0xB040;
const CHUNK_POLYGONS: u16 = 0xB050;
pub(crate) const CHUNK_END: u16 = 0xB060;

/// One polygon of the world mesh, indexing into the vertex and feature
/// tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub material_index: u16,
    pub flags: u8,
    pub indices: Vec<PolygonIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolygonIndex {
    pub vertex: u32,
    pub feature: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub name: String,
    pub bbox: (Vec4, Vec4),
    pub materials: Vec<Material>,
    pub vertices: Vec<Vec3>,
    pub features: Vec<VertexFeature>,
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    pub(crate) fn parse(cur: &mut Cursor<'_>, diag: &mut dyn DiagnosticSink) -> Result<Self> {
        let mut mesh = Mesh::default();

        walk_chunks(cur, CHUNK_END, diag, |id, chunk, diag| {
            Ok(match id {
                CHUNK_MESH => {
                    let _version = chunk.read_u32()?;
                    mesh.name = chunk.read_line()?;
                    true
                }
                CHUNK_BBOX => {
                    mesh.bbox = (chunk.read_vec4()?, chunk.read_vec4()?);
                    true
                }
                CHUNK_MATERIALS => {
                    let material_count = chunk.read_u32()? as usize;
                    let sub = chunk.extract(chunk.remaining())?;
                    let mut archive = Archive::open(sub, diag)?;
                    mesh.materials.reserve(material_count);
                    for _ in 0..material_count {
                        mesh.materials.push(Material::parse(&mut archive)?);
                    }
                    true
                }
                CHUNK_VERTICES => {
                    let count = chunk.read_u32()? as usize;
                    mesh.vertices.reserve(count);
                    for _ in 0..count {
                        mesh.vertices.push(chunk.read_vec3()?);
                    }
                    true
                }
                CHUNK_FEATURES => {
                    let count = chunk.read_u32()? as usize;
                    mesh.features.reserve(count);
                    for _ in 0..count {
                        mesh.features.push(VertexFeature::parse(chunk)?);
                    }
                    true
                }
                CHUNK_POLYGONS => {
                    let count = chunk.read_u32()? as usize;
                    mesh.polygons.reserve(count);
                    for _ in 0..count {
                        let material_index = chunk.read_u16()?;
                        let flags = chunk.read_u8()?;
                        let vertex_count = chunk.read_u8()? as usize;
                        let mut indices = Vec::with_capacity(vertex_count);
                        for _ in 0..vertex_count {
                            indices.push(PolygonIndex {
                                vertex: chunk.read_u32()?,
                                feature: chunk.read_u32()?,
                            });
                        }
                        mesh.polygons.push(Polygon {
                            material_index,
                            flags,
                            indices,
                        });
                    }
                    true
                }
                CHUNK_END => true,
                _ => false,
            })
        })?;

        Ok(mesh)
    }
}
