//! Decoder for proto-meshes, the intermediate mesh representation with
//! per-material sub-index-buffers.

use glam::{Vec2, Vec3};

use crate::archive::Archive;
use crate::chunk::walk_chunks;
use crate::cursor::Cursor;
use crate::diag::DiagnosticSink;
use crate::error::Result;
use crate::material::Material;
use crate::math::{BoundingBox, Obb};

const CHUNK_HEADER: u16 = 0xB100;
const CHUNK_MESH: u16 = 0xB1FE;
const CHUNK_POLYGONS: u16 = 0xB140;
const CHUNK_LIGHTMAPS: u16 = 0xB150;
const CHUNK_LIGHTMAPS_SHARED: u16 = 0xB155;
const CHUNK_END: u16 = 0xB1FF;

/// Per-vertex surface attributes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexFeature {
    pub texture: Vec2,
    /// Packed BGRA vertex light color.
    pub light: u32,
    pub normal: Vec3,
}

impl VertexFeature {
    pub(crate) fn parse(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            texture: c.read_vec2()?,
            light: c.read_u32()?,
            normal: c.read_vec3()?,
        })
    }
}

/// The index triples of one material's triangles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubMesh {
    pub material_index: u32,
    pub triangles: Vec<[u16; 3]>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoMesh {
    pub vertices: Vec<Vec3>,
    pub features: Vec<VertexFeature>,
    pub materials: Vec<Material>,
    pub submeshes: Vec<SubMesh>,
    pub bbox: BoundingBox,
    pub obb: Obb,
    /// Raw lightmap payloads; kept as stored.
    pub lightmaps: Vec<Vec<u8>>,
    pub lightmaps_shared: Vec<Vec<u8>>,
}

impl ProtoMesh {
    /// Parse a proto-mesh chunk stream. This is both the layout of a
    /// standalone proto-mesh resource and of the `proto` chunk payload
    /// inside a soft-skin mesh.
    pub fn parse(cur: &mut Cursor<'_>, diag: &mut dyn DiagnosticSink) -> Result<Self> {
        let mut mesh = ProtoMesh::default();

        walk_chunks(cur, CHUNK_END, diag, |id, chunk, diag| {
            Ok(match id {
                CHUNK_HEADER => {
                    let _version = chunk.read_u32()?;
                    mesh.bbox = BoundingBox::parse(chunk)?;
                    mesh.obb = Obb::parse(chunk)?;
                    true
                }
                CHUNK_MESH => {
                    let vertex_count = chunk.read_u32()? as usize;
                    mesh.vertices.reserve(vertex_count);
                    for _ in 0..vertex_count {
                        mesh.vertices.push(chunk.read_vec3()?);
                    }

                    let feature_count = chunk.read_u32()? as usize;
                    mesh.features.reserve(feature_count);
                    for _ in 0..feature_count {
                        mesh.features.push(VertexFeature::parse(chunk)?);
                    }

                    // Materials close the chunk as an embedded archive.
                    let material_count = chunk.read_u32()? as usize;
                    let sub = chunk.extract(chunk.remaining())?;
                    let mut archive = Archive::open(sub, diag)?;
                    mesh.materials.reserve(material_count);
                    for _ in 0..material_count {
                        mesh.materials.push(Material::parse(&mut archive)?);
                    }
                    true
                }
                CHUNK_POLYGONS => {
                    let submesh_count = chunk.read_u32()? as usize;
                    mesh.submeshes.reserve(submesh_count);
                    for _ in 0..submesh_count {
                        let material_index = chunk.read_u32()?;
                        let triangle_count = chunk.read_u32()? as usize;
                        let mut triangles = Vec::with_capacity(triangle_count);
                        for _ in 0..triangle_count {
                            triangles.push([chunk.read_u16()?, chunk.read_u16()?, chunk.read_u16()?]);
                        }
                        mesh.submeshes.push(SubMesh {
                            material_index,
                            triangles,
                        });
                    }
                    true
                }
                CHUNK_LIGHTMAPS => {
                    let n = chunk.remaining();
                    mesh.lightmaps.push(chunk.read_bytes(n)?.to_vec());
                    true
                }
                CHUNK_LIGHTMAPS_SHARED => {
                    let n = chunk.remaining();
                    mesh.lightmaps_shared.push(chunk.read_bytes(n)?.to_vec());
                    true
                }
                CHUNK_END => true,
                _ => false,
            })
        })?;

        Ok(mesh)
    }
}
