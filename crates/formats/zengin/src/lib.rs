//! **zengin** - read-only parsers for the ZenGin engine's compiled asset
//! formats.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`world`]    | Serialized world archives: mesh, BSP tree, VOB forest |
//! | [`archive`]  | The self-describing object-graph archive (ASCII / BINARY / BIN_SAFE) |
//! | [`proto`]    | Proto-mesh chunks with per-material sub-index-buffers |
//! | [`softskin`] | Soft-skinned mesh chunks (proto-mesh + weights + rig nodes) |
//! | [`script`]   | Compiled script binaries: symbol table + bytecode |
//! | [`texture`]  | Compiled textures with palettized and block-compressed layouts |
//!
//! Every decoder is a pure transform from a byte slice to an owned value
//! tree. Errors abort the current resource; recoverable anomalies go to
//! an explicit [`diag::DiagnosticSink`].

pub mod archive;
pub mod chunk;
pub mod cursor;
pub mod diag;
pub mod error;
pub mod material;
pub mod math;
pub mod proto;
pub mod script;
pub mod softskin;
pub mod texture;
pub mod world;

pub use error::{Error, Result};

use diag::DiagnosticSink;

/// Game release the asset was compiled for. Selects minor schema
/// variants in VOB decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameVersion {
    Gothic1,
    Gothic2,
}

/// Parse a serialized world. Warnings are logged via `tracing`.
pub fn parse_world(data: &[u8], version: GameVersion) -> Result<world::World> {
    world::World::parse(data, version, &mut diag::Log)
}

/// Parse a serialized world, reporting warnings into `diag`.
pub fn parse_world_with(
    data: &[u8],
    version: GameVersion,
    diag: &mut dyn DiagnosticSink,
) -> Result<world::World> {
    world::World::parse(data, version, diag)
}

/// Parse a compiled texture.
pub fn parse_texture(data: &[u8]) -> Result<texture::Texture> {
    texture::Texture::parse(data)
}

/// Parse a compiled script binary.
pub fn parse_script(data: &[u8]) -> Result<script::Script> {
    script::Script::parse(data)
}

/// Parse a proto-mesh. Warnings are logged via `tracing`.
pub fn parse_proto_mesh(data: &[u8]) -> Result<proto::ProtoMesh> {
    proto::ProtoMesh::parse(&mut cursor::Cursor::new(data), &mut diag::Log)
}

/// Parse a proto-mesh, reporting warnings into `diag`.
pub fn parse_proto_mesh_with(
    data: &[u8],
    diag: &mut dyn DiagnosticSink,
) -> Result<proto::ProtoMesh> {
    proto::ProtoMesh::parse(&mut cursor::Cursor::new(data), diag)
}

/// Parse a soft-skin mesh with the engine-faithful defaults. Warnings
/// are logged via `tracing`.
pub fn parse_soft_skin_mesh(data: &[u8]) -> Result<softskin::SoftSkinMesh> {
    softskin::SoftSkinMesh::parse(
        &mut cursor::Cursor::new(data),
        softskin::SoftSkinOptions::default(),
        &mut diag::Log,
    )
}

/// Parse a soft-skin mesh with explicit options, reporting warnings
/// into `diag`.
pub fn parse_soft_skin_mesh_with(
    data: &[u8],
    options: softskin::SoftSkinOptions,
    diag: &mut dyn DiagnosticSink,
) -> Result<softskin::SoftSkinMesh> {
    softskin::SoftSkinMesh::parse(&mut cursor::Cursor::new(data), options, diag)
}
