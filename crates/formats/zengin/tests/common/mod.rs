//! In-memory fixture builders for the integration tests.
//!
//! Fixtures are assembled with the library [`Writer`] so every test runs
//! from a self-contained byte buffer instead of committed sample files.

#![allow(dead_code)]

use glam::{Mat3, Vec2, Vec3};
use zengin::cursor::Writer;

// ── chunk streams ────────────────────────────────────────────────────────────

/// Append one `(u16 id, u32 length, payload)` record.
pub fn chunk(w: &mut Writer, id: u16, payload: &[u8]) {
    w.write_u16(id);
    w.write_u32(payload.len() as u32);
    w.write_bytes(payload);
}

/// An oriented bounding box without children.
pub fn obb(w: &mut Writer, center: Vec3, half_width: Vec3) {
    w.write_vec3(center);
    w.write_vec3(Vec3::X);
    w.write_vec3(Vec3::Y);
    w.write_vec3(Vec3::Z);
    w.write_vec3(half_width);
    w.write_u16(0); // no children
}

// ── binary archives ──────────────────────────────────────────────────────────

/// Builder for the BINARY wire variant: untagged little-endian values,
/// objects framed by a backpatched byte size.
pub struct BinaryArchive {
    w: Writer,
    object_starts: Vec<usize>,
}

impl BinaryArchive {
    pub fn new(object_count: u32) -> Self {
        let mut w = Writer::new();
        w.write_line("ZenGin Archive");
        w.write_line("ver 1");
        w.write_line("zCArchiverGeneric");
        w.write_line("BINARY");
        w.write_line("saveGame 0");
        w.write_line("date 27.7.2001 17:23:33");
        w.write_line("END");
        w.write_line(&format!("objects {object_count}"));
        w.write_line("END");
        w.write_line("");
        Self {
            w,
            object_starts: Vec::new(),
        }
    }

    pub fn begin_object(&mut self, name: &str, class: &str, version: u16, index: u32) {
        self.object_starts.push(self.w.position());
        self.w.write_u32(0); // size, backpatched in end_object
        self.w.write_u16(version);
        self.w.write_u32(index);
        self.w.write_line(if name.is_empty() { "%" } else { name });
        self.w.write_line(class);
    }

    pub fn end_object(&mut self) {
        let start = self.object_starts.pop().expect("unbalanced end_object");
        let size = (self.w.position() - start) as u32;
        self.w.patch_u32(start, size);
    }

    /// A back-reference to the object archived under `index`.
    pub fn reference(&mut self, index: u32) {
        self.begin_object("", "\u{A7}", 0, index);
        self.end_object();
    }

    pub fn string(&mut self, v: &str) {
        self.w.write_line(v);
    }

    pub fn int(&mut self, v: i32) {
        self.w.write_i32(v);
    }

    pub fn float(&mut self, v: f32) {
        self.w.write_f32(v);
    }

    pub fn bool(&mut self, v: bool) {
        self.w.write_u8(v as u8);
    }

    pub fn enum_(&mut self, v: u8) {
        self.w.write_u8(v);
    }

    pub fn color(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.w.write_bytes(&[b, g, r, a]);
    }

    pub fn vec2(&mut self, v: Vec2) {
        self.w.write_vec2(v);
    }

    pub fn vec3(&mut self, v: Vec3) {
        self.w.write_vec3(v);
    }

    pub fn mat3(&mut self, m: Mat3) {
        self.w.write_mat3(m);
    }

    /// Direct writer access for raw embedded blocks.
    pub fn writer(&mut self) -> &mut Writer {
        &mut self.w
    }

    pub fn finish(self) -> Vec<u8> {
        assert!(self.object_starts.is_empty(), "unbalanced begin_object");
        self.w.into_bytes()
    }
}

/// One Gothic 1 material: the standalone slot-name field followed by a
/// `zCMaterial` object.
pub fn material_g1(
    ar: &mut BinaryArchive,
    index: u32,
    name: &str,
    group: u8,
    texture: &str,
) {
    ar.string(name);
    ar.begin_object("", "zCMaterial", 17408, index);
    ar.string(name);
    ar.enum_(group);
    ar.color(200, 200, 200, 255);
    ar.float(60.0);
    ar.string(texture);
    ar.vec2(Vec2::new(256.0, 256.0));
    ar.float(0.0);
    ar.end_object();
}

/// A chunk stream holding `count` materials as an embedded archive; the
/// payload of a mesh `materials` chunk.
pub fn material_chunk_payload(mats: &[(&str, u8, &str)]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u32(mats.len() as u32);
    let mut ar = BinaryArchive::new(mats.len() as u32);
    for (i, (name, group, texture)) in mats.iter().enumerate() {
        material_g1(&mut ar, i as u32, name, *group, texture);
    }
    w.write_bytes(&ar.finish());
    w.into_bytes()
}

// ── binsafe archives ─────────────────────────────────────────────────────────

const BS_STRING: u8 = 0x1;
const BS_INT: u8 = 0x2;
const BS_FLOAT: u8 = 0x3;
const BS_BYTE: u8 = 0x4;
const BS_WORD: u8 = 0x5;
const BS_BOOL: u8 = 0x6;
const BS_VEC3: u8 = 0x7;
const BS_COLOR: u8 = 0x8;
const BS_RAW: u8 = 0x9;
const BS_RAW_FLOAT: u8 = 0x10;
const BS_ENUM: u8 = 0x11;
const BS_HASH: u8 = 0x12;

/// Builder for the BIN_SAFE wire variant: tagged fields plus a trailing
/// key table referenced from the header.
pub struct BinSafeArchive {
    w: Writer,
    keys: Vec<String>,
    table_offset_pos: usize,
}

impl BinSafeArchive {
    pub fn new(object_count: u32) -> Self {
        let mut w = Writer::new();
        w.write_line("ZenGin Archive");
        w.write_line("ver 1");
        w.write_line("zCArchiverBinSafe");
        w.write_line("BIN_SAFE");
        w.write_line("saveGame 0");
        w.write_line("END");
        w.write_u32(2); // binsafe version
        w.write_u32(object_count);
        let table_offset_pos = w.position();
        w.write_u32(0); // key table offset, backpatched in finish
        Self {
            w,
            keys: Vec::new(),
            table_offset_pos,
        }
    }

    fn key_index(&mut self, key: &str) -> u32 {
        if let Some(i) = self.keys.iter().position(|k| k == key) {
            return i as u32;
        }
        self.keys.push(key.to_owned());
        (self.keys.len() - 1) as u32
    }

    fn head(&mut self, key: &str, tag: u8) {
        let index = self.key_index(key);
        self.w.write_u8(BS_HASH);
        self.w.write_u32(index);
        self.w.write_u8(tag);
    }

    pub fn string(&mut self, key: &str, v: &str) {
        self.head(key, BS_STRING);
        self.w.write_u16(v.len() as u16);
        self.w.write_bytes(v.as_bytes());
    }

    pub fn int(&mut self, key: &str, v: i32) {
        self.head(key, BS_INT);
        self.w.write_i32(v);
    }

    pub fn float(&mut self, key: &str, v: f32) {
        self.head(key, BS_FLOAT);
        self.w.write_f32(v);
    }

    pub fn byte(&mut self, key: &str, v: u8) {
        self.head(key, BS_BYTE);
        self.w.write_u8(v);
    }

    pub fn word(&mut self, key: &str, v: u16) {
        self.head(key, BS_WORD);
        self.w.write_u16(v);
    }

    pub fn bool(&mut self, key: &str, v: bool) {
        self.head(key, BS_BOOL);
        self.w.write_u32(v as u32);
    }

    pub fn enum_(&mut self, key: &str, v: u32) {
        self.head(key, BS_ENUM);
        self.w.write_u32(v);
    }

    pub fn vec3(&mut self, key: &str, v: Vec3) {
        self.head(key, BS_VEC3);
        self.w.write_vec3(v);
    }

    pub fn color(&mut self, key: &str, r: u8, g: u8, b: u8, a: u8) {
        self.head(key, BS_COLOR);
        self.w.write_bytes(&[b, g, r, a]);
    }

    pub fn raw(&mut self, key: &str, bytes: &[u8]) {
        self.head(key, BS_RAW);
        self.w.write_u16(bytes.len() as u16);
        self.w.write_bytes(bytes);
    }

    pub fn begin_object(&mut self, name: &str, class: &str, version: u16, index: u32) {
        let name = if name.is_empty() { "%" } else { name };
        self.string("object", &format!("[{name} {class} {version} {index}]"));
    }

    pub fn end_object(&mut self) {
        self.string("object", "[]");
    }

    pub fn finish(mut self) -> Vec<u8> {
        let table_offset = self.w.position() as u32;
        self.w.patch_u32(self.table_offset_pos, table_offset);
        self.w.write_u32(self.keys.len() as u32);
        for (i, key) in self.keys.iter().enumerate() {
            self.w.write_u16(key.len() as u16);
            self.w.write_u16(i as u16);
            self.w.write_u32(0); // hash, unused by the reader
            self.w.write_bytes(key.as_bytes());
        }
        self.w.into_bytes()
    }
}

// ── ascii archives ───────────────────────────────────────────────────────────

/// Builder for the ASCII wire variant.
pub struct AsciiArchive {
    w: Writer,
}

impl AsciiArchive {
    pub fn new(object_count: u32) -> Self {
        let mut w = Writer::new();
        w.write_line("ZenGin Archive");
        w.write_line("ver 1");
        w.write_line("zCArchiverGeneric");
        w.write_line("ASCII");
        w.write_line("saveGame 0");
        w.write_line("date 27.7.2001 17:23:33");
        w.write_line("user builder");
        w.write_line("END");
        w.write_line(&format!("objects {object_count}"));
        w.write_line("END");
        w.write_line("");
        Self { w }
    }

    pub fn line(&mut self, s: &str) {
        self.w.write_line(s);
    }

    pub fn begin_object(&mut self, name: &str, class: &str, version: u16, index: u32) {
        let name = if name.is_empty() { "%" } else { name };
        self.line(&format!("[{name} {class} {version} {index}]"));
    }

    pub fn end_object(&mut self) {
        self.line("[]");
    }

    pub fn field(&mut self, key: &str, ty: &str, value: &str) {
        self.line(&format!("\t{key}={ty}:{value}"));
    }

    pub fn finish(self) -> Vec<u8> {
        self.w.into_bytes()
    }
}

// ── script fixture ───────────────────────────────────────────────────────────

/// The scramble applied to symbol names: XOR with a rolling key starting
/// at 0xAF, rotated left one bit per byte.
pub fn scramble_name(name: &str) -> Vec<u8> {
    let mut key: u8 = 0xAF;
    let mut out = Vec::with_capacity(name.len() + 1);
    for &b in name.as_bytes() {
        out.push(b ^ key);
        key = key.rotate_left(1);
    }
    out.push(0);
    out
}

pub const KIND_FLOAT: u32 = 1;
pub const KIND_INT: u32 = 2;
pub const KIND_STRING: u32 = 3;
pub const KIND_CLASS: u32 = 4;
pub const KIND_FUNCTION: u32 = 5;
pub const KIND_PROTOTYPE: u32 = 6;
pub const KIND_INSTANCE: u32 = 7;

pub const FLAG_CONST: u32 = 1;
pub const FLAG_RETURN: u32 = 2;
pub const FLAG_MEMBER: u32 = 4;
pub const FLAG_EXTERNAL: u32 = 8;

pub enum SymData<'a> {
    None,
    Floats(&'a [f32]),
    Ints(&'a [i32]),
    Strings(&'a [&'a str]),
    /// Address of a function, prototype or instance.
    Address(u32),
}

pub struct SymSpec<'a> {
    pub name: &'a str,
    pub kind: u32,
    pub flags: u32,
    pub count: u32,
    pub offset: u32,
    pub parent: i32,
    pub data: SymData<'a>,
    pub return_type: Option<u8>,
}

impl<'a> SymSpec<'a> {
    pub fn new(name: &'a str, kind: u32, flags: u32, count: u32) -> Self {
        Self {
            name,
            kind,
            flags,
            count,
            offset: 0,
            parent: -1,
            data: SymData::None,
            return_type: None,
        }
    }
}

fn write_symbol(w: &mut Writer, spec: &SymSpec<'_>) {
    w.write_u32(1); // named
    w.write_bytes(&scramble_name(spec.name));
    w.write_u32(spec.offset);
    w.write_u32(spec.count | (spec.kind << 12) | (spec.flags << 16));
    match spec.data {
        SymData::None => {}
        SymData::Floats(values) => {
            for &v in values {
                w.write_f32(v);
            }
        }
        SymData::Ints(values) => {
            for &v in values {
                w.write_i32(v);
            }
        }
        SymData::Strings(values) => {
            for v in values {
                w.write_u16(v.len() as u16);
                w.write_bytes(v.as_bytes());
            }
        }
        SymData::Address(address) => w.write_u32(address),
    }
    w.write_i32(spec.parent);
    if let Some(rt) = spec.return_type {
        w.write_u8(rt);
    }
}

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn op_sym(buf: &mut [u8], offset: usize, op: u8, operand: u32) {
    buf[offset] = op;
    put(buf, offset + 1, &operand.to_le_bytes());
}

/// Build the menu-script fixture: a small symbol table shaped like the
/// engine's menu script plus a bytecode stream with known bodies at
/// addresses 236, 372, 458, 500 and 1877.
pub fn build_script() -> Vec<u8> {
    let symbols = [
        SymSpec {
            data: SymData::Floats(&[1.5]),
            ..SymSpec::new("MEMINT_FLOAT", KIND_FLOAT, FLAG_CONST, 1)
        },
        SymSpec {
            data: SymData::Address(0),
            ..SymSpec::new(
                "UPDATE_CHOICEBOX",
                KIND_FUNCTION,
                FLAG_EXTERNAL | FLAG_CONST,
                1,
            )
        },
        SymSpec {
            parent: 1,
            ..SymSpec::new("UPDATE_CHOICEBOX.BOX", KIND_STRING, 0, 0)
        },
        SymSpec {
            offset: 3096,
            ..SymSpec::new("C_MENU", KIND_CLASS, 0, 4)
        },
        SymSpec {
            parent: 3,
            ..SymSpec::new("C_MENU.BACKPIC", KIND_STRING, FLAG_MEMBER, 1)
        },
        SymSpec {
            parent: 3,
            offset: 20,
            ..SymSpec::new("C_MENU.ITEMS", KIND_STRING, FLAG_MEMBER, 2)
        },
        SymSpec {
            parent: 3,
            offset: 60,
            ..SymSpec::new("C_MENU.FLAGS", KIND_INT, FLAG_MEMBER, 1)
        },
        SymSpec {
            parent: 3,
            offset: 64,
            ..SymSpec::new("C_MENU.DONTSCALE", KIND_FLOAT, FLAG_MEMBER, 1)
        },
        SymSpec {
            parent: 3,
            data: SymData::Address(236),
            ..SymSpec::new("C_MENU_DEF", KIND_PROTOTYPE, 0, 0)
        },
        SymSpec {
            data: SymData::Address(1877),
            return_type: Some(KIND_INT as u8),
            ..SymSpec::new("SHOWINTRO", KIND_FUNCTION, FLAG_RETURN | FLAG_CONST, 0)
        },
        SymSpec {
            parent: 8,
            data: SymData::Address(372),
            ..SymSpec::new("MENU_MAIN", KIND_INSTANCE, 0, 0)
        },
        SymSpec {
            parent: 8,
            data: SymData::Address(458),
            ..SymSpec::new("MENU_BACK", KIND_INSTANCE, 0, 0)
        },
        SymSpec {
            data: SymData::Strings(&["BACK", "EXIT"]),
            ..SymSpec::new("STR_CONSTANTS", KIND_STRING, FLAG_CONST, 2)
        },
        SymSpec {
            data: SymData::Ints(&[10, 20, 30]),
            ..SymSpec::new("INT_TABLE", KIND_INT, FLAG_CONST, 3)
        },
        SymSpec {
            data: SymData::Address(500),
            ..SymSpec::new("PLAYVIDEO", KIND_FUNCTION, FLAG_CONST, 1)
        },
        SymSpec {
            parent: 14,
            ..SymSpec::new("PLAYVIDEO.FILENAME", KIND_STRING, 0, 0)
        },
        // Duplicate name: lookups must keep resolving to symbol 10.
        SymSpec {
            data: SymData::Ints(&[99]),
            ..SymSpec::new("MENU_MAIN", KIND_INT, FLAG_CONST, 1)
        },
    ];

    let mut w = Writer::new();
    w.write_u8(50); // dat version
    w.write_u32(symbols.len() as u32);
    for i in 0..symbols.len() as u32 {
        w.write_u32(i); // sort table, unused by the decoder
    }
    for spec in &symbols {
        write_symbol(&mut w, spec);
    }

    // Bytecode. Gaps stay zero (op 0 = add, one byte).
    let mut bc = vec![0u8; 1883];
    // 236: C_MENU_DEF body.
    op_sym(&mut bc, 236, 65, 4); // push_var C_MENU.BACKPIC
    op_sym(&mut bc, 241, 64, 0); // push_int 0
    bc[246] = 60; // return
    // 372: MENU_MAIN body.
    op_sym(&mut bc, 372, 61, 236); // call C_MENU_DEF
    op_sym(&mut bc, 377, 65, 4); // push_var
    op_sym(&mut bc, 382, 65, 12); // push_var
    bc[387] = 70; // assign_string
    op_sym(&mut bc, 388, 65, 5);
    op_sym(&mut bc, 393, 65, 12);
    bc[398] = 70;
    op_sym(&mut bc, 399, 65, 6);
    op_sym(&mut bc, 404, 65, 13);
    bc[409] = 70;
    bc[410] = 60;
    // 458: MENU_BACK body, exercising the six-byte array push.
    op_sym(&mut bc, 458, 245, 13); // push_array_var INT_TABLE
    bc[463] = 2; // element index
    bc[464] = 60;
    // 500: PLAYVIDEO body.
    bc[500] = 60;
    // 1877: SHOWINTRO body.
    op_sym(&mut bc, 1877, 64, 1); // push_int 1
    bc[1882] = 60;

    w.write_u32(bc.len() as u32);
    w.write_bytes(&bc);
    w.into_bytes()
}

// ── texture fixtures ─────────────────────────────────────────────────────────

pub const TEX_B8G8R8A8: u32 = 0;
pub const TEX_R8G8B8A8: u32 = 1;
pub const TEX_A8B8G8R8: u32 = 2;
pub const TEX_A8R8G8B8: u32 = 3;
pub const TEX_B8G8R8: u32 = 4;
pub const TEX_R8G8B8: u32 = 5;
pub const TEX_A4R4G4B4: u32 = 6;
pub const TEX_R5G6B5: u32 = 8;
pub const TEX_P8: u32 = 9;
pub const TEX_DXT1: u32 = 0xA;

/// Write a `ZTEX` header. Mipmap payloads follow, smallest level first.
pub fn ztex_header(
    w: &mut Writer,
    format: u32,
    width: u32,
    height: u32,
    mipmap_count: u32,
    average_color: [u8; 4],
) {
    w.write_bytes(b"ZTEX");
    w.write_u32(0); // version
    w.write_u32(format);
    w.write_u32(width);
    w.write_u32(height);
    w.write_u32(mipmap_count);
    w.write_u32(width); // ref_width
    w.write_u32(height); // ref_height
    w.write_bytes(&average_color);
}

/// A simple single-level texture of the given format.
pub fn build_texture(format: u32, width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let mut w = Writer::new();
    ztex_header(&mut w, format, width, height, 1, [0, 0, 0, 0xFF]);
    w.write_bytes(pixels);
    w.into_bytes()
}

// ── proto / soft-skin fixtures ───────────────────────────────────────────────

/// A proto-mesh chunk stream: 3 vertices, 3 features, 1 material, one
/// triangle.
pub fn proto_mesh_stream() -> Vec<u8> {
    let mut w = Writer::new();

    // header: version, bbox, obb
    let mut header = Writer::new();
    header.write_u32(1);
    header.write_vec3(Vec3::new(-1.0, -1.0, -1.0));
    header.write_vec3(Vec3::new(1.0, 1.0, 1.0));
    obb(&mut header, Vec3::ZERO, Vec3::ONE);
    chunk(&mut w, 0xB100, &header.into_bytes());

    // mesh: vertices, features, materials
    let mut mesh = Writer::new();
    mesh.write_u32(3);
    mesh.write_vec3(Vec3::new(0.0, 0.0, 0.0));
    mesh.write_vec3(Vec3::new(1.0, 0.0, 0.0));
    mesh.write_vec3(Vec3::new(0.0, 1.0, 0.0));
    mesh.write_u32(3);
    for i in 0..3u32 {
        mesh.write_vec2(Vec2::new(i as f32, 0.5));
        mesh.write_u32(4292927712);
        mesh.write_vec3(Vec3::new(0.0, 1.0, 0.0));
    }
    mesh.write_bytes(&material_chunk_payload(&[("BODY", 3, "HUM_BODY.TGA")]));
    chunk(&mut w, 0xB1FE, &mesh.into_bytes());

    // polygons: one submesh, one triangle
    let mut polys = Writer::new();
    polys.write_u32(1);
    polys.write_u32(0); // material index
    polys.write_u32(1); // triangle count
    polys.write_u16(0);
    polys.write_u16(1);
    polys.write_u16(2);
    chunk(&mut w, 0xB140, &polys.into_bytes());

    chunk(&mut w, 0xB1FF, &[]);
    w.into_bytes()
}

/// The payload of a soft-skin `nodes` chunk with two weights, two wedge
/// normals and two rig nodes.
pub fn softskin_nodes_payload() -> Vec<u8> {
    let mut w = Writer::new();

    // weight block: length prefix covers the count field + records
    let weight_count = 2u32;
    w.write_u32(4 + weight_count * 17);
    w.write_u32(weight_count);
    w.write_f32(0.75);
    w.write_vec3(Vec3::new(1.0, 2.0, 3.0));
    w.write_u8(0);
    w.write_f32(0.25);
    w.write_vec3(Vec3::new(4.0, 5.0, 6.0));
    w.write_u8(1);

    // wedge normals
    w.write_u32(2);
    w.write_vec3(Vec3::new(0.0, 1.0, 0.0));
    w.write_u32(0);
    w.write_vec3(Vec3::new(1.0, 0.0, 0.0));
    w.write_u32(1);

    // rig nodes + one bounding volume each
    w.write_u16(2);
    w.write_i32(3);
    w.write_i32(7);
    obb(&mut w, Vec3::ZERO, Vec3::ONE);
    obb(&mut w, Vec3::ONE, Vec3::ONE);

    w.into_bytes()
}

/// A complete soft-skin chunk stream. `noise` inserts an unknown chunk
/// between the proto and nodes chunks.
pub fn build_soft_skin(noise: bool) -> Vec<u8> {
    let mut w = Writer::new();

    let mut header = Writer::new();
    header.write_u32(2);
    chunk(&mut w, 0xE100, &header.into_bytes());

    chunk(&mut w, 0xB100, &proto_mesh_stream());

    if noise {
        chunk(&mut w, 0x5A5A, &[0xDE, 0xAD, 0xBE, 0xEF, 0x42]);
    }

    chunk(&mut w, 0xB1FF, &softskin_nodes_payload());
    chunk(&mut w, 0xE110, &[]);
    w.into_bytes()
}

// ── world fixture ────────────────────────────────────────────────────────────

pub const CAMPFIRE_SPOT: &str = "FP_CAMPFIRE_PATH_BANDITOS2_03_02";
pub const CAMPFIRE_POSITION: [f32; 3] = [-18544.486, -136.171_91, 4141.197_3];

fn world_mesh_and_bsp(w: &mut Writer) {
    // mesh chunks
    let mut head = Writer::new();
    head.write_u32(9);
    head.write_line("");
    chunk(w, 0xB000, &head.into_bytes());

    let mut bbox = Writer::new();
    for _ in 0..8 {
        bbox.write_f32(0.0);
    }
    chunk(w, 0xB010, &bbox.into_bytes());

    chunk(
        w,
        0xB020,
        &material_chunk_payload(&[
            ("OWODWATSTOP", 5, "OWODSEA_A0.TGA"),
            ("OMWABROWNGREEN01", 2, "OMWABROWNGREEN01.TGA"),
        ]),
    );

    let mut verts = Writer::new();
    verts.write_u32(4);
    verts.write_vec3(Vec3::new(91365.0, -4026.600_8, 46900.0));
    verts.write_vec3(Vec3::new(92900.0, -4029.999_8, 38399.996));
    verts.write_vec3(Vec3::new(44263.82, 708.517_8, 6841.182_6));
    verts.write_vec3(Vec3::new(45672.61, 640.436_16, 6877.815_4));
    chunk(w, 0xB030, &verts.into_bytes());

    let mut feats = Writer::new();
    feats.write_u32(4);
    let uvs = [
        Vec2::new(1.111_938_5, 2.644_151_7),
        Vec2::new(-0.371_101_38, -0.909_111_02),
        Vec2::new(-0.524_971, 2.594_786_6),
        Vec2::new(1.933_769_2, -0.734_043_1),
    ];
    let lights = [4292927712u32, 4292927712, 4281084972, 4281084972];
    for i in 0..4 {
        feats.write_vec2(uvs[i]);
        feats.write_u32(lights[i]);
        feats.write_vec3(Vec3::new(0.0, 1.0, 0.0));
    }
    chunk(w, 0xB040, &feats.into_bytes());

    let mut polys = Writer::new();
    polys.write_u32(2);
    for first in [0u32, 1] {
        polys.write_u16(first as u16); // material index
        polys.write_u8(0); // flags
        polys.write_u8(3); // vertex count
        for k in 0..3u32 {
            let idx = (first + k) % 4;
            polys.write_u32(idx); // vertex
            polys.write_u32(idx); // feature
        }
    }
    chunk(w, 0xB050, &polys.into_bytes());

    chunk(w, 0xB060, &[]);

    // bsp chunks
    let mut mode = Writer::new();
    mode.write_u32(1); // outdoor
    chunk(w, 0xC000, &mode.into_bytes());

    let mut indices = Writer::new();
    let poly_indices = [0u32, 1, 2, 102, 103, 92];
    indices.write_u32(poly_indices.len() as u32);
    for v in poly_indices {
        indices.write_u32(v);
    }
    chunk(w, 0xC010, &indices.into_bytes());

    let mut nodes = Writer::new();
    nodes.write_u32(1);
    nodes.write_vec4(glam::Vec4::new(0.0, 1.0, 0.0, 0.0)); // plane
    nodes.write_vec3(Vec3::splat(-100.0));
    nodes.write_vec3(Vec3::splat(100.0));
    nodes.write_i32(-1);
    nodes.write_i32(-1);
    chunk(w, 0xC040, &nodes.into_bytes());

    let mut leaves = Writer::new();
    leaves.write_u32(1);
    leaves.write_u32(0); // first index
    leaves.write_u32(6); // count
    chunk(w, 0xC045, &leaves.into_bytes());

    chunk(w, 0xC0FF, &[]);
}

/// Write the Gothic 1 base fields of a VOB.
#[allow(clippy::too_many_arguments)]
pub fn vob_base(
    ar: &mut BinaryArchive,
    vob_name: &str,
    visual_name: &str,
    position: Vec3,
    rotation: Mat3,
    bbox_min: Vec3,
    bbox_max: Vec3,
    cd_static: bool,
) {
    ar.string(""); // preset name
    ar.vec3(bbox_min);
    ar.vec3(bbox_max);
    ar.mat3(rotation);
    ar.vec3(position);
    ar.string(vob_name);
    ar.string(visual_name);
    ar.bool(false); // show_visual
    ar.enum_(0); // camera alignment
    ar.bool(cd_static);
    ar.bool(false); // cd_dynamic
    ar.bool(false); // vob_static
    ar.enum_(0); // dynamic shadows
    ar.enum_(0); // animation mode
    ar.float(0.0); // animation strength
    ar.float(0.0); // far clip scale
}

/// A minimal Gothic 2 world: the same mesh and BSP block, one root VOB
/// carrying the three extra base fields of the newer schema.
pub fn build_world_g2() -> Vec<u8> {
    let mut ar = BinaryArchive::new(4);

    ar.begin_object("", "oCWorld:zCWorld", 64513, 0);

    ar.begin_object("MeshAndBsp", "zCMesh", 0, 1);
    {
        let w = ar.writer();
        w.write_u32(0x09000000);
        let len_pos = w.position();
        w.write_u32(0);
        let start = w.position();
        world_mesh_and_bsp(w);
        let len = (w.position() - start) as u32;
        w.patch_u32(len_pos, len);
    }
    ar.end_object();

    ar.begin_object("VobTree", "zCVobTree", 0, 2);
    ar.int(1);

    ar.begin_object("", "zCVob", 52224, 3);
    vob_base(
        &mut ar,
        "SHADOWBEAST_CAVE",
        "",
        Vec3::new(1.0, 2.0, 3.0),
        Mat3::IDENTITY,
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        false,
    );
    ar.int(3); // bias
    ar.bool(true); // ambient
    ar.bool(true); // physics_enabled
    ar.end_object();
    ar.int(0);

    ar.end_object(); // VobTree
    ar.end_object(); // oCWorld
    ar.finish()
}

/// A serialized world in the BINARY wire variant:
///
/// - mesh with the two named materials, 4 vertices, 4 features,
/// - an outdoor BSP with 6 polygon indices,
/// - two root VOBs: a level compound (`SURFACE.3DS`) with one freepoint
///   child, and a plain `LEVEL-VOB` (`OLDCAMP.3DS`) with an item, an
///   unknown-class object and a back-reference to the item.
pub fn build_world() -> Vec<u8> {
    let mut ar = BinaryArchive::new(9);

    ar.begin_object("", "oCWorld:zCWorld", 64513, 0);

    // MeshAndBsp: a raw embedded block.
    ar.begin_object("MeshAndBsp", "zCMesh", 0, 1);
    {
        let w = ar.writer();
        w.write_u32(0x09000000); // bsp version
        let len_pos = w.position();
        w.write_u32(0); // block length
        let start = w.position();
        world_mesh_and_bsp(w);
        let len = (w.position() - start) as u32;
        w.patch_u32(len_pos, len);
    }
    ar.end_object();

    // VobTree: two roots.
    ar.begin_object("VobTree", "zCVobTree", 0, 2);
    ar.int(2);

    // Root 0: the level compound with one freepoint child.
    ar.begin_object("", "zCVobLevelCompo:zCVob", 52224, 3);
    vob_base(
        &mut ar,
        "LEVEL-VOB",
        "SURFACE.3DS",
        Vec3::ZERO,
        Mat3::IDENTITY,
        Vec3::new(-71919.96, -13091.823, -59900.0),
        Vec3::new(108999.99, 20014.035, 67399.99),
        true,
    );
    ar.end_object();
    ar.int(1); // one child
    {
        ar.begin_object("", "zCVobSpot:zCVob", 52224, 4);
        let rot = Mat3::from_cols(
            Vec3::new(-0.779_197, 0.0, 0.626_779_1),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-0.626_779_1, 0.0, -0.779_197),
        );
        vob_base(
            &mut ar,
            CAMPFIRE_SPOT,
            "",
            Vec3::from_array(CAMPFIRE_POSITION),
            rot,
            Vec3::new(-18596.9, -161.171_89, 4091.133_3),
            Vec3::new(-18492.072, -111.171_906, 4191.262_2),
            false,
        );
        ar.end_object();
        ar.int(0);
    }

    // Root 1: a second level compound with three children.
    ar.begin_object("", "zCVob", 52224, 5);
    vob_base(
        &mut ar,
        "LEVEL-VOB",
        "OLDCAMP.3DS",
        Vec3::ZERO,
        Mat3::IDENTITY,
        Vec3::new(-9999.402, -10000.004, -9200.0),
        Vec3::new(9060.598, 5909.9004, 7537.4746),
        false,
    );
    ar.end_object();
    ar.int(3);
    {
        // Child 0: an item.
        ar.begin_object("", "oCItem:zCVob", 52224, 6);
        vob_base(
            &mut ar,
            "FIREPLACE_APPLE",
            "ITFO_APPLE.3DS",
            Vec3::new(10.0, 0.0, -5.0),
            Mat3::IDENTITY,
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            false,
        );
        ar.string("ITFO_APPLE");
        ar.end_object();
        ar.int(0);

        // Child 1: a class this library has no decoder for; two extra
        // fields the decoder must resync over.
        ar.begin_object("", "oCMobFire:zCVob", 52224, 7);
        vob_base(
            &mut ar,
            "CAMPFIRE",
            "FIRE.3DS",
            Vec3::new(0.0, 0.0, 0.0),
            Mat3::IDENTITY,
            Vec3::new(-2.0, -2.0, -2.0),
            Vec3::new(2.0, 2.0, 2.0),
            false,
        );
        ar.float(13.5);
        ar.float(0.25);
        ar.end_object();
        ar.int(0);

        // Child 2: a back-reference to the item.
        ar.reference(6);
        ar.int(0);
    }

    ar.end_object(); // VobTree
    ar.end_object(); // oCWorld
    ar.finish()
}
