//! Decoder for compiled script binaries: a symbol table followed by a
//! variable-width bytecode stream.

pub mod opcode;

pub use opcode::Opcode;

use std::collections::{BTreeMap, HashMap};

use crate::cursor::{decode_cp1252, Cursor};
use crate::error::{Error, Result};

/// Initial XOR key of the symbol-name scramble; rotated left one bit
/// after every byte. The terminating NUL is stored in the clear.
const NAME_KEY: u8 = 0xAF;

/// The value type of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SymbolKind {
    #[default]
    Void = 0,
    Float = 1,
    Int = 2,
    String = 3,
    Class = 4,
    Function = 5,
    Prototype = 6,
    Instance = 7,
}

impl SymbolKind {
    fn from_raw(raw: u32) -> Result<Self> {
        Ok(match raw {
            0 => Self::Void,
            1 => Self::Float,
            2 => Self::Int,
            3 => Self::String,
            4 => Self::Class,
            5 => Self::Function,
            6 => Self::Prototype,
            7 => Self::Instance,
            other => {
                return Err(Error::Parse {
                    context: "script",
                    message: format!("unknown symbol type {other}"),
                })
            }
        })
    }
}

/// The 6-bit flag field of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolFlags(pub u8);

impl SymbolFlags {
    pub const CONST: u8 = 1 << 0;
    pub const RETURN: u8 = 1 << 1;
    pub const MEMBER: u8 = 1 << 2;
    pub const EXTERNAL: u8 = 1 << 3;
    pub const MERGED: u8 = 1 << 4;

    pub fn is_const(self) -> bool {
        self.0 & Self::CONST != 0
    }

    pub fn has_return(self) -> bool {
        self.0 & Self::RETURN != 0
    }

    pub fn is_member(self) -> bool {
        self.0 & Self::MEMBER != 0
    }

    pub fn is_external(self) -> bool {
        self.0 & Self::EXTERNAL != 0
    }

    pub fn is_merged(self) -> bool {
        self.0 & Self::MERGED != 0
    }
}

/// Immediate values carried by constant symbols.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SymbolData {
    #[default]
    None,
    Float(Vec<f32>),
    Int(Vec<i32>),
    String(Vec<String>),
}

/// One entry of the script's symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub flags: SymbolFlags,
    /// Element count: array length for variables, parameter count for
    /// functions, member count for classes.
    pub count: u32,
    /// First-instruction PC for functions, prototypes and instances.
    pub address: u32,
    /// Byte offset within the owning class for member symbols.
    pub member_offset: u32,
    /// Instance byte size for class symbols.
    pub class_size: u32,
    /// Index of the parent symbol, -1 for none.
    pub parent: i32,
    /// Return value type of functions carrying the return flag.
    pub return_type: SymbolKind,
    pub data: SymbolData,
}

impl Symbol {
    fn parse(c: &mut Cursor<'_>) -> Result<Symbol> {
        let named = c.read_u32()? != 0;
        let name = if named {
            read_scrambled_name(c)?
        } else {
            String::new()
        };

        let offset = c.read_u32()?;
        let packed = c.read_u32()?;
        let count = packed & 0xFFF;
        let kind = SymbolKind::from_raw((packed >> 12) & 0xF)?;
        let flags = SymbolFlags(((packed >> 16) & 0x3F) as u8);

        // Members carry no immediates; their storage lives in instances.
        let data = if flags.is_member() {
            SymbolData::None
        } else {
            match kind {
                SymbolKind::Float => {
                    let mut values = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        values.push(c.read_f32()?);
                    }
                    SymbolData::Float(values)
                }
                SymbolKind::Int => {
                    let mut values = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        values.push(c.read_i32()?);
                    }
                    SymbolData::Int(values)
                }
                SymbolKind::String => {
                    let mut values = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        let len = c.read_u16()? as usize;
                        values.push(decode_cp1252(c.read_bytes(len)?));
                    }
                    SymbolData::String(values)
                }
                _ => SymbolData::None,
            }
        };

        let address = match kind {
            SymbolKind::Function | SymbolKind::Prototype | SymbolKind::Instance => c.read_u32()?,
            _ => 0,
        };

        let parent = c.read_i32()?;

        let return_type = if kind == SymbolKind::Function && flags.has_return() {
            SymbolKind::from_raw(c.read_u8()? as u32)?
        } else {
            SymbolKind::Void
        };

        Ok(Symbol {
            name,
            kind,
            flags,
            count,
            address,
            member_offset: if flags.is_member() { offset } else { 0 },
            class_size: if kind == SymbolKind::Class { offset } else { 0 },
            parent,
            return_type,
            data,
        })
    }
}

fn read_scrambled_name(c: &mut Cursor<'_>) -> Result<String> {
    let mut key = NAME_KEY;
    let mut bytes = Vec::new();
    loop {
        let b = c.read_u8()?;
        if b == 0 {
            break;
        }
        bytes.push(b ^ key);
        key = key.rotate_left(1);
    }
    Ok(decode_cp1252(&bytes))
}

/// A decoded instruction with its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Opcode,
    /// Bytes consumed, including the opcode.
    pub size: u8,
    pub operand: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operand {
    #[default]
    None,
    /// Branch or call target PC.
    Address(u32),
    /// Symbol table index.
    Symbol(u32),
    /// Inline integer.
    Immediate(i32),
    /// Symbol table index plus array element.
    ArrayElement { symbol: u32, index: u8 },
}

/// Flat view of an [`Instruction`] with unused operand fields zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionView {
    pub op: Opcode,
    pub size: u8,
    pub address: i32,
    pub symbol: u32,
    pub index: u8,
    pub immediate: i32,
}

impl Instruction {
    pub fn view(&self) -> InstructionView {
        let mut view = InstructionView {
            op: self.op,
            size: self.size,
            address: 0,
            symbol: 0,
            index: 0,
            immediate: 0,
        };
        match self.operand {
            Operand::None => {}
            Operand::Address(address) => view.address = address as i32,
            Operand::Symbol(symbol) => view.symbol = symbol,
            Operand::Immediate(immediate) => view.immediate = immediate,
            Operand::ArrayElement { symbol, index } => {
                view.symbol = symbol;
                view.index = index;
            }
        }
        view
    }
}

/// A parsed script: symbol table, lookup indexes and raw bytecode.
#[derive(Debug, Clone)]
pub struct Script {
    version: u8,
    symbols: Vec<Symbol>,
    bytecode: Vec<u8>,
    by_name: HashMap<String, usize>,
    by_address: BTreeMap<u32, usize>,
}

impl Script {
    pub fn parse(data: &[u8]) -> Result<Script> {
        let mut c = Cursor::new(data);

        let version = c.read_u8()?;
        let symbol_count = c.read_u32()? as usize;
        // Sort table: one u32 per symbol, unused by this decoder.
        c.skip(symbol_count * 4)?;

        let mut symbols = Vec::with_capacity(symbol_count);
        for _ in 0..symbol_count {
            symbols.push(Symbol::parse(&mut c)?);
        }

        let bytecode_length = c.read_u32()? as usize;
        let bytecode = c.read_bytes(bytecode_length)?.to_vec();

        let mut by_name = HashMap::with_capacity(symbols.len());
        let mut by_address = BTreeMap::new();
        for (i, sym) in symbols.iter().enumerate() {
            if !sym.name.is_empty() {
                // First occurrence wins for duplicate names.
                by_name.entry(sym.name.to_ascii_uppercase()).or_insert(i);
            }
            if sym.address != 0
                && matches!(
                    sym.kind,
                    SymbolKind::Function | SymbolKind::Prototype | SymbolKind::Instance
                )
            {
                by_address.entry(sym.address).or_insert(i);
            }
        }

        Ok(Script {
            version,
            symbols,
            bytecode,
            by_name,
            by_address,
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn symbol_by_index(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    /// Case-insensitive exact name lookup; the first of duplicate names
    /// wins.
    pub fn symbol_by_name(&self, name: &str) -> Option<&Symbol> {
        let index = *self.by_name.get(&name.to_ascii_uppercase())?;
        self.symbols.get(index)
    }

    /// Look a symbol up by the PC of its first instruction.
    pub fn symbol_by_address(&self, address: u32) -> Option<&Symbol> {
        let index = *self.by_address.get(&address)?;
        self.symbols.get(index)
    }

    /// The parameter symbols of a function, which immediately follow it
    /// in the table.
    pub fn parameters_for_function(&self, address: u32) -> Option<&[Symbol]> {
        let index = *self.by_address.get(&address)?;
        let sym = &self.symbols[index];
        if sym.kind != SymbolKind::Function {
            return None;
        }
        let first = index + 1;
        let last = first + sym.count as usize;
        self.symbols.get(first..last)
    }

    /// All instance symbols whose parent chain reaches the named class.
    pub fn instances_of_class(&self, class_name: &str) -> Vec<&Symbol> {
        let Some(class_index) = self.by_name.get(&class_name.to_ascii_uppercase()).copied()
        else {
            return Vec::new();
        };
        if self.symbols[class_index].kind != SymbolKind::Class {
            return Vec::new();
        }

        self.symbols
            .iter()
            .filter(|sym| {
                if sym.kind != SymbolKind::Instance {
                    return false;
                }
                let mut parent = sym.parent;
                // Parent chains are short; the step limit guards against
                // a malformed cyclic table.
                for _ in 0..self.symbols.len() {
                    if parent < 0 {
                        return false;
                    }
                    if parent as usize == class_index {
                        return true;
                    }
                    parent = match self.symbols.get(parent as usize) {
                        Some(p) => p.parent,
                        None => return false,
                    };
                }
                false
            })
            .collect()
    }

    /// Decode the single instruction at `pc`.
    pub fn instruction_at(&self, pc: u32) -> Result<Instruction> {
        let pc = pc as usize;
        if pc >= self.bytecode.len() {
            return Err(Error::IndexOutOfRange {
                kind: "program counter",
                index: pc,
                len: self.bytecode.len(),
            });
        }

        let mut c = Cursor::new(&self.bytecode);
        c.set_position(pc)?;

        let op_byte = c.read_u8()?;
        let Some(op) = Opcode::from_u8(op_byte) else {
            // The engine treats unknown tokens as no-ops.
            return Ok(Instruction {
                op: Opcode::Noop,
                size: 1,
                operand: Operand::None,
            });
        };

        let operand = match op {
            Opcode::Call | Opcode::Jump | Opcode::JumpIfZero => Operand::Address(c.read_u32()?),
            Opcode::CallExternal
            | Opcode::PushVar
            | Opcode::PushInstance
            | Opcode::SetInstance => Operand::Symbol(c.read_u32()?),
            Opcode::PushInt => Operand::Immediate(c.read_i32()?),
            Opcode::PushArrayVar => Operand::ArrayElement {
                symbol: c.read_u32()?,
                index: c.read_u8()?,
            },
            _ => Operand::None,
        };

        Ok(Instruction {
            op,
            size: (c.position() - pc) as u8,
            operand,
        })
    }
}
