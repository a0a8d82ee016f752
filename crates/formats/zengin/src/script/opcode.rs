/// Opcodes of the compiled script VM.
///
/// Numeric values are the engine's token codes; `push_array_var` is the
/// plain variable push with the array flag folded into the byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Add = 0,
    Subtract = 1,
    Multiply = 2,
    Divide = 3,
    Modulo = 4,
    BitOr = 5,
    BitAnd = 6,
    Less = 7,
    Greater = 8,
    AssignInt = 9,
    LogicalOr = 11,
    LogicalAnd = 12,
    ShiftLeft = 13,
    ShiftRight = 14,
    LessOrEqual = 15,
    Equal = 16,
    NotEqual = 17,
    GreaterOrEqual = 18,
    AssignAdd = 19,
    AssignSubtract = 20,
    AssignMultiply = 21,
    AssignDivide = 22,
    Plus = 30,
    Minus = 31,
    Not = 32,
    Complement = 33,
    Noop = 45,
    Return = 60,
    Call = 61,
    CallExternal = 62,
    PushInt = 64,
    PushVar = 65,
    PushInstance = 67,
    AssignString = 70,
    AssignStringRef = 71,
    AssignFunc = 72,
    AssignFloat = 73,
    AssignInstance = 74,
    Jump = 75,
    JumpIfZero = 76,
    SetInstance = 80,
    PushArrayVar = 245,
}

impl Opcode {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Add,
            1 => Self::Subtract,
            2 => Self::Multiply,
            3 => Self::Divide,
            4 => Self::Modulo,
            5 => Self::BitOr,
            6 => Self::BitAnd,
            7 => Self::Less,
            8 => Self::Greater,
            9 => Self::AssignInt,
            11 => Self::LogicalOr,
            12 => Self::LogicalAnd,
            13 => Self::ShiftLeft,
            14 => Self::ShiftRight,
            15 => Self::LessOrEqual,
            16 => Self::Equal,
            17 => Self::NotEqual,
            18 => Self::GreaterOrEqual,
            19 => Self::AssignAdd,
            20 => Self::AssignSubtract,
            21 => Self::AssignMultiply,
            22 => Self::AssignDivide,
            30 => Self::Plus,
            31 => Self::Minus,
            32 => Self::Not,
            33 => Self::Complement,
            45 => Self::Noop,
            60 => Self::Return,
            61 => Self::Call,
            62 => Self::CallExternal,
            64 => Self::PushInt,
            65 => Self::PushVar,
            67 => Self::PushInstance,
            70 => Self::AssignString,
            71 => Self::AssignStringRef,
            72 => Self::AssignFunc,
            73 => Self::AssignFloat,
            74 => Self::AssignInstance,
            75 => Self::Jump,
            76 => Self::JumpIfZero,
            80 => Self::SetInstance,
            245 => Self::PushArrayVar,
            _ => return None,
        })
    }
}
