use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unexpected end of stream at offset {offset:#x} (need {need} bytes, have {have})")]
    EndOfStream {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("bad signature: expected {expected:?}, found {found:?}")]
    BadSignature {
        expected: &'static str,
        found: String,
    },

    #[error("bad chunk at offset {offset:#x}: declared length {length} exceeds {remaining} remaining bytes")]
    BadChunk {
        offset: usize,
        length: usize,
        remaining: usize,
    },

    #[error("{context}: expected a field of type {expected}, found {found}")]
    TypeMismatch {
        context: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{context}: {message}")]
    Parse {
        context: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
