use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlutusError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),

    #[error("unsupported CBOR item (major {major}, info {info}) at byte {offset}")]
    Unsupported { major: u8, info: u8, offset: usize },

    #[error("unsupported tag {0}")]
    UnsupportedTag(u64),

    #[error("integer does not fit in 128 bits")]
    IntegerOverflow,

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0} trailing bytes after data item")]
    TrailingBytes(usize),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected}, found {found}")]
    Shape { expected: String, found: String },
}

impl PlutusError {
    pub fn shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Shape {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
