use thiserror::Error;

/// Errors raised while encoding or decoding bencode.
///
/// Decoding errors carry the byte offset at which the problem was found.
#[derive(Debug, Error)]
pub enum BencodeError {
    /// A floating point value with a fractional part was given where an integer is required.
    #[error("value {0} is not an integer")]
    NonIntegral(f64),

    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("invalid integer at offset {offset}: {reason}")]
    InvalidInteger { offset: usize, reason: String },

    #[error("invalid string length at offset {offset}")]
    InvalidStringLength { offset: usize },

    #[error("unexpected byte 0x{byte:02x} at offset {offset}")]
    UnexpectedByte { offset: usize, byte: u8 },

    #[error("trailing data after value at offset {offset}")]
    TrailingData { offset: usize },

    #[error("nesting too deep at offset {offset}")]
    NestingTooDeep { offset: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BencodeError {
    /// Returns true if the error was produced while decoding input.
    pub fn is_decode_error(&self) -> bool {
        !matches!(self, BencodeError::NonIntegral(_) | BencodeError::Io(_))
    }

    /// Returns the input offset associated with a decoding error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            BencodeError::UnexpectedEof { offset }
            | BencodeError::InvalidInteger { offset, .. }
            | BencodeError::InvalidStringLength { offset }
            | BencodeError::UnexpectedByte { offset, .. }
            | BencodeError::TrailingData { offset }
            | BencodeError::NestingTooDeep { offset } => Some(*offset),
            BencodeError::NonIntegral(_) | BencodeError::Io(_) => None,
        }
    }
}
