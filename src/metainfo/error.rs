use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors from reading a `.torrent` file.
#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Present but of the wrong type or out of range.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
}
