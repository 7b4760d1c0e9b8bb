use std::io;
use std::path::PathBuf;

use thiserror::Error;


/// Errors raised by table loading, encoding and decoding.
#[derive(Debug, Error)]
pub enum Error {

    /// A table, text or compressed file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error
    },

    /// Two symbols share a code, so decoding would be ambiguous.
    #[error("code {code} is assigned to both {first:?} and {second:?}")]
    DuplicateCode { code: String, first: char, second: char },

    /// Strict encoding met a symbol that has no code.
    #[error("symbol {0:?} has no code in the table")]
    UnknownSymbol(char),

    #[error("invalid bit character {0:?}, expected '0' or '1'")]
    InvalidBit(char),

    #[error("framed stream is missing its padding header")]
    MissingHeader,

    #[error("invalid padding length {0} in framed stream")]
    InvalidPadding(u8),

}


impl Error {

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

}


/// A single line of a table file that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableLineError {

    #[error("missing \" : \" separator")]
    MissingSeparator,

    #[error("token {0:?} is not a recognisable symbol")]
    UnrecognisedToken(String),

    #[error("code {0:?} is not a non-empty string of '0' and '1'")]
    InvalidCode(String),

}


pub type Result<T> = std::result::Result<T, Error>;
