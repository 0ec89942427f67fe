use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("net {0} out of range 0..=127")]
    InvalidNet(u8),
    #[error("subnet {0} out of range 0..=15")]
    InvalidSubnet(u8),
    #[error("universe {0} out of range 0..=15")]
    InvalidUniverse(u8),
    #[error("slot {0} out of range 1..=512")]
    InvalidSlot(usize),
    /// The packet does not start with `Art-Net\0`.
    #[error("missing Art-Net signature")]
    InvalidSignature,
    /// The packet is shorter than its op code requires.
    #[error("packet 0x{opcode:04x} truncated: {actual} bytes, expected at least {expected}")]
    Truncated {
        opcode: u16,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported protocol version {0}")]
    UnsupportedProtocolVersion(u16),
    #[error("parser error: {0:?}")]
    Parse(nom::error::ErrorKind),
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("encode error: {0:?}")]
    Encode(byte::Error),
}

impl Error {
    /// The packet could not be decoded at all. Nothing was mutated and no
    /// reply goes out.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::InvalidSignature | Error::Truncated { .. } | Error::Parse(_)
        )
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::Parse(nom::error::ErrorKind::Eof),
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parse(e.code),
        }
    }
}

impl From<byte::Error> for Error {
    fn from(err: byte::Error) -> Self {
        Error::Encode(err)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
