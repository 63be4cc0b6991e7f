use std::io;

use derive_more::Display;

#[derive(Debug, Display)]
pub enum CodecError {
    #[display(fmt = "source unreadable: {}", _0)]
    SourceUnreadable(io::Error),

    #[display(fmt = "payload unreadable: {}", _0)]
    PayloadUnreadable(io::Error),

    #[display(fmt = "sidecar unreadable: {}", _0)]
    SidecarUnreadable(io::Error),

    #[display(fmt = "failed to write output: {}", _0)]
    SinkUnwritable(io::Error),

    #[display(fmt = "sidecar malformed: {}", _0)]
    SidecarMalformed(String),

    #[display(
        fmt = "payload truncated: decoded {} of {} symbols before the bitstream ran out",
        decoded,
        expected
    )]
    PayloadTruncated { expected: usize, decoded: usize },

    #[display(fmt = "invalid bit string: found {:?} at position {}", found, position)]
    InvalidBitString { position: usize, found: char },

    #[display(fmt = "symbol {:#04x} cannot be written to a legacy sidecar", _0)]
    UnsupportedSymbol(u8),
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::SourceUnreadable(err)
            | CodecError::PayloadUnreadable(err)
            | CodecError::SidecarUnreadable(err)
            | CodecError::SinkUnwritable(err) => Some(err),
            _ => None,
        }
    }
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CodecError::SidecarMalformed(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
