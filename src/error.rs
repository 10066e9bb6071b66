use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError};
use thiserror::Error;

/// Errors raised while packing or unpacking MQTT Control Packets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The packet type nibble of the fixed header is outside 1..=14.
    #[error("invalid packet type {0}")]
    InvalidPacketType(u8),

    /// A field is inconsistent with the remaining length, or otherwise violates the wire format.
    #[error("malformed packet, {0}")]
    MalformedPacket(String),

    /// The buffer holds fewer bytes than the fixed header declares.
    ///
    /// This is the only error worth retrying once more bytes have been read.
    #[error("incomplete buffer, need {needed} bytes, have {available}")]
    IncompleteBuffer {
        /// The number of bytes required to go on.
        needed: usize,
        /// The number of bytes available.
        available: usize,
    },

    /// A length does not fit into its wire representation.
    #[error("{0} length overflow")]
    LengthOverflow(&'static str),

    /// The CONNECT packet asks for a protocol level other than 3.1.1.
    #[error("unsupported protocol level {0}")]
    UnsupportedProtocolLevel(u8),
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if the caller should retry after buffering more bytes.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::IncompleteBuffer { .. })
    }

    pub(crate) fn malformed<S: Into<String>>(reason: S) -> Self {
        Error::MalformedPacket(reason.into())
    }
}

impl<I> ParseError<I> for Error {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        Error::malformed(kind.description())
    }

    fn append(_input: I, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I> ContextError<I> for Error {
    fn add_context(_input: I, ctx: &'static str, other: Self) -> Self {
        match other {
            Error::MalformedPacket(reason) => Error::MalformedPacket(format!("{}: {}", ctx, reason)),
            err => err,
        }
    }
}

impl<I, E> FromExternalError<I, E> for Error {
    fn from_external_error(_input: I, kind: ErrorKind, _e: E) -> Self {
        Error::malformed(kind.description())
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Error(err) | nom::Err::Failure(err) => err,
            nom::Err::Incomplete(_) => Error::malformed("truncated field"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_trail() {
        let err = <Error as ParseError<&[u8]>>::from_error_kind(&b""[..], ErrorKind::Eof);
        let err = Error::add_context(&b""[..], "utf8 string", err);
        let err = Error::add_context(&b""[..], "topic filter", err);

        assert_eq!(
            err,
            Error::MalformedPacket("topic filter: utf8 string: End of file".to_owned())
        );
    }

    #[test]
    fn test_context_keeps_raised_kind() {
        let err = Error::add_context(&b""[..], "Connect", Error::UnsupportedProtocolLevel(3));

        assert_eq!(err, Error::UnsupportedProtocolLevel(3));
        assert_eq!(err.to_string(), "unsupported protocol level 3");
    }

    #[test]
    fn test_incomplete() {
        assert!(Error::IncompleteBuffer {
            needed: 4,
            available: 2
        }
        .is_incomplete());
        assert!(!Error::LengthOverflow("remaining length").is_incomplete());
    }
}
