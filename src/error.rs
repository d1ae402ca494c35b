use std::fmt;

use crate::callbacks::EventKind;

/// Coarse failure category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A byte violated the grammar of the current state.
    MalformedToken,
    /// The message head exceeded the configured size limit.
    HeaderTooLarge,
    /// Length or encoding headers are conflicting or unparseable.
    InvalidFraming,
    /// A consumer callback returned [`Control::Error`](crate::Control::Error).
    CallbackAborted,
}

/// Errors that can occur while parsing an HTTP/1.x stream.
///
/// Every error is terminal for the parser that produced it until
/// [`Parser::reset`](crate::Parser::reset) is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An unexpected byte was encountered during parsing.
    UnexpectedByte {
        /// Human-readable description of what was expected.
        expected: &'static str,
        /// The actual byte value found.
        found: u8,
    },
    /// The request method is not one the parser knows.
    InvalidMethod(String),
    /// The `HTTP/x.y` version token is malformed.
    InvalidVersion(&'static str),
    /// The response status code is not three digits.
    InvalidStatus(&'static str),
    /// The message head exceeds the configured maximum size.
    HeaderTooLarge,
    /// The `Content-Length` header value is unusable.
    InvalidContentLength(String),
    /// `Transfer-Encoding` on a request does not end in `chunked`.
    InvalidTransferEncoding(String),
    /// A chunk size in chunked transfer encoding is not valid hexadecimal.
    InvalidChunkSize(&'static str),
    /// Bytes arrived after a message that closes the connection.
    DataAfterClose,
    /// A callback asked the parser to abort.
    CallbackAborted(EventKind),
}

impl ParseError {
    /// Map the error onto its failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedByte { .. }
            | Self::InvalidMethod(_)
            | Self::InvalidVersion(_)
            | Self::InvalidStatus(_) => ErrorKind::MalformedToken,
            Self::HeaderTooLarge => ErrorKind::HeaderTooLarge,
            Self::InvalidContentLength(_)
            | Self::InvalidTransferEncoding(_)
            | Self::InvalidChunkSize(_)
            | Self::DataAfterClose => ErrorKind::InvalidFraming,
            Self::CallbackAborted(_) => ErrorKind::CallbackAborted,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedByte { expected, found } => {
                write!(f, "unexpected byte 0x{found:02X} (expected {expected})")
            }
            Self::InvalidMethod(m) => write!(f, "invalid HTTP method: '{m}'"),
            Self::InvalidVersion(why) => write!(f, "invalid HTTP version: {why}"),
            Self::InvalidStatus(why) => write!(f, "invalid status code: {why}"),
            Self::HeaderTooLarge => write!(f, "message head exceeds maximum allowed size"),
            Self::InvalidContentLength(v) => write!(f, "invalid Content-Length: '{v}'"),
            Self::InvalidTransferEncoding(v) => {
                write!(f, "invalid Transfer-Encoding for request: '{v}'")
            }
            Self::InvalidChunkSize(why) => write!(f, "invalid chunk size: {why}"),
            Self::DataAfterClose => write!(f, "data received after connection close"),
            Self::CallbackAborted(event) => write!(f, "{event} callback aborted parsing"),
        }
    }
}

impl std::error::Error for ParseError {}
