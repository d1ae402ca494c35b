use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Mode / MessageKind
// ---------------------------------------------------------------------------

/// Which kind of message a parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Only request messages.
    Request,
    /// Only response messages.
    Response,
    /// Decide per message from its first bytes (`HTTP/` starts a response).
    #[default]
    Either,
}

/// The kind of message actually being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
}

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// Request methods recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    DELETE,
    GET,
    HEAD,
    POST,
    PUT,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
    // WebDAV
    COPY,
    LOCK,
    MKCOL,
    MOVE,
    PROPFIND,
    PROPPATCH,
    UNLOCK,
    // Subversion
    REPORT,
    MKACTIVITY,
    CHECKOUT,
    MERGE,
    // UPnP
    #[serde(rename = "M-SEARCH")]
    MSEARCH,
    NOTIFY,
    SUBSCRIBE,
    UNSUBSCRIBE,
}

impl Method {
    /// Every known method, in declaration order.
    pub const ALL: [Method; 24] = [
        Self::DELETE,
        Self::GET,
        Self::HEAD,
        Self::POST,
        Self::PUT,
        Self::CONNECT,
        Self::OPTIONS,
        Self::TRACE,
        Self::PATCH,
        Self::COPY,
        Self::LOCK,
        Self::MKCOL,
        Self::MOVE,
        Self::PROPFIND,
        Self::PROPPATCH,
        Self::UNLOCK,
        Self::REPORT,
        Self::MKACTIVITY,
        Self::CHECKOUT,
        Self::MERGE,
        Self::MSEARCH,
        Self::NOTIFY,
        Self::SUBSCRIBE,
        Self::UNSUBSCRIBE,
    ];

    /// Match a method token exactly (methods are case-sensitive).
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().as_bytes() == bytes)
    }

    /// Return the method as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DELETE => "DELETE",
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::CONNECT => "CONNECT",
            Self::OPTIONS => "OPTIONS",
            Self::TRACE => "TRACE",
            Self::PATCH => "PATCH",
            Self::COPY => "COPY",
            Self::LOCK => "LOCK",
            Self::MKCOL => "MKCOL",
            Self::MOVE => "MOVE",
            Self::PROPFIND => "PROPFIND",
            Self::PROPPATCH => "PROPPATCH",
            Self::UNLOCK => "UNLOCK",
            Self::REPORT => "REPORT",
            Self::MKACTIVITY => "MKACTIVITY",
            Self::CHECKOUT => "CHECKOUT",
            Self::MERGE => "MERGE",
            Self::MSEARCH => "M-SEARCH",
            Self::NOTIFY => "NOTIFY",
            Self::SUBSCRIBE => "SUBSCRIBE",
            Self::UNSUBSCRIBE => "UNSUBSCRIBE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Per-message framing flags collected while reading the head, as
/// returned by [`Parser::flags`](crate::Parser::flags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u8);

impl Flags {
    pub const CHUNKED: Flags = Flags(1 << 0);
    pub const CONNECTION_KEEP_ALIVE: Flags = Flags(1 << 1);
    pub const CONNECTION_CLOSE: Flags = Flags(1 << 2);
    pub const CONNECTION_UPGRADE: Flags = Flags(1 << 3);
    pub const UPGRADE: Flags = Flags(1 << 4);
    pub const CONTENT_LENGTH: Flags = Flags(1 << 5);
    pub const TRANSFER_ENCODING: Flags = Flags(1 << 6);
    pub const TRAILING: Flags = Flags(1 << 7);

    pub const fn empty() -> Self {
        Flags(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }
}

// ---------------------------------------------------------------------------
// Head
// ---------------------------------------------------------------------------

/// Snapshot of the message head, handed to the `headers-complete` callback.
///
/// Everything here is final by the time the callback runs: the keep-alive
/// and upgrade decisions are made before any body byte is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Head {
    pub kind: MessageKind,
    /// Request method (requests only).
    pub method: Option<Method>,
    /// Status code (responses only, otherwise 0).
    pub status_code: u16,
    pub http_major: u16,
    pub http_minor: u16,
    /// Declared `Content-Length`, when the body is length-delimited.
    pub content_length: Option<u64>,
    pub chunked: bool,
    pub keep_alive: bool,
    pub upgrade: bool,
}

impl Head {
    /// Version formatted as `major.minor`.
    pub fn version(&self) -> String {
        format!("{}.{}", self.http_major, self.http_minor)
    }
}
