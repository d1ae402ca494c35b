use log::{debug, trace};

use crate::callbacks::{Callbacks, Control, EventKind};
use crate::chunked::{ChunkDecoder, Step};
use crate::error::ParseError;
use crate::scanner::{
    CR, LF, SP, Span, is_field_content_byte, is_ows, is_tchar, is_url_byte, list_items,
    parse_decimal, split_target, trim_ows,
};
use crate::types::{Flags, Head, MessageKind, Method, Mode};

/// Default ceiling for the message head (request/status line plus headers).
pub const DEFAULT_MAX_HEADER_SIZE: usize = 80 * 1024;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Which messages to accept (default: [`Mode::Either`]).
    pub mode: Mode,
    /// Maximum size of a message head, and of a trailer section, in bytes
    /// (default: 80 KiB).
    pub max_header_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Either,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse status
// ---------------------------------------------------------------------------

/// Where the parser stands after an `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// More input is needed to finish the current message.
    Incomplete,
    /// The last message is complete (or the connection was upgraded).
    Complete,
    /// Parsing failed; see [`Parser::last_error`].
    Failed,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    // ---- Message start ----
    Start,
    EitherH,

    // ---- Request line ----
    Method,
    Url,
    RequestLineLf,

    // ---- Version (request line tail / status line head) ----
    VersionPrefix(u8),
    VersionMajor(u8),
    VersionMinor(u8),

    // ---- Status line ----
    StatusCode(u8),
    StatusReason,
    StatusLineLf,

    // ---- Header and trailer section ----
    HeaderStart,
    HeaderName,
    HeaderValueOws,
    HeaderValue,
    HeaderLineLf,
    HeadersDoneLf,

    // ---- Body ----
    BodyIdentity,
    BodyUntilClose,
    BodyChunked,

    // ---- Done ----
    MessageComplete,
    Upgraded,
    Error,
}

/// Header names that influence framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind {
    General,
    ContentLength,
    TransferEncoding,
    Connection,
    Upgrade,
}

impl HeaderKind {
    fn classify(name: &[u8]) -> Self {
        if name.eq_ignore_ascii_case(b"content-length") {
            Self::ContentLength
        } else if name.eq_ignore_ascii_case(b"transfer-encoding") {
            Self::TransferEncoding
        } else if name.eq_ignore_ascii_case(b"connection") {
            Self::Connection
        } else if name.eq_ignore_ascii_case(b"upgrade") {
            Self::Upgrade
        } else {
            Self::General
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Empty,
    Length(u64),
    Chunked,
    UntilClose,
}

/// Everything that belongs to the message currently being parsed.
#[derive(Debug, Clone)]
struct Message {
    kind: Option<MessageKind>,
    method: Option<Method>,
    status_code: u16,
    http_major: u16,
    http_minor: u16,
    flags: Flags,
    header: HeaderKind,
    content_length: i64,
    keep_alive: bool,
}

impl Message {
    fn new() -> Self {
        Self {
            kind: None,
            method: None,
            status_code: 0,
            http_major: 0,
            http_minor: 0,
            flags: Flags::empty(),
            header: HeaderKind::General,
            content_length: -1,
            keep_alive: false,
        }
    }

    fn is_response(&self) -> bool {
        self.kind == Some(MessageKind::Response)
    }

    /// Record what a framing header's value says.
    fn apply_header(&mut self, value: &[u8]) -> Result<(), ParseError> {
        match self.header {
            HeaderKind::General => {}
            HeaderKind::ContentLength => {
                let invalid = || ParseError::InvalidContentLength(lossy(value));
                let mut declared = None;
                for item in list_items(value) {
                    let length = parse_decimal(item)
                        .filter(|&n| i64::try_from(n).is_ok())
                        .ok_or_else(invalid)?;
                    if declared.is_some_and(|d| d != length) {
                        return Err(invalid());
                    }
                    declared = Some(length);
                }
                let length = declared.ok_or_else(invalid)? as i64;

                // RFC 9112 §6.3: multiple differing Content-Length values are an error.
                if self.flags.contains(Flags::CONTENT_LENGTH) && self.content_length != length {
                    return Err(ParseError::InvalidContentLength(
                        "multiple differing Content-Length values".into(),
                    ));
                }
                self.flags.insert(Flags::CONTENT_LENGTH);
                self.content_length = length;
            }
            HeaderKind::TransferEncoding => {
                self.flags.insert(Flags::TRANSFER_ENCODING);
                if let Some(last) = list_items(value).last() {
                    if last.eq_ignore_ascii_case(b"chunked") {
                        self.flags.insert(Flags::CHUNKED);
                    } else {
                        self.flags.remove(Flags::CHUNKED);
                    }
                }
            }
            HeaderKind::Connection => {
                for item in list_items(value) {
                    if item.eq_ignore_ascii_case(b"close") {
                        self.flags.insert(Flags::CONNECTION_CLOSE);
                    } else if item.eq_ignore_ascii_case(b"keep-alive") {
                        self.flags.insert(Flags::CONNECTION_KEEP_ALIVE);
                    } else if item.eq_ignore_ascii_case(b"upgrade") {
                        self.flags.insert(Flags::CONNECTION_UPGRADE);
                    }
                }
            }
            HeaderKind::Upgrade => {
                if !value.is_empty() {
                    self.flags.insert(Flags::UPGRADE);
                }
            }
        }
        Ok(())
    }

    /// Decide how the body is delimited.
    fn framing(&self) -> Result<Framing, ParseError> {
        if self.is_response() {
            let status = self.status_code;
            if (100..200).contains(&status) || status == 204 || status == 304 {
                return Ok(Framing::Empty);
            }
        }

        // Transfer-Encoding takes precedence over Content-Length (RFC 9112 §6.1).
        if self.flags.contains(Flags::CHUNKED) {
            return Ok(Framing::Chunked);
        }
        if self.flags.contains(Flags::TRANSFER_ENCODING) {
            if self.is_response() {
                return Ok(Framing::UntilClose);
            }
            return Err(ParseError::InvalidTransferEncoding(
                "final transfer coding is not chunked".into(),
            ));
        }
        if self.flags.contains(Flags::CONTENT_LENGTH) {
            return Ok(match self.content_length {
                0 => Framing::Empty,
                n => Framing::Length(n as u64),
            });
        }
        if self.is_response() {
            Ok(Framing::UntilClose)
        } else {
            Ok(Framing::Empty)
        }
    }

    /// HTTP/1.1 connections persist unless closed; HTTP/1.0 ones only when
    /// asked to.
    fn should_keep_alive(&self) -> bool {
        if (self.http_major, self.http_minor) >= (1, 1) {
            !self.flags.contains(Flags::CONNECTION_CLOSE)
        } else {
            self.flags.contains(Flags::CONNECTION_KEEP_ALIVE)
        }
    }

    fn wants_upgrade(&self) -> bool {
        if self.is_response() {
            self.status_code == 101 && self.flags.contains(Flags::UPGRADE)
        } else {
            self.flags.contains(Flags::UPGRADE) || self.method == Some(Method::CONNECT)
        }
    }
}

/// A failure together with the offset of the byte being processed.
struct Halt {
    at: usize,
    error: ParseError,
}

fn halt(at: usize) -> impl FnOnce(ParseError) -> Halt {
    move |error| Halt { at, error }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn unexpected(expected: &'static str, found: u8) -> ParseError {
    ParseError::UnexpectedByte { expected, found }
}

/// Fire `url` and then the components found inside it.
fn emit_target<C>(callbacks: &mut Callbacks<C>, ctx: &mut C, url: &[u8]) -> Result<(), ParseError> {
    callbacks.data(ctx, EventKind::Url, url)?;
    let target = split_target(url);
    if let Some(range) = target.path {
        callbacks.data(ctx, EventKind::Path, &url[range])?;
    }
    if let Some(range) = target.query {
        callbacks.data(ctx, EventKind::QueryString, &url[range])?;
    }
    if let Some(range) = target.fragment {
        callbacks.data(ctx, EventKind::Fragment, &url[range])?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// An incremental, callback-driven HTTP/1.x parser.
///
/// Feed it bytes with [`Parser::execute`] as they arrive; it fires the
/// callbacks registered in its [`Callbacks`] table and hands each one the
/// context value `C`.
///
/// ```rust
/// use wirefeed::{Callbacks, Mode, Parser};
///
/// let callbacks = Callbacks::<Vec<u8>>::new().on_body(|body, data| body.extend_from_slice(data));
/// let mut parser = Parser::with_context(Mode::Request, Vec::new(), callbacks);
///
/// let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
/// assert_eq!(parser.execute(raw), raw.len());
/// assert_eq!(parser.context(), b"hello");
/// ```
#[derive(Debug)]
pub struct Parser<C = ()> {
    config: ParserConfig,
    callbacks: Callbacks<C>,
    context: C,

    state: State,
    msg: Message,
    span: Span,
    chunk: ChunkDecoder,
    nread: usize,
    upgrade: bool,
    error: Option<ParseError>,
}

impl Parser<()> {
    /// A parser without callbacks or context. Useful for reading the
    /// head fields after the fact.
    pub fn new(mode: Mode) -> Self {
        Self::with_context(mode, (), Callbacks::new())
    }
}

impl<C> Parser<C> {
    /// Create a parser for `mode` with the default header limit.
    pub fn with_context(mode: Mode, context: C, callbacks: Callbacks<C>) -> Self {
        let config = ParserConfig {
            mode,
            ..ParserConfig::default()
        };
        Self::with_config(config, context, callbacks)
    }

    /// Create a parser with a custom configuration.
    pub fn with_config(config: ParserConfig, context: C, callbacks: Callbacks<C>) -> Self {
        Self {
            config,
            callbacks,
            context,
            state: State::Start,
            msg: Message::new(),
            span: Span::default(),
            chunk: ChunkDecoder::new(),
            nread: 0,
            upgrade: false,
            error: None,
        }
    }

    /// Reinitialise all parsing state, keeping mode, callbacks and context.
    pub fn reset(&mut self) {
        trace!("Reset parser ({:?})", self.config.mode);
        self.state = State::Start;
        self.msg = Message::new();
        self.span.clear();
        self.chunk.reset();
        self.nread = 0;
        self.upgrade = false;
        self.error = None;
    }

    /// Like [`Parser::reset`], switching to a different mode.
    pub fn reset_mode(&mut self, mode: Mode) {
        self.config.mode = mode;
        self.reset();
    }

    /// Replace the callback table.
    pub fn set_callbacks(&mut self, callbacks: Callbacks<C>) {
        self.callbacks = callbacks;
    }

    /// Parse as much of `data` as possible.
    ///
    /// Returns the number of bytes consumed. That is `data.len()` unless
    /// parsing failed (see [`Parser::last_error`]) or the connection was
    /// upgraded, in which case the remaining bytes belong to the new
    /// protocol. A failed or upgraded parser consumes nothing until reset.
    pub fn execute(&mut self, data: &[u8]) -> usize {
        match self.state {
            State::Error => {
                trace!("Ignore {} bytes: parser failed", data.len());
                return 0;
            }
            State::Upgraded => {
                trace!("Ignore {} bytes: connection upgraded", data.len());
                return 0;
            }
            _ => {}
        }

        trace!("Execute {} bytes in {:?}", data.len(), self.state);
        self.span.resume();

        match self.run(data) {
            Ok(consumed) => {
                self.span.suspend(data, consumed);
                consumed
            }
            Err(Halt { at, error }) => {
                debug!("Parse failed at offset {at} in {:?}: {error}", self.state);
                self.span.clear();
                self.state = State::Error;
                self.error = Some(error);
                at
            }
        }
    }

    /// [`Parser::execute`], reporting failure as an error.
    ///
    /// # Errors
    ///
    /// Returns the parser's [`ParseError`] if it is (or becomes) failed.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let consumed = self.execute(data);
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(consumed),
        }
    }

    // ----- state machine --------------------------------------------------

    fn run(&mut self, data: &[u8]) -> Result<usize, Halt> {
        let mut i = 0;

        while i < data.len() {
            // ----- Bulk paths for body states -----
            match self.state {
                State::BodyIdentity => {
                    let available = (data.len() - i) as u64;
                    let take = available.min(self.msg.content_length as u64) as usize;
                    self.callbacks
                        .data(&mut self.context, EventKind::Body, &data[i..i + take])
                        .map_err(halt(i))?;
                    self.msg.content_length -= take as i64;
                    i += take;

                    if self.msg.content_length == 0 {
                        self.complete_message().map_err(halt(i - 1))?;
                    }
                    continue;
                }
                State::BodyUntilClose => {
                    self.callbacks
                        .data(&mut self.context, EventKind::Body, &data[i..])
                        .map_err(halt(i))?;
                    i = data.len();
                    continue;
                }
                State::BodyChunked => {
                    let max_line = self.config.max_header_size;
                    let step = match self.chunk.decode(data, &mut i, max_line) {
                        Ok(step) => step,
                        Err(error) => return Err(Halt { at: i, error }),
                    };
                    match step {
                        Step::NeedMore => {}
                        Step::Payload(range) => {
                            let start = range.start;
                            self.callbacks
                                .data(&mut self.context, EventKind::Body, &data[range])
                                .map_err(halt(start))?;
                        }
                        Step::LastChunk => {
                            trace!("Last chunk, reading trailers");
                            self.msg.flags.insert(Flags::TRAILING);
                            self.nread = 0;
                            self.state = State::HeaderStart;
                        }
                    }
                    continue;
                }
                State::Upgraded => return Ok(i),
                _ => {}
            }

            // ----- Byte-by-byte path -----
            let byte = data[i];
            if self.in_head() {
                self.nread += 1;
                if self.nread > self.config.max_header_size {
                    return Err(Halt {
                        at: i,
                        error: ParseError::HeaderTooLarge,
                    });
                }
            }

            self.step(data, i, byte).map_err(halt(i))?;
            i += 1;

            if self.state == State::Upgraded {
                return Ok(i);
            }
        }

        Ok(i)
    }

    fn in_head(&self) -> bool {
        !matches!(
            self.state,
            State::Start
                | State::MessageComplete
                | State::BodyIdentity
                | State::BodyUntilClose
                | State::BodyChunked
                | State::Upgraded
                | State::Error
        )
    }

    fn step(&mut self, data: &[u8], i: usize, byte: u8) -> Result<(), ParseError> {
        match self.state {
            // ===================== MESSAGE START =====================
            State::Start | State::MessageComplete => {
                // Tolerate empty lines between pipelined messages.
                if byte == CR || byte == LF {
                    return Ok(());
                }
                if self.state == State::MessageComplete && !self.msg.keep_alive {
                    return Err(ParseError::DataAfterClose);
                }
                // A byte that cannot start a message does not begin one.
                match self.config.mode {
                    Mode::Response if byte != b'H' => {
                        return Err(ParseError::InvalidVersion("expected 'HTTP/'"));
                    }
                    Mode::Request | Mode::Either if !is_tchar(byte) => {
                        return Err(unexpected("request method token", byte));
                    }
                    _ => {}
                }
                self.begin_message()?;

                match self.config.mode {
                    Mode::Request => self.start_request(i),
                    Mode::Response => self.start_response(),
                    Mode::Either if byte == b'H' => {
                        self.span.open(i);
                        self.state = State::EitherH;
                    }
                    Mode::Either => self.start_request(i),
                }
            }

            State::EitherH => {
                if byte == b'T' {
                    self.span.clear();
                    self.msg.kind = Some(MessageKind::Response);
                    self.state = State::VersionPrefix(2);
                } else {
                    self.msg.kind = Some(MessageKind::Request);
                    self.state = State::Method;
                    return self.step(data, i, byte);
                }
            }

            // ===================== REQUEST LINE =====================
            State::Method => {
                if byte == SP {
                    let token = self.span.close(data, i);
                    let method = Method::from_bytes(token)
                        .ok_or_else(|| ParseError::InvalidMethod(lossy(token)))?;
                    self.msg.method = Some(method);
                    self.state = State::Url;
                } else if !is_tchar(byte) {
                    return Err(unexpected("token character or SP in request method", byte));
                }
            }

            State::Url => {
                if byte == SP {
                    if !self.span.is_open() {
                        return Err(unexpected("request target", byte));
                    }
                    let url = self.span.close(data, i);
                    emit_target(&mut self.callbacks, &mut self.context, url)?;
                    self.state = State::VersionPrefix(0);
                } else if is_url_byte(byte) {
                    if !self.span.is_open() {
                        self.span.open(i);
                    }
                } else {
                    return Err(unexpected("visible character or SP in request target", byte));
                }
            }

            State::RequestLineLf | State::StatusLineLf => {
                if byte != LF {
                    return Err(unexpected("LF after start line CR", byte));
                }
                self.state = State::HeaderStart;
            }

            // ===================== VERSION =====================
            State::VersionPrefix(matched) => {
                const PREFIX: &[u8] = b"HTTP/";
                if byte != PREFIX[usize::from(matched)] {
                    return Err(ParseError::InvalidVersion("expected 'HTTP/'"));
                }
                self.state = if usize::from(matched) + 1 == PREFIX.len() {
                    State::VersionMajor(0)
                } else {
                    State::VersionPrefix(matched + 1)
                };
            }

            State::VersionMajor(digits) => {
                if byte.is_ascii_digit() {
                    if digits == 3 {
                        return Err(ParseError::InvalidVersion("major version too long"));
                    }
                    self.msg.http_major = self.msg.http_major * 10 + u16::from(byte - b'0');
                    self.state = State::VersionMajor(digits + 1);
                } else if byte == b'.' && digits > 0 {
                    self.state = State::VersionMinor(0);
                } else {
                    return Err(ParseError::InvalidVersion("expected major version digits"));
                }
            }

            State::VersionMinor(digits) => {
                if byte.is_ascii_digit() {
                    if digits == 3 {
                        return Err(ParseError::InvalidVersion("minor version too long"));
                    }
                    self.msg.http_minor = self.msg.http_minor * 10 + u16::from(byte - b'0');
                    self.state = State::VersionMinor(digits + 1);
                } else if digits == 0 {
                    return Err(ParseError::InvalidVersion("expected minor version digits"));
                } else if self.msg.is_response() && byte == SP {
                    self.state = State::StatusCode(0);
                } else if !self.msg.is_response() && byte == CR {
                    self.state = State::RequestLineLf;
                } else {
                    return Err(unexpected("end of HTTP version", byte));
                }
            }

            // ===================== STATUS LINE =====================
            State::StatusCode(digits) => {
                if byte.is_ascii_digit() {
                    if digits == 3 {
                        return Err(ParseError::InvalidStatus("more than three digits"));
                    }
                    self.msg.status_code = self.msg.status_code * 10 + u16::from(byte - b'0');
                    self.state = State::StatusCode(digits + 1);
                } else if digits < 3 {
                    return Err(ParseError::InvalidStatus("expected three digits"));
                } else if self.msg.status_code < 100 {
                    return Err(ParseError::InvalidStatus("below 100"));
                } else if byte == SP {
                    self.state = State::StatusReason;
                } else if byte == CR {
                    self.state = State::StatusLineLf;
                } else {
                    return Err(unexpected("SP or CR after status code", byte));
                }
            }

            State::StatusReason => {
                if byte == CR {
                    self.state = State::StatusLineLf;
                } else if !is_field_content_byte(byte) {
                    return Err(unexpected("reason phrase character or CR", byte));
                }
            }

            // ===================== HEADERS / TRAILERS =====================
            State::HeaderStart => {
                if byte == CR {
                    self.state = State::HeadersDoneLf;
                } else if is_tchar(byte) {
                    self.span.open(i);
                    self.state = State::HeaderName;
                } else {
                    return Err(unexpected("header name character or CR", byte));
                }
            }

            State::HeaderName => {
                if byte == b':' {
                    let name = self.span.close(data, i);
                    self.msg.header = if self.msg.flags.contains(Flags::TRAILING) {
                        HeaderKind::General
                    } else {
                        HeaderKind::classify(name)
                    };
                    self.callbacks
                        .data(&mut self.context, EventKind::HeaderField, name)?;
                    self.state = State::HeaderValueOws;
                } else if !is_tchar(byte) {
                    return Err(unexpected("header name character or ':'", byte));
                }
            }

            State::HeaderValueOws => {
                if is_ows(byte) {
                    // Skip optional whitespace before the value.
                } else if byte == CR {
                    self.msg.apply_header(b"")?;
                    self.callbacks
                        .data(&mut self.context, EventKind::HeaderValue, b"")?;
                    self.state = State::HeaderLineLf;
                } else if is_field_content_byte(byte) {
                    self.span.open(i);
                    self.state = State::HeaderValue;
                } else {
                    return Err(unexpected("header value character, OWS, or CR", byte));
                }
            }

            State::HeaderValue => {
                if byte == CR {
                    let value = trim_ows(self.span.close(data, i));
                    self.msg.apply_header(value)?;
                    self.callbacks
                        .data(&mut self.context, EventKind::HeaderValue, value)?;
                    self.state = State::HeaderLineLf;
                } else if !is_field_content_byte(byte) {
                    return Err(unexpected("header value character or CR", byte));
                }
            }

            State::HeaderLineLf => {
                if byte != LF {
                    return Err(unexpected("LF after header value CR", byte));
                }
                self.state = State::HeaderStart;
            }

            State::HeadersDoneLf => {
                if byte != LF {
                    return Err(unexpected("LF after end-of-headers CR", byte));
                }
                if self.msg.flags.contains(Flags::TRAILING) {
                    self.complete_message()?;
                } else {
                    self.headers_done()?;
                }
            }

            State::BodyIdentity
            | State::BodyUntilClose
            | State::BodyChunked
            | State::Upgraded
            | State::Error => {
                unreachable!("handled by bulk paths or before the loop");
            }
        }
        Ok(())
    }

    // ----- transitions ----------------------------------------------------

    fn begin_message(&mut self) -> Result<(), ParseError> {
        trace!("Message begin");
        self.msg = Message::new();
        self.chunk.reset();
        self.nread = 0;
        self.callbacks
            .notify(&mut self.context, EventKind::MessageBegin)
    }

    fn start_request(&mut self, i: usize) {
        self.msg.kind = Some(MessageKind::Request);
        self.span.open(i);
        self.state = State::Method;
    }

    fn start_response(&mut self) {
        self.msg.kind = Some(MessageKind::Response);
        self.state = State::VersionPrefix(1);
    }

    /// The blank line after the headers: decide framing, tell the
    /// consumer, then pick the body state.
    fn headers_done(&mut self) -> Result<(), ParseError> {
        let mut framing = self.msg.framing()?;
        self.msg.keep_alive = self.msg.should_keep_alive();
        self.upgrade = self.msg.wants_upgrade();
        match framing {
            Framing::Chunked | Framing::UntilClose => self.msg.content_length = -1,
            Framing::Empty | Framing::Length(_) => {}
        }

        debug!(
            "Headers complete: {:?} keep_alive={} upgrade={}",
            framing, self.msg.keep_alive, self.upgrade
        );

        let head = self.head();
        if self.callbacks.headers_complete(&mut self.context, &head)? == Control::Stop {
            trace!("Body skipped by callback");
            framing = Framing::Empty;
        }

        match framing {
            Framing::Empty => self.complete_message(),
            Framing::Length(_) => {
                self.state = State::BodyIdentity;
                Ok(())
            }
            Framing::Chunked => {
                self.chunk.reset();
                self.state = State::BodyChunked;
                Ok(())
            }
            Framing::UntilClose => {
                self.state = State::BodyUntilClose;
                Ok(())
            }
        }
    }

    fn complete_message(&mut self) -> Result<(), ParseError> {
        trace!("Message complete");
        self.state = if self.upgrade {
            State::Upgraded
        } else {
            State::MessageComplete
        };
        self.callbacks
            .notify(&mut self.context, EventKind::MessageComplete)
    }

    fn head(&self) -> Head {
        Head {
            kind: self.msg.kind.unwrap_or(MessageKind::Request),
            method: self.msg.method,
            status_code: self.msg.status_code,
            http_major: self.msg.http_major,
            http_minor: self.msg.http_minor,
            content_length: u64::try_from(self.msg.content_length).ok(),
            chunked: self.msg.flags.contains(Flags::CHUNKED),
            keep_alive: self.msg.keep_alive,
            upgrade: self.upgrade,
        }
    }

    // ----- public query ---------------------------------------------------

    /// Whether more input is needed, a message is complete, or parsing failed.
    pub fn status(&self) -> ParseStatus {
        match self.state {
            State::Error => ParseStatus::Failed,
            State::MessageComplete | State::Upgraded => ParseStatus::Complete,
            _ => ParseStatus::Incomplete,
        }
    }

    /// Returns `true` when the last message has been fully parsed.
    pub fn is_complete(&self) -> bool {
        self.status() == ParseStatus::Complete
    }

    /// The error that stopped the parser, if any.
    pub fn last_error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// The configured mode.
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Kind of the current message, once its first bytes have been seen.
    pub fn message_kind(&self) -> Option<MessageKind> {
        self.msg.kind
    }

    /// Major version digit(s), updated while the version is scanned.
    pub fn http_major(&self) -> u16 {
        self.msg.http_major
    }

    /// Minor version digit(s), updated while the version is scanned.
    pub fn http_minor(&self) -> u16 {
        self.msg.http_minor
    }

    /// Version formatted as `major.minor`.
    pub fn http_version(&self) -> String {
        format!("{}.{}", self.msg.http_major, self.msg.http_minor)
    }

    /// Response status code; 0 for requests.
    pub fn status_code(&self) -> u16 {
        self.msg.status_code
    }

    /// Request method; `None` for responses.
    pub fn method(&self) -> Option<Method> {
        self.msg.method
    }

    /// Remaining bytes of a length-delimited body, or -1 when unknown.
    pub fn content_length(&self) -> i64 {
        self.msg.content_length
    }

    /// Whether the message asks to switch protocols, known from
    /// `headers-complete` on and cleared only by reset.
    ///
    /// A request with a declared body still has that body to parse; the
    /// switch has happened once [`Parser::is_complete`] is also `true`.
    pub fn upgrade(&self) -> bool {
        self.upgrade
    }

    /// Framing flags gathered from the current message's headers.
    pub fn flags(&self) -> Flags {
        self.msg.flags
    }

    /// Keep-alive decision for the current message (known from
    /// `headers-complete` on).
    pub fn keep_alive(&self) -> bool {
        self.msg.keep_alive
    }

    /// `true` while reading a body that only the end of the connection
    /// terminates. The transport has to report that end itself.
    pub fn needs_eof(&self) -> bool {
        self.state == State::BodyUntilClose
    }

    /// Bytes of the current head (or trailer section) read so far.
    pub fn head_bytes(&self) -> usize {
        self.nread
    }

    /// The configuration the parser was built with.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The consumer context handed to every callback.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the consumer context between calls.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Consume the parser and return its context.
    pub fn into_context(self) -> C {
        self.context
    }
}

impl Default for Parser<()> {
    fn default() -> Self {
        Self::new(Mode::Either)
    }
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
