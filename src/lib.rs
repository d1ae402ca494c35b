//! # wirefeed
//!
//! A **streaming, callback-driven HTTP/1.x parser** implemented as a byte
//! level state machine.
//!
//! The parser consumes bytes in whatever pieces the transport delivers and
//! reports what it recognises through a table of [`Callbacks`]: message
//! begin, request target (with path, query string and fragment), header
//! fields and values, headers complete, body spans and message complete.
//! It never buffers a body; header tokens split across reads are carried in
//! one small buffer bounded by the header size limit.
//!
//! ## Quick start
//!
//! ```rust
//! use wirefeed::{Callbacks, Mode, Parser};
//!
//! let callbacks = Callbacks::<Vec<String>>::new()
//!     .on_path(|seen, path| seen.push(String::from_utf8_lossy(path).into_owned()))
//!     .on_header_field(|seen, name| seen.push(String::from_utf8_lossy(name).into_owned()));
//!
//! let mut parser = Parser::with_context(Mode::Request, Vec::new(), callbacks);
//!
//! // The request may arrive in arbitrary pieces.
//! parser.execute(b"GET /hel");
//! parser.execute(b"lo HTTP/1.1\r\nHo");
//! parser.execute(b"st: example.com\r\n\r\n");
//!
//! assert!(parser.is_complete());
//! assert_eq!(parser.context(), &["/hello", "Host"]);
//! ```
//!
//! ## Controlling the parser from a callback
//!
//! ```rust
//! use wirefeed::{Callbacks, Control, Mode, Parser};
//!
//! // A response to HEAD has no body, whatever its headers claim.
//! let callbacks = Callbacks::<()>::new().on_headers_complete(|_, _| Control::Stop);
//! let mut parser = Parser::with_context(Mode::Response, (), callbacks);
//!
//! let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 512\r\n\r\n";
//! assert_eq!(parser.execute(raw), raw.len());
//! assert!(parser.is_complete());
//! ```

mod callbacks;
mod chunked;
mod error;
mod output;
mod parser;
mod recorder;
mod scanner;
mod types;

// Re-export public API.
pub use callbacks::{Callbacks, Control, EventKind};
pub use error::{ErrorKind, ParseError};
pub use output::{format_debug, format_json, format_summary};
pub use parser::{DEFAULT_MAX_HEADER_SIZE, ParseStatus, Parser, ParserConfig};
pub use recorder::{Event, EventLog};
pub use types::{Flags, Head, Method, MessageKind, Mode};

/// Parse `data` in one call and return every event it produced.
///
/// This is a convenience wrapper around [`Parser`] and [`EventLog`]. The
/// returned log may end mid-message if `data` does.
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed.
pub fn parse_events(mode: Mode, data: &[u8]) -> Result<EventLog, ParseError> {
    let config = ParserConfig {
        mode,
        ..ParserConfig::default()
    };
    parse_events_with_config(data, config)
}

/// Like [`parse_events`], using a custom [`ParserConfig`].
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed or exceeds the
/// configured limits.
pub fn parse_events_with_config(data: &[u8], config: ParserConfig) -> Result<EventLog, ParseError> {
    let mut parser = Parser::with_config(config, EventLog::default(), EventLog::callbacks());
    parser.feed(data)?;
    Ok(parser.into_context())
}
