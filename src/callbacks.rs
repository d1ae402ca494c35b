//! Callback table and dispatch.
//!
//! Every slot is optional; an empty slot behaves like a callback that
//! returns [`Control::Continue`]. Callbacks receive the parser's context by
//! mutable reference, which is how consumers keep state between events.

use std::fmt;

use serde::Serialize;

use crate::error::ParseError;
use crate::types::Head;

/// What the parser should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    /// Keep parsing.
    #[default]
    Continue,
    /// From `headers-complete`: the message has no body, whatever its
    /// headers say (e.g. the response to a `HEAD` request). Anywhere else
    /// this is the same as [`Control::Continue`].
    Stop,
    /// Abort parsing. The parser enters its error state.
    Error,
}

impl From<()> for Control {
    fn from((): ()) -> Self {
        Control::Continue
    }
}

/// The kinds of event the parser emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    MessageBegin,
    Url,
    Path,
    QueryString,
    Fragment,
    HeaderField,
    HeaderValue,
    HeadersComplete,
    Body,
    MessageComplete,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageBegin => "message-begin",
            Self::Url => "url",
            Self::Path => "path",
            Self::QueryString => "query-string",
            Self::Fragment => "fragment",
            Self::HeaderField => "header-field",
            Self::HeaderValue => "header-value",
            Self::HeadersComplete => "headers-complete",
            Self::Body => "body",
            Self::MessageComplete => "message-complete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type NotifyFn<C> = Box<dyn FnMut(&mut C) -> Control + Send>;
type DataFn<C> = Box<dyn FnMut(&mut C, &[u8]) -> Control + Send>;
type HeadFn<C> = Box<dyn FnMut(&mut C, &Head) -> Control + Send>;

/// The set of handlers a [`Parser`](crate::Parser) dispatches to.
///
/// ```rust
/// use wirefeed::{Callbacks, Control};
///
/// let callbacks = Callbacks::<Vec<String>>::new()
///     .on_url(|seen, url| seen.push(String::from_utf8_lossy(url).into_owned()))
///     .on_body(|_, _| Control::Error);
/// # drop(callbacks);
/// ```
pub struct Callbacks<C> {
    message_begin: Option<NotifyFn<C>>,
    url: Option<DataFn<C>>,
    path: Option<DataFn<C>>,
    query_string: Option<DataFn<C>>,
    fragment: Option<DataFn<C>>,
    header_field: Option<DataFn<C>>,
    header_value: Option<DataFn<C>>,
    headers_complete: Option<HeadFn<C>>,
    body: Option<DataFn<C>>,
    message_complete: Option<NotifyFn<C>>,
}

macro_rules! data_slot {
    ($(#[$doc:meta])* $name:ident => $field:ident) => {
        $(#[$doc])*
        pub fn $name<F, R>(mut self, mut f: F) -> Self
        where
            F: FnMut(&mut C, &[u8]) -> R + Send + 'static,
            R: Into<Control>,
        {
            self.$field = Some(Box::new(move |ctx: &mut C, data: &[u8]| f(ctx, data).into()));
            self
        }
    };
}

macro_rules! notify_slot {
    ($(#[$doc:meta])* $name:ident => $field:ident) => {
        $(#[$doc])*
        pub fn $name<F, R>(mut self, mut f: F) -> Self
        where
            F: FnMut(&mut C) -> R + Send + 'static,
            R: Into<Control>,
        {
            self.$field = Some(Box::new(move |ctx: &mut C| f(ctx).into()));
            self
        }
    };
}

impl<C> Callbacks<C> {
    /// An empty table: every event is ignored.
    pub fn new() -> Self {
        Self {
            message_begin: None,
            url: None,
            path: None,
            query_string: None,
            fragment: None,
            header_field: None,
            header_value: None,
            headers_complete: None,
            body: None,
            message_complete: None,
        }
    }

    notify_slot!(
        /// Called on the first byte of every message.
        on_message_begin => message_begin
    );
    data_slot!(
        /// Called with the complete request target.
        on_url => url
    );
    data_slot!(
        /// Called with the path component of the request target.
        on_path => path
    );
    data_slot!(
        /// Called with the query string (without the `?`).
        on_query_string => query_string
    );
    data_slot!(
        /// Called with the fragment (without the `#`).
        on_fragment => fragment
    );
    data_slot!(
        /// Called once per header (or trailer) name.
        on_header_field => header_field
    );
    data_slot!(
        /// Called once per header (or trailer) value, OWS trimmed.
        on_header_value => header_value
    );

    /// Called after the last header, before any body byte.
    ///
    /// Returning [`Control::Stop`] tells the parser the message has no body.
    pub fn on_headers_complete<F, R>(mut self, mut f: F) -> Self
    where
        F: FnMut(&mut C, &Head) -> R + Send + 'static,
        R: Into<Control>,
    {
        self.headers_complete = Some(Box::new(move |ctx: &mut C, head: &Head| f(ctx, head).into()));
        self
    }

    data_slot!(
        /// Called with each contiguous span of body bytes. Chunked bodies
        /// produce one call per chunk payload available in the buffer.
        on_body => body
    );
    notify_slot!(
        /// Called when the message is complete.
        on_message_complete => message_complete
    );

    // ----- dispatch -------------------------------------------------------

    /// Fire a data-less event. `Stop` is folded into `Continue`.
    pub(crate) fn notify(&mut self, ctx: &mut C, kind: EventKind) -> Result<(), ParseError> {
        let slot = match kind {
            EventKind::MessageBegin => &mut self.message_begin,
            EventKind::MessageComplete => &mut self.message_complete,
            _ => return Ok(()),
        };
        match slot.as_mut().map(|f| f(ctx)) {
            Some(Control::Error) => Err(ParseError::CallbackAborted(kind)),
            _ => Ok(()),
        }
    }

    /// Fire a data-bearing event. `Stop` is folded into `Continue`.
    pub(crate) fn data(
        &mut self,
        ctx: &mut C,
        kind: EventKind,
        data: &[u8],
    ) -> Result<(), ParseError> {
        let slot = match kind {
            EventKind::Url => &mut self.url,
            EventKind::Path => &mut self.path,
            EventKind::QueryString => &mut self.query_string,
            EventKind::Fragment => &mut self.fragment,
            EventKind::HeaderField => &mut self.header_field,
            EventKind::HeaderValue => &mut self.header_value,
            EventKind::Body => &mut self.body,
            _ => return Ok(()),
        };
        match slot.as_mut().map(|f| f(ctx, data)) {
            Some(Control::Error) => Err(ParseError::CallbackAborted(kind)),
            _ => Ok(()),
        }
    }

    /// Fire `headers-complete`, keeping `Stop` distinct.
    pub(crate) fn headers_complete(
        &mut self,
        ctx: &mut C,
        head: &Head,
    ) -> Result<Control, ParseError> {
        match self.headers_complete.as_mut().map(|f| f(ctx, head)) {
            Some(Control::Error) => Err(ParseError::CallbackAborted(EventKind::HeadersComplete)),
            Some(control) => Ok(control),
            None => Ok(Control::Continue),
        }
    }
}

impl<C> Default for Callbacks<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Callbacks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("message_begin", &self.message_begin.is_some())
            .field("url", &self.url.is_some())
            .field("path", &self.path.is_some())
            .field("query_string", &self.query_string.is_some())
            .field("fragment", &self.fragment.is_some())
            .field("header_field", &self.header_field.is_some())
            .field("header_value", &self.header_value.is_some())
            .field("headers_complete", &self.headers_complete.is_some())
            .field("body", &self.body.is_some())
            .field("message_complete", &self.message_complete.is_some())
            .finish()
    }
}
