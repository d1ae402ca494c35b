use serde::{Serialize, Serializer};

use crate::callbacks::{Callbacks, EventKind};
use crate::types::Head;

/// An owned copy of one parser event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Event {
    MessageBegin,
    Url(#[serde(serialize_with = "lossy")] Vec<u8>),
    Path(#[serde(serialize_with = "lossy")] Vec<u8>),
    QueryString(#[serde(serialize_with = "lossy")] Vec<u8>),
    Fragment(#[serde(serialize_with = "lossy")] Vec<u8>),
    HeaderField(#[serde(serialize_with = "lossy")] Vec<u8>),
    HeaderValue(#[serde(serialize_with = "lossy")] Vec<u8>),
    HeadersComplete(Head),
    Body(#[serde(serialize_with = "lossy")] Vec<u8>),
    MessageComplete,
}

/// Serialize bytes as a UTF-8 string (lossy) for JSON output.
fn lossy<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(bytes))
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MessageBegin => EventKind::MessageBegin,
            Self::Url(_) => EventKind::Url,
            Self::Path(_) => EventKind::Path,
            Self::QueryString(_) => EventKind::QueryString,
            Self::Fragment(_) => EventKind::Fragment,
            Self::HeaderField(_) => EventKind::HeaderField,
            Self::HeaderValue(_) => EventKind::HeaderValue,
            Self::HeadersComplete(_) => EventKind::HeadersComplete,
            Self::Body(_) => EventKind::Body,
            Self::MessageComplete => EventKind::MessageComplete,
        }
    }

    /// The bytes carried by a data event.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Url(d)
            | Self::Path(d)
            | Self::QueryString(d)
            | Self::Fragment(d)
            | Self::HeaderField(d)
            | Self::HeaderValue(d)
            | Self::Body(d) => Some(d.as_slice()),
            Self::MessageBegin | Self::HeadersComplete(_) | Self::MessageComplete => None,
        }
    }
}

/// A consumer that copies every event it sees.
///
/// ```rust
/// use wirefeed::{Event, EventLog, Mode, Parser};
///
/// let mut parser =
///     Parser::with_context(Mode::Request, EventLog::default(), EventLog::callbacks());
/// parser.execute(b"GET /hi HTTP/1.1\r\n\r\n");
/// assert_eq!(parser.context().events()[1], Event::Url(b"/hi".to_vec()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// A callback table that records every event into the log.
    pub fn callbacks() -> Callbacks<EventLog> {
        Callbacks::new()
            .on_message_begin(|log: &mut EventLog| log.push(Event::MessageBegin))
            .on_url(|log: &mut EventLog, d: &[u8]| log.push(Event::Url(d.to_vec())))
            .on_path(|log: &mut EventLog, d: &[u8]| log.push(Event::Path(d.to_vec())))
            .on_query_string(|log: &mut EventLog, d: &[u8]| {
                log.push(Event::QueryString(d.to_vec()))
            })
            .on_fragment(|log: &mut EventLog, d: &[u8]| log.push(Event::Fragment(d.to_vec())))
            .on_header_field(|log: &mut EventLog, d: &[u8]| {
                log.push(Event::HeaderField(d.to_vec()))
            })
            .on_header_value(|log: &mut EventLog, d: &[u8]| {
                log.push(Event::HeaderValue(d.to_vec()))
            })
            .on_headers_complete(|log: &mut EventLog, head: &Head| {
                log.push(Event::HeadersComplete(*head))
            })
            .on_body(|log: &mut EventLog, d: &[u8]| log.push(Event::Body(d.to_vec())))
            .on_message_complete(|log: &mut EventLog| log.push(Event::MessageComplete))
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Event kinds in order, without payloads.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(Event::kind).collect()
    }

    /// The events with adjacent body spans merged.
    ///
    /// How a body is cut into spans depends on buffer boundaries; the merged
    /// form does not.
    pub fn coalesced(&self) -> Vec<Event> {
        let mut out: Vec<Event> = Vec::with_capacity(self.events.len());
        for event in &self.events {
            if let (Some(Event::Body(acc)), Event::Body(more)) = (out.last_mut(), event) {
                acc.extend_from_slice(more);
                continue;
            }
            out.push(event.clone());
        }
        out
    }

    /// All body bytes concatenated.
    pub fn body(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Body(d) => Some(d.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    /// Header (and trailer) name/value pairs as lossy strings.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut name = None;
        for event in &self.events {
            match event {
                Event::HeaderField(n) => name = Some(String::from_utf8_lossy(n).into_owned()),
                Event::HeaderValue(v) => {
                    if let Some(n) = name.take() {
                        pairs.push((n, String::from_utf8_lossy(v).into_owned()));
                    }
                }
                _ => {}
            }
        }
        pairs
    }

    /// The head snapshot of the most recent `headers-complete` event.
    pub fn head(&self) -> Option<&Head> {
        self.events.iter().rev().find_map(|e| match e {
            Event::HeadersComplete(head) => Some(head),
            _ => None,
        })
    }
}
