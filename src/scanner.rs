//! Byte classification and resumable token spans.
//!
//! The parser walks its input one byte at a time; everything here is the
//! lexical half of that walk. [`Span`] is what lets a token straddle two
//! `execute` calls without the parser ever buffering more than that token.

use std::ops::Range;

pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const SP: u8 = b' ';
pub(crate) const HTAB: u8 = b'\t';

// ---------------------------------------------------------------------------
// Character classes (RFC 9110 / RFC 9112)
// ---------------------------------------------------------------------------

/// `tchar` – characters allowed in HTTP tokens (method, header names).
///
/// ```text
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///         "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
/// ```
#[inline]
pub(crate) fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

/// Bytes accepted inside a request target: any visible byte, including
/// obs-text. Whitespace and controls end or break the target.
#[inline]
pub(crate) fn is_url_byte(b: u8) -> bool {
    b > SP && b != 0x7F
}

/// Bytes permitted inside a header field value:
/// `SP / HTAB / VCHAR / obs-text`.
#[inline]
pub(crate) fn is_field_content_byte(b: u8) -> bool {
    b == SP || b == HTAB || (0x21..=0x7E).contains(&b) || b >= 0x80
}

#[inline]
pub(crate) fn is_ows(b: u8) -> bool {
    b == SP || b == HTAB
}

/// Value of a single hexadecimal digit.
#[inline]
pub(crate) fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Small lexical helpers over complete tokens
// ---------------------------------------------------------------------------

pub(crate) fn trim_ows(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !is_ows(*first) {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !is_ows(*last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

/// Iterate the non-empty members of a comma-separated header list.
pub(crate) fn list_items(value: &[u8]) -> impl Iterator<Item = &[u8]> {
    value
        .split(|&b| b == b',')
        .map(trim_ows)
        .filter(|item| !item.is_empty())
}

/// Parse an unsigned decimal number, rejecting signs, blanks and overflow.
pub(crate) fn parse_decimal(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    bytes.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}

// ---------------------------------------------------------------------------
// Request target
// ---------------------------------------------------------------------------

/// Sub-ranges of a request target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Target {
    pub path: Option<Range<usize>>,
    pub query: Option<Range<usize>>,
    pub fragment: Option<Range<usize>>,
}

/// Locate path, query string and fragment inside a complete request target.
///
/// Handles origin form (`/a?b#c`), absolute form (`http://host/a?b`),
/// authority form (`host:443`, no path) and asterisk form (`*`). Empty
/// components are reported as absent.
pub(crate) fn split_target(url: &[u8]) -> Target {
    let non_empty = |r: Range<usize>| (!r.is_empty()).then_some(r);

    let hash = url.iter().position(|&b| b == b'#');
    let before_fragment = hash.unwrap_or(url.len());
    let question = url[..before_fragment].iter().position(|&b| b == b'?');
    let before_query = question.unwrap_or(before_fragment);

    let path_start = if url.first() == Some(&b'/') || url == b"*" {
        Some(0)
    } else if let Some(scheme_end) = find(&url[..before_query], b"://") {
        let authority = scheme_end + 3;
        url[authority..before_query]
            .iter()
            .position(|&b| b == b'/')
            .map(|p| authority + p)
    } else {
        None
    };

    Target {
        path: path_start.and_then(|start| non_empty(start..before_query)),
        query: question.and_then(|q| non_empty(q + 1..before_fragment)),
        fragment: hash.and_then(|h| non_empty(h + 1..url.len())),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// A token being recognised, possibly across several input buffers.
///
/// While a token lies inside the current buffer only its start offset is
/// remembered. If the buffer ends first, the pending bytes are copied into
/// `carry` and the token is re-anchored at offset 0 of the next buffer, so
/// [`Span::close`] can hand out the whole token as one slice.
#[derive(Debug, Default)]
pub(crate) struct Span {
    carry: Vec<u8>,
    start: Option<usize>,
    carried: bool,
}

impl Span {
    pub fn open(&mut self, at: usize) {
        self.carry.clear();
        self.carried = false;
        self.start = Some(at);
    }

    pub fn is_open(&self) -> bool {
        self.start.is_some()
    }

    /// Re-anchor a token left open by the previous buffer.
    pub fn resume(&mut self) {
        if self.carried {
            self.start = Some(0);
        }
    }

    /// Stash the pending part of an open token before the buffer goes away.
    pub fn suspend(&mut self, data: &[u8], end: usize) {
        if let Some(start) = self.start.take() {
            self.carry.extend_from_slice(&data[start..end]);
            self.carried = true;
        }
    }

    /// Finish the token at `end` (exclusive) and return all of its bytes.
    pub fn close<'a>(&'a mut self, data: &'a [u8], end: usize) -> &'a [u8] {
        let start = self.start.take().unwrap_or(end);
        if self.carried {
            self.carried = false;
            self.carry.extend_from_slice(&data[start..end]);
            &self.carry
        } else {
            &data[start..end]
        }
    }

    pub fn clear(&mut self) {
        self.carry.clear();
        self.start = None;
        self.carried = false;
    }
}
