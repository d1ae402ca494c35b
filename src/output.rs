use crate::recorder::Event;

/// Serialize a sequence of [`Event`]s to a JSON array.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(events: &[Event], pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(events).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(events).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render events as a human-readable trace, one line per event.
pub fn format_debug(events: &[Event]) -> String {
    let mut out = String::with_capacity(64 + events.len() * 32);

    out.push_str("=== HTTP Events ===\n");
    for event in events {
        match event {
            Event::HeadersComplete(head) => {
                out.push_str(&format!(
                    "{:<16} {:?} HTTP/{} keep-alive={} upgrade={}\n",
                    event.kind().as_str(),
                    head.kind,
                    head.version(),
                    head.keep_alive,
                    head.upgrade
                ));
            }
            Event::Body(data) => {
                out.push_str(&format!("{:<16} ({} bytes) ", "body", data.len()));
                match std::str::from_utf8(data) {
                    Ok(s) => out.push_str(&format!("{s:?}")),
                    Err(_) => out.push_str("<binary data>"),
                }
                out.push('\n');
            }
            other => match other.data() {
                Some(data) => out.push_str(&format!(
                    "{:<16} {:?}\n",
                    other.kind().as_str(),
                    String::from_utf8_lossy(data)
                )),
                None => {
                    out.push_str(other.kind().as_str());
                    out.push('\n');
                }
            },
        }
    }
    out.push_str("===================\n");
    out
}

/// Summarise each message: start line, headers and body size.
pub fn format_summary(events: &[Event]) -> String {
    let mut out = String::new();
    let mut target = None;
    let mut headers = Vec::new();
    let mut field: Option<&[u8]> = None;
    let mut body_len = 0usize;

    for event in events {
        match event {
            Event::Url(url) => target = Some(String::from_utf8_lossy(url)),
            Event::HeaderField(name) => field = Some(name.as_slice()),
            Event::HeaderValue(value) => {
                if let Some(name) = field.take() {
                    headers.push(format!(
                        "{}: {}",
                        String::from_utf8_lossy(name),
                        String::from_utf8_lossy(value)
                    ));
                }
            }
            Event::HeadersComplete(head) => {
                match (head.method, target.take()) {
                    (Some(method), Some(url)) => {
                        out.push_str(&format!("{method} {url} HTTP/{}\n", head.version()));
                    }
                    _ => out.push_str(&format!("HTTP/{} {}\n", head.version(), head.status_code)),
                }
                for line in headers.drain(..) {
                    out.push_str(&line);
                    out.push('\n');
                }
                out.push_str(&format!(
                    "(keep-alive: {}, upgrade: {})\n",
                    head.keep_alive, head.upgrade
                ));
            }
            Event::Body(data) => body_len += data.len(),
            Event::MessageComplete => {
                // Trailers arrive after headers-complete.
                for line in headers.drain(..) {
                    out.push_str(&format!("trailer {line}\n"));
                }
                out.push_str(&format!("body: {body_len} bytes\n--\n"));
                body_len = 0;
            }
            _ => {}
        }
    }
    out
}
