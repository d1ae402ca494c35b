use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};

use wirefeed::{
    EventLog, Mode, Parser, ParserConfig, format_debug, format_json, format_summary,
};

/// wirefeed CLI: stream HTTP/1.x bytes through the parser and dump the events.
///
/// Reads raw HTTP messages from a file, --raw string, or stdin and prints the
/// event sequence the parser reports in the chosen format.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full HTTP message as a single shell argument.
#[derive(ClapParser)]
#[command(name = "wirefeed-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing raw HTTP messages.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP input string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Which messages to accept.
    #[arg(short, long, default_value = "either", value_enum)]
    mode: ModeArg,

    /// Feed the input to the parser in pieces of at most N bytes.
    #[arg(long, value_name = "N")]
    split: Option<usize>,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Maximum size of a message head in bytes.
    #[arg(long, default_value_t = wirefeed::DEFAULT_MAX_HEADER_SIZE)]
    max_header_size: usize,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Requests only
    Request,
    /// Responses only
    Response,
    /// Decide from the first bytes of each message
    Either,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Request => Mode::Request,
            ModeArg::Response => Mode::Response,
            ModeArg::Either => Mode::Either,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON array of events
    Json,
    /// One line per event
    Debug,
    /// Start line, headers and body size per message
    Summary,
}

fn main() {
    let cli = Cli::parse();

    // When no input source is provided and stdin is a terminal (not piped),
    // show help instead of blocking.
    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }

    let config = ParserConfig {
        mode: cli.mode.into(),
        max_header_size: cli.max_header_size,
    };
    let mut parser = Parser::with_config(config, EventLog::default(), EventLog::callbacks());

    let piece = cli.split.unwrap_or(data.len());
    match feed_pieces(&mut parser, &data, piece) {
        Outcome::Done => {}
        Outcome::Upgraded { left } => {
            eprintln!("Connection upgraded; {left} byte(s) left for the new protocol");
        }
        Outcome::Failed { at } => {
            print_events(&cli, parser.context());
            if let Some(err) = parser.last_error() {
                eprintln!("Parse error at byte {at}: {err}");
            }
            process::exit(2);
        }
    }

    print_events(&cli, parser.context());
    if parser.needs_eof() {
        eprintln!("Body is delimited by end of input");
    }
}

/// How feeding the input ended.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// Every byte went to the parser.
    Done,
    /// The upgraded message is complete; `left` bytes belong to the new protocol.
    Upgraded { left: usize },
    /// Parsing failed at absolute offset `at`.
    Failed { at: usize },
}

/// Feed `data` in pieces of at most `piece` bytes.
fn feed_pieces(parser: &mut Parser<EventLog>, data: &[u8], piece: usize) -> Outcome {
    let mut offset = 0;
    for chunk in data.chunks(piece.max(1)) {
        offset += parser.execute(chunk);
        if parser.last_error().is_some() {
            return Outcome::Failed { at: offset };
        }
        // The flag is raised at headers-complete; a declared body comes first.
        if parser.upgrade() && parser.is_complete() {
            return Outcome::Upgraded {
                left: data.len() - offset,
            };
        }
    }
    Outcome::Done
}

fn print_events(cli: &Cli, log: &EventLog) {
    let output = match cli.format {
        OutputFormat::Json => {
            let mut json = format_json(&log.coalesced(), cli.pretty);
            json.push('\n');
            json
        }
        OutputFormat::Debug => format_debug(log.events()),
        OutputFormat::Summary => format_summary(log.events()),
    };
    print!("{output}");
}

/// Read raw HTTP bytes from --raw, a file, or stdin.
fn read_input(cli: &Cli) -> Result<Vec<u8>, std::io::Error> {
    if let Some(raw) = &cli.raw {
        return Ok(unescape(raw).into_bytes());
    }
    match &cli.file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPGRADE_WITH_BODY: &[u8] =
        b"POST /x HTTP/1.1\r\nUpgrade: foo\r\nContent-Length: 3\r\n\r\n";

    fn recorder() -> Parser<EventLog> {
        Parser::with_context(Mode::Request, EventLog::default(), EventLog::callbacks())
    }

    #[test]
    fn upgrade_waits_for_the_body_across_pieces() {
        let data = [UPGRADE_WITH_BODY, b"abcNEW"].concat();
        let mut parser = recorder();

        // First piece ends one byte into the body.
        let outcome = feed_pieces(&mut parser, &data, UPGRADE_WITH_BODY.len() + 1);
        assert_eq!(outcome, Outcome::Upgraded { left: 3 });
        assert_eq!(parser.context().body(), b"abc");
        assert_eq!(
            parser.context().kinds().last(),
            Some(&wirefeed::EventKind::MessageComplete)
        );
    }

    #[test]
    fn failure_reports_the_absolute_offset() {
        let mut parser = recorder();
        let outcome = feed_pieces(&mut parser, b"GET / HTTP/1.1\r\nBad Header: x\r\n\r\n", 4);
        assert_eq!(outcome, Outcome::Failed { at: 19 });
    }

    #[test]
    fn whole_input_without_split() {
        let mut parser = recorder();
        let data = b"GET / HTTP/1.1\r\n\r\n";
        assert_eq!(feed_pieces(&mut parser, data, data.len()), Outcome::Done);
        assert!(parser.is_complete());
    }

    #[test]
    fn unescape_expands_crlf() {
        assert_eq!(unescape(r"GET / HTTP/1.1\r\n\r\n"), "GET / HTTP/1.1\r\n\r\n");
        assert_eq!(unescape(r"a\qb\\"), "a\\qb\\");
    }
}
