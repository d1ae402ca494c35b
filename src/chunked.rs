use std::ops::Range;

use log::trace;

use crate::error::ParseError;
use crate::scanner::{CR, LF, hex_value, is_ows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Size,
    SizeOws,
    Ext,
    SizeLf,
    Data,
    DataCr,
    DataLf,
}

/// What [`ChunkDecoder::decode`] stopped at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// The buffer ran out.
    NeedMore,
    /// Payload bytes of the current chunk, as a range of the input.
    Payload(Range<usize>),
    /// The zero-size chunk line was consumed; trailers follow.
    LastChunk,
}

/// Decoder for the chunk framing of a `Transfer-Encoding: chunked` body.
///
/// Trailers are not handled here: after [`Step::LastChunk`] the parser reads
/// them with its ordinary header states.
#[derive(Debug, Clone)]
pub(crate) struct ChunkDecoder {
    state: ChunkState,
    size: u64,
    digits: usize,
    ext_len: usize,
    remaining: u64,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self {
            state: ChunkState::Size,
            size: 0,
            digits: 0,
            ext_len: 0,
            remaining: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Decode from `data[*pos..]` until an event or the end of the buffer.
    ///
    /// On success `*pos` is advanced past everything consumed. On error it
    /// is left on the offending byte.
    pub fn decode(
        &mut self,
        data: &[u8],
        pos: &mut usize,
        max_line: usize,
    ) -> Result<Step, ParseError> {
        while *pos < data.len() {
            if self.state == ChunkState::Data {
                let available = (data.len() - *pos) as u64;
                let take = available.min(self.remaining) as usize;
                let span = *pos..*pos + take;
                self.remaining -= take as u64;
                *pos += take;
                if self.remaining == 0 {
                    self.state = ChunkState::DataCr;
                }
                return Ok(Step::Payload(span));
            }

            let byte = data[*pos];
            match self.state {
                ChunkState::Size => {
                    if let Some(digit) = hex_value(byte) {
                        // Leading zeros are allowed; only the value is bounded.
                        self.size = self
                            .size
                            .checked_mul(16)
                            .and_then(|size| size.checked_add(u64::from(digit)))
                            .ok_or(ParseError::InvalidChunkSize("more than 64 bits"))?;
                        self.digits += 1;
                        if self.digits > max_line {
                            return Err(ParseError::HeaderTooLarge);
                        }
                    } else if self.digits == 0 {
                        return Err(ParseError::UnexpectedByte {
                            expected: "hex digit in chunk size",
                            found: byte,
                        });
                    } else if byte == CR {
                        self.state = ChunkState::SizeLf;
                    } else if byte == b';' {
                        self.state = ChunkState::Ext;
                    } else if is_ows(byte) {
                        self.state = ChunkState::SizeOws;
                    } else {
                        return Err(ParseError::UnexpectedByte {
                            expected: "hex digit, ';', or CR in chunk size",
                            found: byte,
                        });
                    }
                }

                ChunkState::SizeOws => {
                    if byte == b';' {
                        self.state = ChunkState::Ext;
                    } else if byte == CR {
                        self.state = ChunkState::SizeLf;
                    } else if !is_ows(byte) {
                        return Err(ParseError::UnexpectedByte {
                            expected: "';' or CR after chunk size",
                            found: byte,
                        });
                    }
                }

                // RFC 9112 §7.1.1: extensions are skipped.
                ChunkState::Ext => {
                    if byte == CR {
                        self.state = ChunkState::SizeLf;
                    } else if byte == LF {
                        return Err(ParseError::UnexpectedByte {
                            expected: "CR before LF in chunk extension",
                            found: byte,
                        });
                    } else {
                        self.ext_len += 1;
                        if self.ext_len > max_line {
                            return Err(ParseError::HeaderTooLarge);
                        }
                    }
                }

                ChunkState::SizeLf => {
                    if byte != LF {
                        return Err(ParseError::UnexpectedByte {
                            expected: "LF after chunk size CR",
                            found: byte,
                        });
                    }
                    *pos += 1;
                    trace!("Chunk size: {}", self.size);
                    if self.size == 0 {
                        self.reset();
                        return Ok(Step::LastChunk);
                    }
                    self.remaining = self.size;
                    self.state = ChunkState::Data;
                    continue;
                }

                ChunkState::DataCr => {
                    if byte != CR {
                        return Err(ParseError::UnexpectedByte {
                            expected: "CR after chunk data",
                            found: byte,
                        });
                    }
                    self.state = ChunkState::DataLf;
                }

                ChunkState::DataLf => {
                    if byte != LF {
                        return Err(ParseError::UnexpectedByte {
                            expected: "LF after chunk data CR",
                            found: byte,
                        });
                    }
                    self.reset();
                }

                ChunkState::Data => unreachable!("handled by the bulk path above"),
            }
            *pos += 1;
        }
        Ok(Step::NeedMore)
    }

    #[cfg(test)]
    fn in_data(&self) -> bool {
        self.state == ChunkState::Data
    }
}
