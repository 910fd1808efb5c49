use log::trace;

use crate::storage::{Malformed, Status};

/// Largest number of hex digits a chunk size may carry without
/// overflowing the accumulator.
const MAX_HEX_DIGITS: u8 = (usize::BITS / 4) as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DecoderState {
    #[default]
    ChunkSize,
    ChunkExt,
    ChunkData,
    ChunkCrlf,
    TrailerLineHead,
    TrailerLineMiddle,
}

/// Resumable in-place decoder for `Transfer-Encoding: chunked` bodies.
///
/// `decode` consumes the framing (size lines, extensions, per-chunk
/// terminators, optionally the trailer section) and moves the payload
/// bytes down so the decoded body always occupies a prefix of the caller's
/// buffer. The buffer never grows and nothing is allocated; state between
/// calls lives entirely in this struct.
#[derive(Debug, Default)]
pub struct ChunkedDecoder {
    bytes_left_in_chunk: usize,
    hex_count: u8,
    consume_trailer: bool,
    state: DecoderState,
}

impl ChunkedDecoder {
    /// A fresh decoder, positioned before the first chunk-size line.
    ///
    /// With `consume_trailer` the trailer section after the last chunk is
    /// skipped (unparsed) up to and including its empty line; without it,
    /// decoding completes right after the zero-size chunk's terminator
    /// and the trailer bytes are reported as tail.
    pub fn new(consume_trailer: bool) -> Self {
        ChunkedDecoder {
            consume_trailer,
            ..Default::default()
        }
    }

    /// True while the decoder stands inside a chunk's data bytes, which
    /// lets streaming callers forward decoded output as it appears.
    pub fn is_in_data(&self) -> bool {
        self.state == DecoderState::ChunkData
    }

    /// Decode in place over `buf[..*bufsz]`.
    ///
    /// On return `*bufsz` is the number of live bytes left in the buffer:
    /// the decoded body prefix plus, once the terminal chunk has been
    /// seen, any bytes belonging to the next message. `Complete(n)`
    /// reports the length of that tail. On `Partial`, append newly read
    /// bytes at `buf[*bufsz..]` and call again.
    pub fn decode(&mut self, buf: &mut [u8], bufsz: &mut usize) -> Result<Status, Malformed> {
        let size = *bufsz;
        let mut src = 0;
        let mut dst = 0;
        let mut result = Ok(Status::Partial);

        'decode: loop {
            match self.state {
                DecoderState::ChunkSize => {
                    loop {
                        if src == size {
                            break 'decode;
                        }
                        let digit = match decode_hex(buf[src]) {
                            Some(digit) => digit,
                            None => {
                                if self.hex_count == 0 {
                                    result = Err(Malformed);
                                    break 'decode;
                                }
                                break;
                            }
                        };
                        if self.hex_count == MAX_HEX_DIGITS {
                            trace!("chunk size overflows usize");
                            result = Err(Malformed);
                            break 'decode;
                        }
                        self.bytes_left_in_chunk = self.bytes_left_in_chunk * 16 + digit;
                        self.hex_count += 1;
                        src += 1;
                    }
                    self.hex_count = 0;
                    self.state = DecoderState::ChunkExt;
                }
                DecoderState::ChunkExt => {
                    // RFC 7230 A.2: line folding in chunk extensions is
                    // disallowed, so scanning for the LF is enough
                    loop {
                        if src == size {
                            break 'decode;
                        }
                        if buf[src] == b'\n' {
                            break;
                        }
                        src += 1;
                    }
                    src += 1;
                    if self.bytes_left_in_chunk == 0 {
                        if self.consume_trailer {
                            self.state = DecoderState::TrailerLineHead;
                        } else {
                            result = Ok(Status::Complete(size - src));
                            break 'decode;
                        }
                    } else {
                        self.state = DecoderState::ChunkData;
                    }
                }
                DecoderState::ChunkData => {
                    let avail = size - src;
                    if avail < self.bytes_left_in_chunk {
                        if dst != src {
                            buf.copy_within(src..size, dst);
                        }
                        src += avail;
                        dst += avail;
                        self.bytes_left_in_chunk -= avail;
                        break 'decode;
                    }
                    if dst != src {
                        buf.copy_within(src..src + self.bytes_left_in_chunk, dst);
                    }
                    src += self.bytes_left_in_chunk;
                    dst += self.bytes_left_in_chunk;
                    self.bytes_left_in_chunk = 0;
                    self.state = DecoderState::ChunkCrlf;
                }
                DecoderState::ChunkCrlf => {
                    loop {
                        if src == size {
                            break 'decode;
                        }
                        if buf[src] != b'\r' {
                            break;
                        }
                        src += 1;
                    }
                    if buf[src] != b'\n' {
                        result = Err(Malformed);
                        break 'decode;
                    }
                    src += 1;
                    self.state = DecoderState::ChunkSize;
                }
                DecoderState::TrailerLineHead => {
                    loop {
                        if src == size {
                            break 'decode;
                        }
                        if buf[src] != b'\r' {
                            break;
                        }
                        src += 1;
                    }
                    if buf[src] == b'\n' {
                        src += 1;
                        result = Ok(Status::Complete(size - src));
                        break 'decode;
                    }
                    src += 1;
                    self.state = DecoderState::TrailerLineMiddle;
                }
                DecoderState::TrailerLineMiddle => {
                    loop {
                        if src == size {
                            break 'decode;
                        }
                        if buf[src] == b'\n' {
                            break;
                        }
                        src += 1;
                    }
                    src += 1;
                    self.state = DecoderState::TrailerLineHead;
                }
            }
        }

        // compact: decoded data stays a prefix, unconsumed bytes follow it
        if dst != src {
            buf.copy_within(src..size, dst);
        }
        *bufsz = dst + (size - src);
        result
    }
}

fn decode_hex(b: u8) -> Option<usize> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as usize),
        b'A'..=b'F' => Some((b - b'A') as usize + 0xa),
        b'a'..=b'f' => Some((b - b'a') as usize + 0xa),
        _ => None,
    }
}
