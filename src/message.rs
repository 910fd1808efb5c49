//! Convenience layer above the framing core: callback replay of a parse,
//! a borrowed multi-valued header map, and decoding of the headers that
//! determine message framing. Unlike the core, this layer allocates and
//! strips trailing whitespace from values.

use log::trace;

use crate::storage::{HeaderField, Malformed, Request, Response};
use crate::token::compare_no_case;

/// Hooks invoked when replaying a parse result. Every hook defaults to a
/// no-op so implementors override only what they need.
pub trait Callbacks {
    fn on_request_line(&mut self, _method: &[u8], _path: &[u8], _minor_version: u16) {}
    fn on_status_line(&mut self, _minor_version: u16, _status: u16, _reason: &[u8]) {}
    fn on_header(&mut self, _name: &[u8], _value: &[u8]) {}
    fn on_continuation(&mut self, _value: &[u8]) {}
}

/// Replay a request parse into callbacks. Parts never reached by the
/// parser (partial input) are skipped, so this is safe to call on
/// incomplete results too.
pub fn visit_request<C: Callbacks>(
    buf: &[u8],
    req: &Request,
    fields: &[HeaderField],
    callbacks: &mut C,
) {
    if let (Some(method), Some(path), Some(minor_version)) = (
        req.method.data_opt(buf),
        req.path.data_opt(buf),
        req.minor_version,
    ) {
        callbacks.on_request_line(method, path, minor_version);
    }
    visit_fields(buf, &fields[..req.num_fields], callbacks);
}

/// Replay a response parse into callbacks.
pub fn visit_response<C: Callbacks>(
    buf: &[u8],
    res: &Response,
    fields: &[HeaderField],
    callbacks: &mut C,
) {
    if let (Some(minor_version), Some(status), Some(reason)) =
        (res.minor_version, res.status, res.reason.data_opt(buf))
    {
        callbacks.on_status_line(minor_version, status, reason);
    }
    visit_fields(buf, &fields[..res.num_fields], callbacks);
}

fn visit_fields<C: Callbacks>(buf: &[u8], fields: &[HeaderField], callbacks: &mut C) {
    for field in fields {
        match field {
            HeaderField::Field { name, value } => {
                let name = name.data(buf).expect("field name resolves in its buffer");
                let value = value.data(buf).expect("field value resolves in its buffer");
                callbacks.on_header(name, trim_value(value));
            }
            HeaderField::Continuation { value } => {
                let value = value.data(buf).expect("field value resolves in its buffer");
                callbacks.on_continuation(trim_value(value));
            }
        }
    }
}

/// Multi-valued header map borrowed from the parsed buffer.
///
/// Keys compare ASCII case-insensitively. Folded continuation lines keep
/// their descriptor convention and are stored under the empty name.
#[derive(Debug, Default)]
pub struct HeaderMap<'a> {
    entries: Vec<(&'a [u8], &'a [u8])>,
}

impl<'a> HeaderMap<'a> {
    pub fn collect(buf: &'a [u8], fields: &[HeaderField]) -> Self {
        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            let name = match field.name() {
                Some(name) => name.data(buf).expect("field name resolves in its buffer"),
                None => &b""[..],
            };
            let value = field
                .value()
                .data(buf)
                .expect("field value resolves in its buffer");
            entries.push((name, trim_value(value)));
        }
        HeaderMap { entries }
    }

    /// First value carried under `name`, if any.
    pub fn get(&self, name: &[u8]) -> Option<&'a [u8]> {
        self.entries
            .iter()
            .find(|(entry, _)| compare_no_case(entry, name))
            .map(|(_, value)| *value)
    }

    /// Every value carried under `name`, in message order.
    pub fn get_all<'m>(&'m self, name: &'m [u8]) -> impl Iterator<Item = &'a [u8]> + 'm {
        self.entries
            .iter()
            .filter(move |(entry, _)| compare_no_case(entry, name))
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a [u8], &'a [u8])> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `Connection` tokens relevant to connection management.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionFlags {
    pub close: bool,
    pub keep_alive: bool,
    pub upgrade: bool,
}

/// Framing-relevant facts decoded from a header block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Framing {
    pub content_length: Option<usize>,
    pub is_chunked: bool,
    pub connection: ConnectionFlags,
}

impl Framing {
    /// Decode `Content-Length`, `Transfer-Encoding` and `Connection` from
    /// parsed fields.
    ///
    /// A `Content-Length` that is not a plain decimal, or that conflicts
    /// with another one in the same message, is a framing error.
    /// Duplicates with equal values are tolerated. `Connection` lines are
    /// comma-tokenized and OR-merged across repetitions.
    pub fn decode(buf: &[u8], fields: &[HeaderField]) -> Result<Framing, Malformed> {
        let mut framing = Framing::default();
        for field in fields {
            let name = match field.name() {
                Some(name) => name.data(buf).expect("field name resolves in its buffer"),
                None => continue,
            };
            let value = field
                .value()
                .data(buf)
                .expect("field value resolves in its buffer");
            let value = trim_value(value);

            if compare_no_case(name, b"content-length") {
                let length = parse_content_length(value)?;
                match framing.content_length {
                    None => framing.content_length = Some(length),
                    Some(previous) if previous == length => {}
                    Some(_) => {
                        trace!("conflicting Content-Length values");
                        return Err(Malformed);
                    }
                }
            } else if compare_no_case(name, b"transfer-encoding") {
                if list_tokens(value).any(|token| compare_no_case(token, b"chunked")) {
                    framing.is_chunked = true;
                }
            } else if compare_no_case(name, b"connection") {
                for token in list_tokens(value) {
                    if compare_no_case(token, b"close") {
                        framing.connection.close = true;
                    } else if compare_no_case(token, b"keep-alive") {
                        framing.connection.keep_alive = true;
                    } else if compare_no_case(token, b"upgrade") {
                        framing.connection.upgrade = true;
                    }
                }
            }
        }
        Ok(framing)
    }
}

fn trim_value(value: &[u8]) -> &[u8] {
    let mut end = value.len();
    while end > 0 && (value[end - 1] == b' ' || value[end - 1] == b'\t') {
        end -= 1;
    }
    &value[..end]
}

fn trim_token(token: &[u8]) -> &[u8] {
    let mut start = 0;
    while start < token.len() && (token[start] == b' ' || token[start] == b'\t') {
        start += 1;
    }
    trim_value(&token[start..])
}

fn list_tokens(value: &[u8]) -> impl Iterator<Item = &[u8]> {
    value
        .split(|&b| b == b',')
        .map(trim_token)
        .filter(|token| !token.is_empty())
}

fn parse_content_length(value: &[u8]) -> Result<usize, Malformed> {
    if value.is_empty() {
        return Err(Malformed);
    }
    let mut length: usize = 0;
    for &b in value {
        if !b.is_ascii_digit() {
            return Err(Malformed);
        }
        length = length
            .checked_mul(10)
            .and_then(|length| length.checked_add((b - b'0') as usize))
            .ok_or(Malformed)?;
    }
    Ok(length)
}
