use std::{error, fmt};

/// Outcome of a parse or decode call on well-formed (so far) input.
///
/// `Complete(n)` carries the meaning of the call that produced it: bytes
/// consumed for the message parsers, bytes left after the body for the
/// chunked decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Complete(usize),
    Partial,
}

impl Status {
    pub fn is_complete(&self) -> bool {
        matches!(self, Status::Complete(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Status::Partial)
    }
}

/// Input that cannot be completed into valid HTTP/1.x framing.
///
/// The parser does not distinguish sub-kinds of malformed input; callers
/// needing richer diagnostics must re-parse with a stricter validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed;

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("malformed HTTP/1.x framing")
    }
}

impl error::Error for Malformed {}

/// A view into the caller's buffer, stored as offsets so results stay
/// valid however the caller moves or re-borrows the buffer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: u32,
    pub len: u32,
}

impl Slice {
    pub const EMPTY: Slice = Slice { start: 0, len: 0 };

    /// Record where `data` sits inside `buffer`. `data` must be a
    /// reborrow of `buffer`, which is what every parser in this crate
    /// hands over.
    pub fn new(buffer: &[u8], data: &[u8]) -> Slice {
        let start = data.as_ptr() as usize - buffer.as_ptr() as usize;
        let end = start + data.len();
        assert!(end <= u32::MAX as usize, "buffer offsets must fit in u32");

        Slice {
            start: start as u32,
            len: data.len() as u32,
        }
    }

    /// Resolve against the buffer the slice was recorded in. `None` when
    /// the buffer is too short to contain it (wrong or truncated buffer).
    pub fn data<'a>(&self, buffer: &'a [u8]) -> Option<&'a [u8]> {
        let start = self.start as usize;
        buffer.get(start..start + self.len())
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Either a resolved [`Slice`] or the "not parsed yet" sentinel.
///
/// The parsers fill their out-structs field by field, so on a partial
/// return every `Store` tells the caller whether that part of the message
/// was reached before input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Store {
    #[default]
    Empty,
    Slice(Slice),
}

impl Store {
    pub fn new_slice(buffer: &[u8], data: &[u8]) -> Store {
        Store::Slice(Slice::new(buffer, data))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Store::Empty)
    }

    pub fn data<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        self.data_opt(buf).expect("Store resolves in its buffer")
    }

    pub fn data_opt<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        match self {
            Store::Empty => None,
            Store::Slice(slice) => slice.data(buf),
        }
    }
}

/// One parsed header line.
///
/// A `Continuation` is an obsolete folded line (leading SP/HTAB): it has no
/// name of its own and extends the value of the previous field. Its bytes
/// are kept verbatim, leading whitespace included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Field { name: Slice, value: Slice },
    Continuation { value: Slice },
}

/// Initializer for caller-allocated field arrays.
pub const EMPTY_FIELD: HeaderField = HeaderField::Field {
    name: Slice::EMPTY,
    value: Slice::EMPTY,
};

impl HeaderField {
    pub fn name(&self) -> Option<Slice> {
        match self {
            HeaderField::Field { name, .. } => Some(*name),
            HeaderField::Continuation { .. } => None,
        }
    }

    pub fn value(&self) -> Slice {
        match self {
            HeaderField::Field { value, .. } | HeaderField::Continuation { value } => *value,
        }
    }
}

/// Result of [`parse_request`](crate::parse_request).
///
/// Reset to sentinels (`Store::Empty`, `None`, 0) at the start of every
/// call, then filled as parsing progresses; inspect after a partial return
/// to see how far the request got.
#[derive(Debug, Clone, Copy, Default)]
pub struct Request {
    pub method: Store,
    pub path: Store,
    pub minor_version: Option<u16>,
    /// Fields fully parsed into the caller's array so far.
    pub num_fields: usize,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of [`parse_response`](crate::parse_response).
#[derive(Debug, Clone, Copy, Default)]
pub struct Response {
    pub minor_version: Option<u16>,
    pub status: Option<u16>,
    /// Reason-phrase; may resolve to an empty slice.
    pub reason: Store,
    pub num_fields: usize,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }
}
