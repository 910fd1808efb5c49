//! Zero-copy, incremental parser for HTTP/1.x message framing.
//!
//! The parsers turn a borrowed byte buffer into offset-based views of the
//! request line, status line and header fields, re-entrant at any byte
//! boundary; the chunked decoder rewrites a caller buffer in place. No
//! I/O, no allocation, no owned state beyond the chunked decoder struct.

mod chunked;
mod message;
mod parser;
mod storage;
mod token;

pub use chunked::ChunkedDecoder;
pub use message::{visit_request, visit_response, Callbacks, ConnectionFlags, Framing, HeaderMap};
pub use parser::{parse_headers, parse_request, parse_response};
pub use storage::*;
pub use token::{compare_no_case, is_printable_ascii, is_token_char};
