use log::trace;
use nom::{
    error::{make_error, ErrorKind as NomErrorKind},
    Err as NomError, IResult, Needed, Offset,
};

mod primitives;

use crate::storage::{HeaderField, Malformed, Request, Response, Slice, Status, Store};
use primitives::{
    decimal, eol, field_name, http_version, is_complete, skip_ows, space, to_eol, token,
};

/// Collapse a nom outcome at the public boundary: incomplete input is a
/// status, everything else is malformed.
fn classify(error: NomError<nom::error::Error<&[u8]>>) -> Result<Status, Malformed> {
    match error {
        NomError::Incomplete(_) => Ok(Status::Partial),
        NomError::Error(_) | NomError::Failure(_) => {
            trace!("input rejected as malformed HTTP/1.x framing");
            Err(Malformed)
        }
    }
}

/// Parse a request line and its header block from `buf`.
///
/// `fields` is caller-allocated and its length is the header capacity: a
/// message with more header lines than capacity is malformed. On success,
/// `Complete(n)` is the length of the framing prefix; the body, if any,
/// starts at `buf[n..]`. On `Partial`, re-invoke once more bytes arrived,
/// with a buffer whose first `last_len` bytes are unchanged and
/// `last_len` set to the previous buffer length: a cheap probe for the
/// end-of-headers marker then bounds the work a peer trickling bytes in
/// one at a time can force.
pub fn parse_request(
    buf: &[u8],
    req: &mut Request,
    fields: &mut [HeaderField],
    last_len: usize,
) -> Result<Status, Malformed> {
    *req = Request::new();

    if last_len != 0 {
        if let Err(error) = is_complete(buf, last_len) {
            return classify(error);
        }
    }

    match request(buf, req, fields) {
        Ok((i, ())) => Ok(Status::Complete(buf.offset(i))),
        Err(error) => classify(error),
    }
}

/// Parse a status line and its header block from `buf`.
///
/// Same contract as [`parse_request`].
pub fn parse_response(
    buf: &[u8],
    res: &mut Response,
    fields: &mut [HeaderField],
    last_len: usize,
) -> Result<Status, Malformed> {
    *res = Response::new();

    if last_len != 0 {
        if let Err(error) = is_complete(buf, last_len) {
            return classify(error);
        }
    }

    match response(buf, res, fields) {
        Ok((i, ())) => Ok(Status::Complete(buf.offset(i))),
        Err(error) => classify(error),
    }
}

/// Parse a standalone header block terminated by an empty line, as found
/// in trailers or multipart parts.
///
/// Returns the status together with the number of fields written, which
/// is meaningful on both complete and partial returns.
pub fn parse_headers(
    buf: &[u8],
    fields: &mut [HeaderField],
    last_len: usize,
) -> Result<(Status, usize), Malformed> {
    let mut num_fields = 0;

    if last_len != 0 {
        if let Err(error) = is_complete(buf, last_len) {
            return classify(error).map(|status| (status, num_fields));
        }
    }

    match parse_fields(buf, buf, fields, &mut num_fields) {
        Ok((i, ())) => Ok((Status::Complete(buf.offset(i)), num_fields)),
        Err(error) => classify(error).map(|status| (status, num_fields)),
    }
}

fn request<'a>(
    buf: &'a [u8],
    req: &mut Request,
    fields: &mut [HeaderField],
) -> IResult<&'a [u8], ()> {
    // tolerate one empty line before the request line: some clients send
    // a spurious CRLF after the body of the previous request
    let i = match buf.first() {
        None => return Err(NomError::Incomplete(Needed::new(1))),
        Some(&b'\r' | &b'\n') => eol(buf)?.0,
        Some(_) => buf,
    };

    let (i, method) = token(i)?;
    req.method = Store::new_slice(buf, method);
    let (i, _) = space(i)?;
    let (i, path) = token(i)?;
    req.path = Store::new_slice(buf, path);
    let (i, _) = space(i)?;
    let (i, minor) = http_version(i)?;
    req.minor_version = Some(minor);
    let (i, _) = eol(i)?;

    parse_fields(buf, i, fields, &mut req.num_fields)
}

fn response<'a>(
    buf: &'a [u8],
    res: &mut Response,
    fields: &mut [HeaderField],
) -> IResult<&'a [u8], ()> {
    let (i, minor) = http_version(buf)?;
    res.minor_version = Some(minor);
    let (i, _) = space(i)?;
    let (i, status) = decimal(i)?;
    res.status = Some(status);

    // one space before the reason-phrase, or a direct line terminator for
    // an empty one; any other byte after the code is garbage
    let (i, reason) = match i.first() {
        Some(&b'\r' | &b'\n') => {
            let (rest, _) = eol(i)?;
            (rest, &i[..0])
        }
        _ => {
            let (i, _) = space(i)?;
            to_eol(i)?
        }
    };
    res.reason = Store::new_slice(buf, reason);

    parse_fields(buf, i, fields, &mut res.num_fields)
}

/// The shared header-field loop: one field per line until an empty line.
///
/// `num_fields` counts fields whose line terminator was consumed, so a
/// partial return leaves it at the last fully-parsed field.
fn parse_fields<'a>(
    buf: &'a [u8],
    mut i: &'a [u8],
    fields: &mut [HeaderField],
    num_fields: &mut usize,
) -> IResult<&'a [u8], ()> {
    loop {
        match i.first() {
            None => return Err(NomError::Incomplete(Needed::new(1))),
            Some(&b'\r' | &b'\n') => return eol(i),
            Some(_) => {}
        }

        if *num_fields == fields.len() {
            return Err(NomError::Error(make_error(i, NomErrorKind::ManyMN)));
        }

        let field = if *num_fields != 0 && (i[0] == b' ' || i[0] == b'\t') {
            // obsolete line folding: the whole line, leading whitespace
            // included, continues the previous field's value
            let (rest, value) = to_eol(i)?;
            i = rest;
            HeaderField::Continuation {
                value: Slice::new(buf, value),
            }
        } else {
            let (rest, name) = field_name(i)?;
            let (rest, _) = skip_ows(rest)?;
            let (rest, value) = to_eol(rest)?;
            i = rest;
            HeaderField::Field {
                name: Slice::new(buf, name),
                value: Slice::new(buf, value),
            }
        };
        fields[*num_fields] = field;
        *num_fields += 1;
    }
}
