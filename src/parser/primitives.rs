use nom::{
    bytes::streaming::tag,
    character::streaming::char,
    error::{make_error, ErrorKind as NomErrorKind, ParseError},
    Err as NomError, IResult, Needed,
};

use crate::token::{is_printable_ascii, is_token_char};

fn error_position<I, E: ParseError<I>>(i: I, kind: NomErrorKind) -> NomError<E> {
    NomError::Error(make_error(i, kind))
}

// 8-bit bytes show up in request targets and header values sent by real
// clients (ISO-8859-1, raw UTF-8); tolerate them unless built strict.
#[cfg(feature = "tolerant-parsing")]
fn is_target_char(i: u8) -> bool {
    is_printable_ascii(i) || i >= 0x80
}

#[cfg(not(feature = "tolerant-parsing"))]
fn is_target_char(i: u8) -> bool {
    is_printable_ascii(i)
}

// Header values additionally admit HTAB.
#[cfg(feature = "tolerant-parsing")]
fn is_value_char(i: u8) -> bool {
    i == b'\t' || is_printable_ascii(i) || i >= 0x80
}

#[cfg(not(feature = "tolerant-parsing"))]
fn is_value_char(i: u8) -> bool {
    i == b'\t' || is_printable_ascii(i)
}

/// Advance to the next space, yielding the bytes before it. The delimiter
/// itself is left unconsumed.
///
/// Methods and request targets share this scan. CR and LF are rejected
/// outright: a request line truncated before its delimiting space can
/// never be completed into a valid one.
pub fn token(i: &[u8]) -> IResult<&[u8], &[u8]> {
    for (idx, &b) in i.iter().enumerate() {
        if b == b' ' {
            return Ok((&i[idx..], &i[..idx]));
        }
        if !is_target_char(b) {
            return Err(error_position(&i[idx..], NomErrorKind::Char));
        }
    }
    Err(NomError::Incomplete(Needed::new(1)))
}

/// Advance to the end of the line, yielding the bytes before the
/// terminator and consuming the terminator itself.
///
/// CRLF and bare LF both terminate. A CR followed by anything else is
/// malformed, as is any control byte other than HTAB.
pub fn to_eol(i: &[u8]) -> IResult<&[u8], &[u8]> {
    let mut idx = 0;
    while idx < i.len() {
        match i[idx] {
            b'\r' => {
                return match i.get(idx + 1) {
                    Some(&b'\n') => Ok((&i[idx + 2..], &i[..idx])),
                    Some(_) => Err(error_position(&i[idx..], NomErrorKind::CrLf)),
                    None => Err(NomError::Incomplete(Needed::new(1))),
                }
            }
            b'\n' => return Ok((&i[idx + 1..], &i[..idx])),
            b if !is_value_char(b) => {
                return Err(error_position(&i[idx..], NomErrorKind::Char))
            }
            _ => idx += 1,
        }
    }
    Err(NomError::Incomplete(Needed::new(1)))
}

/// At least one digit, accumulated until the first non-digit, which is
/// left unconsumed. Running out of input while still reading digits is
/// incomplete: more digits may follow.
///
/// Values that do not fit a u16 are rejected rather than wrapped.
pub fn decimal(i: &[u8]) -> IResult<&[u8], u16> {
    match i.first() {
        None => return Err(NomError::Incomplete(Needed::new(1))),
        Some(b) if !b.is_ascii_digit() => {
            return Err(error_position(i, NomErrorKind::Digit))
        }
        Some(_) => {}
    }
    let mut value: u32 = 0;
    for (idx, &b) in i.iter().enumerate() {
        if !b.is_ascii_digit() {
            return Ok((&i[idx..], value as u16));
        }
        value = value * 10 + u32::from(b - b'0');
        if value > u32::from(u16::MAX) {
            return Err(error_position(&i[idx..], NomErrorKind::TooLarge));
        }
    }
    Err(NomError::Incomplete(Needed::new(1)))
}

pub fn space(i: &[u8]) -> IResult<&[u8], char> {
    char(' ')(i)
}

/// A line terminator on its own: CRLF or bare LF.
pub fn eol(i: &[u8]) -> IResult<&[u8], ()> {
    match i.first() {
        None => Err(NomError::Incomplete(Needed::new(1))),
        Some(&b'\n') => Ok((&i[1..], ())),
        Some(&b'\r') => match i.get(1) {
            Some(&b'\n') => Ok((&i[2..], ())),
            Some(_) => Err(error_position(i, NomErrorKind::CrLf)),
            None => Err(NomError::Incomplete(Needed::new(1))),
        },
        Some(_) => Err(error_position(i, NomErrorKind::CrLf)),
    }
}

/// Matches the literal `HTTP/1.` then the minor version.
pub fn http_version(i: &[u8]) -> IResult<&[u8], u16> {
    let (i, _) = tag("HTTP/1.")(i)?;
    decimal(i)
}

/// A header name: one or more token characters, then the colon. The
/// first non-token byte must be the colon itself, which rejects both
/// control bytes and the `name : value` ambiguity (MFSA-2006-33) without
/// a separate check.
pub fn field_name(i: &[u8]) -> IResult<&[u8], &[u8]> {
    if let Some(&b) = i.first() {
        if !is_token_char(b) {
            return Err(error_position(i, NomErrorKind::Char));
        }
    }
    for (idx, &b) in i.iter().enumerate() {
        if is_token_char(b) {
            continue;
        }
        if b == b':' {
            return Ok((&i[idx + 1..], &i[..idx]));
        }
        return Err(error_position(&i[idx..], NomErrorKind::Char));
    }
    Err(NomError::Incomplete(Needed::new(1)))
}

/// Skip the run of spaces and tabs between the colon and the value.
pub fn skip_ows(i: &[u8]) -> IResult<&[u8], ()> {
    for (idx, &b) in i.iter().enumerate() {
        if b != b' ' && b != b'\t' {
            return Ok((&i[idx..], ()));
        }
    }
    Err(NomError::Incomplete(Needed::new(1)))
}

/// Fast probe for the end-of-headers marker: two consecutive line
/// terminators with nothing between them.
///
/// Scanning resumes three bytes before the previously seen end of input
/// so that a marker straddling the old boundary is still found, and each
/// retry pays only for newly arrived bytes.
pub fn is_complete(buf: &[u8], last_len: usize) -> IResult<&[u8], ()> {
    let mut i = if last_len < 3 { buf } else { &buf[last_len - 3..] };
    let mut term_count = 0;
    loop {
        match i.first() {
            None => return Err(NomError::Incomplete(Needed::new(1))),
            Some(&b'\r') => match i.get(1) {
                Some(&b'\n') => {
                    i = &i[2..];
                    term_count += 1;
                }
                Some(_) => return Err(error_position(i, NomErrorKind::CrLf)),
                None => return Err(NomError::Incomplete(Needed::new(1))),
            },
            Some(&b'\n') => {
                i = &i[1..];
                term_count += 1;
            }
            Some(_) => {
                i = &i[1..];
                term_count = 0;
            }
        }
        if term_count == 2 {
            return Ok((i, ()));
        }
    }
}
