//! Byte classification for HTTP/1.x framing.

/// RFC 7230 token set: ASCII letters, digits and `!#$%&'*+-.^_`|~`.
/// One load instead of a range ladder on the name-scanning path.
static TOKEN_CHARS: [bool; 256] = build_token_table();

const fn build_token_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut c = 0usize;
    while c < 256 {
        let b = c as u8;
        table[c] = b.is_ascii_alphanumeric()
            || matches!(
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
            );
        c += 1;
    }
    table
}

pub fn is_token_char(c: u8) -> bool {
    TOKEN_CHARS[c as usize]
}

/// `0x20..=0x7E`. Tab is not printable, DEL is not printable.
pub fn is_printable_ascii(c: u8) -> bool {
    c.wrapping_sub(0x20) < 0x5f
}

/// ASCII case-insensitive equality, for header-name comparisons.
pub fn compare_no_case(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
}
