use waku::{
    parse_headers, parse_request, visit_request, Callbacks, Framing, HeaderField, HeaderMap,
    Malformed, Request, Status, EMPTY_FIELD,
};

fn resolve<'a>(buf: &'a [u8], field: &HeaderField) -> (Option<&'a [u8]>, &'a [u8]) {
    (
        field.name().map(|name| name.data(buf).expect("name")),
        field.value().data(buf).expect("value"),
    )
}

#[test]
fn standalone_block() {
    let buf = b"Host: example.com\r\nCookie: \r\n\r\n";
    let mut fields = [EMPTY_FIELD; 4];
    let result = parse_headers(buf, &mut fields, 0);
    assert_eq!(result, Ok((Status::Complete(buf.len()), 2)));
    assert_eq!(resolve(buf, &fields[0]), (Some(&b"Host"[..]), &b"example.com"[..]));
    assert_eq!(resolve(buf, &fields[1]), (Some(&b"Cookie"[..]), &b""[..]));
}

#[test]
fn empty_block() {
    let mut fields = [EMPTY_FIELD; 4];
    assert_eq!(
        parse_headers(b"\r\n", &mut fields, 0),
        Ok((Status::Complete(2), 0))
    );
    assert_eq!(
        parse_headers(b"\n", &mut fields, 0),
        Ok((Status::Complete(1), 0))
    );
}

#[test]
fn partial_counts_terminated_fields() {
    let mut fields = [EMPTY_FIELD; 4];
    assert_eq!(
        parse_headers(b"Host: exa", &mut fields, 0),
        Ok((Status::Partial, 0))
    );
    assert_eq!(
        parse_headers(b"Host: example.com\r\n", &mut fields, 0),
        Ok((Status::Partial, 1))
    );
}

#[test]
fn probe_acceleration() {
    let buf = &b"Host: example.com\r\nCookie: Candy\r\n\r\n"[..];
    let mut fields = [EMPTY_FIELD; 4];
    assert_eq!(
        parse_headers(buf, &mut fields, buf.len() - 1),
        Ok((Status::Complete(buf.len()), 2))
    );
    assert_eq!(
        parse_headers(&buf[..buf.len() - 1], &mut fields, buf.len() - 2),
        Ok((Status::Partial, 0))
    );
}

#[test]
fn del_byte_in_value() {
    let mut fields = [EMPTY_FIELD; 4];
    assert_eq!(
        parse_headers(b"Host: e\x7fample.com\r\nCookie: \r\n\r", &mut fields, 0),
        Err(Malformed)
    );
}

#[test]
fn capacity_exhausted() {
    let buf = b"a: 1\r\nb: 2\r\nc: 3\r\n\r\n";
    let mut fields = [EMPTY_FIELD; 2];
    assert_eq!(parse_headers(buf, &mut fields, 0), Err(Malformed));
    let mut fields = [EMPTY_FIELD; 3];
    assert_eq!(
        parse_headers(buf, &mut fields, 0),
        Ok((Status::Complete(buf.len()), 3))
    );
}

#[test]
fn header_map() {
    let buf = b"Host: example.com\r\nSet-Cookie: a=1 \r\nSET-COOKIE: b=2\r\n\r\n";
    let mut fields = [EMPTY_FIELD; 8];
    let (status, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    assert!(status.is_complete());

    let map = HeaderMap::collect(buf, &fields[..num]);
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(b"host"), Some(&b"example.com"[..]));
    // trailing whitespace is stripped by the map, lookup folds case
    let cookies: Vec<_> = map.get_all(b"set-cookie").collect();
    assert_eq!(cookies, [&b"a=1"[..], &b"b=2"[..]]);
    assert_eq!(map.get(b"missing"), None);
}

#[test]
fn header_map_continuation_under_empty_name() {
    let buf = b"foo: b\r\n  \tc\r\n\r\n";
    let mut fields = [EMPTY_FIELD; 4];
    let (_, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    let map = HeaderMap::collect(buf, &fields[..num]);
    assert_eq!(map.get(b"foo"), Some(&b"b"[..]));
    assert_eq!(map.get(b""), Some(&b"  \tc"[..]));
}

#[test]
fn framing_content_length() {
    let buf = b"Host: a\r\nContent-Length: 42\r\n\r\n";
    let mut fields = [EMPTY_FIELD; 4];
    let (_, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    let framing = Framing::decode(buf, &fields[..num]).expect("framing");
    assert_eq!(framing.content_length, Some(42));
    assert!(!framing.is_chunked);

    let buf = b"Content-Length: 3\r\nContent-Length: 3\r\n\r\n";
    let (_, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    let framing = Framing::decode(buf, &fields[..num]).expect("framing");
    assert_eq!(framing.content_length, Some(3));

    let buf = b"Content-Length: 3\r\nContent-Length: 4\r\n\r\n";
    let (_, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    assert_eq!(Framing::decode(buf, &fields[..num]), Err(Malformed));

    let buf = b"Content-Length: 12a\r\n\r\n";
    let (_, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    assert_eq!(Framing::decode(buf, &fields[..num]), Err(Malformed));
}

#[test]
fn framing_transfer_encoding() {
    let buf = b"Transfer-Encoding: gzip, Chunked\r\n\r\n";
    let mut fields = [EMPTY_FIELD; 4];
    let (_, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    let framing = Framing::decode(buf, &fields[..num]).expect("framing");
    assert!(framing.is_chunked);
    assert_eq!(framing.content_length, None);
}

#[test]
fn framing_connection_flags() {
    let buf = b"Connection: Keep-Alive, Upgrade\r\nConnection: close\r\n\r\n";
    let mut fields = [EMPTY_FIELD; 4];
    let (_, num) = parse_headers(buf, &mut fields, 0).expect("parse");
    let framing = Framing::decode(buf, &fields[..num]).expect("framing");
    assert!(framing.connection.keep_alive);
    assert!(framing.connection.upgrade);
    assert!(framing.connection.close);
}

#[derive(Default)]
struct Recorder {
    request_line: Option<(Vec<u8>, Vec<u8>, u16)>,
    headers: Vec<(Vec<u8>, Vec<u8>)>,
    continuations: Vec<Vec<u8>>,
}

impl Callbacks for Recorder {
    fn on_request_line(&mut self, method: &[u8], path: &[u8], minor_version: u16) {
        self.request_line = Some((method.to_vec(), path.to_vec(), minor_version));
    }

    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        self.headers.push((name.to_vec(), value.to_vec()));
    }

    fn on_continuation(&mut self, value: &[u8]) {
        self.continuations.push(value.to_vec());
    }
}

#[test]
fn visit_replays_request() {
    let buf = b"GET /hoge HTTP/1.1\r\nHost: example.com \r\nfoo: b\r\n \tc\r\n\r\n";
    let mut fields = [EMPTY_FIELD; 8];
    let mut req = Request::new();
    let result = parse_request(buf, &mut req, &mut fields, 0);
    assert_eq!(result, Ok(Status::Complete(buf.len())));

    let mut recorder = Recorder::default();
    visit_request(buf, &req, &fields, &mut recorder);
    assert_eq!(
        recorder.request_line,
        Some((b"GET".to_vec(), b"/hoge".to_vec(), 1))
    );
    // the visitor strips trailing whitespace the core keeps
    assert_eq!(recorder.headers.len(), 2);
    assert_eq!(recorder.headers[0], (b"Host".to_vec(), b"example.com".to_vec()));
    assert_eq!(recorder.headers[1], (b"foo".to_vec(), b"b".to_vec()));
    assert_eq!(recorder.continuations, [b" \tc".to_vec()]);
}
