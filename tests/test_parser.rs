use lumen::http::parser::{ParseError, parse_request_head};
use lumen::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_request_head(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.target, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.header("Host").unwrap(), "example.com");
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_leaves_body_in_buffer() {
    let req = b"POST /led HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_request_head(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path(), "/led");
    assert_eq!(parsed.content_length(), 5);
    assert_eq!(&req[consumed..], b"hello");
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.header("host").unwrap(), "example.com");
    assert_eq!(parsed.header("USER-AGENT").unwrap(), "test-client");
    assert_eq!(parsed.header("Accept").unwrap(), "*/*");
}

#[test]
fn test_parse_target_keeps_query_path_drops_it() {
    let req = b"GET /uptime?fresh=1 HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.target, "/uptime?fresh=1");
    assert_eq!(parsed.path(), "/uptime");
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";

    assert_eq!(parse_request_head(req).err(), Some(ParseError::Incomplete));
}

#[test]
fn test_parse_invalid_http_method() {
    let req = b"INVALID / HTTP/1.1\r\n\r\n";

    assert_eq!(parse_request_head(req).err(), Some(ParseError::InvalidMethod));
}

#[test]
fn test_parse_malformed_request_line() {
    for req in [
        &b"GET /\r\n\r\n"[..],
        &b"GET / FTP/1.0\r\n\r\n"[..],
        &b"GET / HTTP/1.1 extra\r\n\r\n"[..],
    ] {
        assert_eq!(parse_request_head(req).err(), Some(ParseError::InvalidRequest));
    }
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n";

    assert_eq!(parse_request_head(req).err(), Some(ParseError::InvalidHeader));

    let req = b"GET / HTTP/1.1\r\n: no-name\r\n\r\n";
    assert_eq!(parse_request_head(req).err(), Some(ParseError::InvalidHeader));
}

#[test]
fn test_parse_rejects_bad_content_length() {
    let req = b"POST /led HTTP/1.1\r\nContent-Length: lots\r\n\r\n";

    assert_eq!(
        parse_request_head(req).err(),
        Some(ParseError::InvalidContentLength)
    );
}

#[test]
fn test_parse_rejects_transfer_encoding() {
    let req = b"POST /dynamic HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";

    assert_eq!(
        parse_request_head(req).err(),
        Some(ParseError::UnsupportedTransferEncoding)
    );
}

#[test]
fn test_parse_various_http_methods() {
    for method in Method::ALL {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method);
        let (parsed, _) = parse_request_head(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, method);
    }
}

#[test]
fn test_parse_pipelined_requests_one_at_a_time() {
    let req = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";

    let (first, consumed) = parse_request_head(req).unwrap();
    let (second, _) = parse_request_head(&req[consumed..]).unwrap();

    assert_eq!(first.path(), "/a");
    assert_eq!(second.path(), "/b");
}

#[test]
fn test_parse_conflicting_content_length_rejected() {
    let req = b"POST /led HTTP/1.1\r\nContent-Length: 5\r\nContent-Length: 50\r\n\r\n";

    assert_eq!(
        parse_request_head(req).err(),
        Some(ParseError::InvalidContentLength)
    );
}

#[test]
fn test_parse_repeated_equal_content_length_accepted() {
    let req = b"POST /led HTTP/1.1\r\nContent-Length: 5\r\ncontent-length: 5\r\n\r\nhello";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.content_length(), 5);
}
