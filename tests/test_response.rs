use bytes::Bytes;
use lumen::error::ResourceError;
use lumen::http::request::{Method, MethodSet};
use lumen::http::response::{Response, ResponseBuilder, StatusCode};
use lumen::http::writer::{FragmentWriter, Framing, encode_chunk, serialize_response};
use lumen::resource::dynamic::ResponseContext;

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::SwitchingProtocols.as_u16(), 101);
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    assert_eq!(StatusCode::PayloadTooLarge.as_u16(), 413);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::ServiceUnavailable.as_u16(), 503);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::PayloadTooLarge.reason_phrase(), "Payload Too Large");
    assert_eq!(
        StatusCode::MethodNotAllowed.reason_phrase(),
        "Method Not Allowed"
    );
    assert_eq!(
        StatusCode::ServiceUnavailable.reason_phrase(),
        "Service Unavailable"
    );
}

#[test]
fn test_response_builder_with_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .header("X-Custom", "value")
        .body(Bytes::from_static(b"test"))
        .build();

    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert_eq!(response.header("X-Custom"), Some("value"));
    assert_eq!(response.header("Content-Length"), Some("4"));
}

#[test]
fn test_response_builder_unsized_body() {
    let response = ResponseBuilder::new(StatusCode::SwitchingProtocols)
        .header("Upgrade", "websocket")
        .unsized_body()
        .build();

    assert_eq!(response.header("Content-Length"), None);
}

#[test]
fn test_serialize_response() {
    let response = ResponseBuilder::new(StatusCode::NotFound)
        .body("nope")
        .build();

    let raw = String::from_utf8(serialize_response(&response)).unwrap();

    assert!(raw.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(raw.contains("Content-Length: 4\r\n"));
    assert!(raw.ends_with("\r\n\r\nnope"));
}

#[test]
fn test_error_statuses() {
    let cases = [
        (ResourceError::NotFound { path: "/x".into() }, 404),
        (
            ResourceError::PayloadTooLarge {
                capacity: 32,
                attempted: 33,
            },
            413,
        ),
        (ResourceError::DecodeFailure("eof".into()), 400),
        (ResourceError::SideEffectFailure("led".into()), 500),
        (ResourceError::BadUpgrade("no key"), 400),
        (ResourceError::Busy, 503),
        (ResourceError::RequestClosed, 500),
    ];

    for (err, code) in cases {
        let response = Response::from_error(&err);
        assert_eq!(response.status.as_u16(), code, "{err}");
        assert_eq!(response.header("Allow"), None);
    }
}

#[test]
fn test_method_not_allowed_lists_allowed_methods() {
    let err = ResourceError::MethodNotAllowed {
        path: "/dynamic".into(),
        method: Method::PUT,
        allowed: MethodSet::of(&[Method::GET, Method::POST]),
    };

    let response = Response::from_error(&err);

    assert_eq!(response.status, StatusCode::MethodNotAllowed);
    assert_eq!(response.header("Allow"), Some("GET, POST"));
}

#[test]
fn test_encode_chunk() {
    let mut buf = Vec::new();
    encode_chunk(b"hello world, again!", &mut buf);
    encode_chunk(&[], &mut buf);

    assert_eq!(buf, b"13\r\nhello world, again!\r\n0\r\n\r\n");
}

#[test]
fn test_chunked_writer_commits_on_first_bytes() {
    let mut writer = FragmentWriter::new(Some("text/plain"), Framing::Chunked, true);

    // Empty non-final fragments send nothing.
    assert!(writer.encode(&ResponseContext::chunk(Bytes::new())).is_empty());
    assert!(!writer.is_committed());

    let first = String::from_utf8(writer.encode(&ResponseContext::chunk(Bytes::from_static(b"ab")))).unwrap();
    assert!(first.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(first.contains("Transfer-Encoding: chunked\r\n"));
    assert!(first.contains("Content-Type: text/plain\r\n"));
    assert!(!first.contains("Connection: close"));
    assert!(first.ends_with("\r\n\r\n2\r\nab\r\n"));
    assert!(writer.is_committed());

    let last = writer.encode(&ResponseContext::last(Bytes::from_static(b"c")));
    assert_eq!(last, b"1\r\nc\r\n0\r\n\r\n");
    assert!(writer.is_finished());

    // Nothing after the terminating chunk.
    assert!(writer.encode(&ResponseContext::last(Bytes::from_static(b"d"))).is_empty());
}

#[test]
fn test_chunked_writer_empty_final_still_answers() {
    let mut writer = FragmentWriter::new(None, Framing::Chunked, false);

    let raw = String::from_utf8(writer.encode(&ResponseContext::empty_final())).unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.contains("Connection: close\r\n"));
    assert!(!raw.contains("Content-Type"));
    assert!(raw.ends_with("\r\n\r\n0\r\n\r\n"));
}

#[test]
fn test_until_close_framing_writes_raw_body() {
    let mut writer = FragmentWriter::new(Some("text/plain"), Framing::UntilClose, true);
    assert!(!writer.keeps_alive());

    let first = String::from_utf8(writer.encode(&ResponseContext::chunk(Bytes::from_static(b"12")))).unwrap();
    assert!(first.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(!first.contains("Transfer-Encoding"));
    assert!(first.contains("Connection: close\r\n"));
    assert!(first.ends_with("\r\n\r\n12"));

    let last = writer.encode(&ResponseContext::last(Bytes::from_static(b"34")));
    assert_eq!(last, b"34");
    assert!(writer.is_finished());
}
