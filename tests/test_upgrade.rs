use lumen::error::ResourceError;
use lumen::http::request::{Method, RequestHead, RequestHeadBuilder};
use lumen::resource::upgrade::{compute_accept_key, validate_upgrade_request};

fn handshake() -> RequestHeadBuilder {
    RequestHeadBuilder::new()
        .method(Method::GET)
        .target("/ws_echo")
        .header("Upgrade", "websocket")
        .header("Connection", "Upgrade")
        .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
        .header("Sec-WebSocket-Version", "13")
}

fn reason(head: &RequestHead) -> &'static str {
    match validate_upgrade_request(head) {
        Err(ResourceError::BadUpgrade(reason)) => reason,
        other => panic!("expected BadUpgrade, got {other:?}"),
    }
}

#[test]
fn test_accept_key_rfc_example() {
    assert_eq!(
        compute_accept_key("dGhlIHNhbXBsZSBub25jZQ=="),
        "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
    );
}

#[test]
fn test_valid_handshake_returns_client_key() {
    let head = handshake().build().unwrap();

    assert_eq!(
        validate_upgrade_request(&head),
        Ok("dGhlIHNhbXBsZSBub25jZQ==")
    );
}

#[test]
fn test_header_values_are_case_insensitive() {
    let head = handshake()
        .header("Upgrade", "WebSocket")
        .header("Connection", "keep-alive, upgrade")
        .build()
        .unwrap();

    assert!(validate_upgrade_request(&head).is_ok());
}

#[test]
fn test_handshake_must_be_get() {
    let head = handshake().method(Method::POST).build().unwrap();

    assert!(reason(&head).contains("GET"));
}

#[test]
fn test_handshake_rejects_missing_pieces() {
    let wrong_upgrade = handshake().header("Upgrade", "h2c").build().unwrap();
    assert!(reason(&wrong_upgrade).contains("Upgrade"));

    let no_connection_token = handshake().header("Connection", "keep-alive").build().unwrap();
    assert!(reason(&no_connection_token).contains("Connection"));

    let empty_key = handshake().header("Sec-WebSocket-Key", "").build().unwrap();
    assert!(reason(&empty_key).contains("Sec-WebSocket-Key"));

    let old_version = handshake()
        .header("Sec-WebSocket-Version", "8")
        .build()
        .unwrap();
    assert!(reason(&old_version).contains("Version"));
}
