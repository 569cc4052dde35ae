use crate::http::request::{Method, RequestHead};
use std::collections::HashMap;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    UnsupportedTransferEncoding,
    Incomplete,
}

/// Parses the request line and headers at the start of `buf`.
///
/// On success returns the head and the number of bytes it occupied. Any bytes
/// after that belong to the body (or to the next request).
pub fn parse_request_head(buf: &[u8]) -> Result<(RequestHead, usize), ParseError> {
    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    if parts.next().is_some() || !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader);
        }

        let key = key.to_ascii_lowercase();
        let value = value.trim();

        // A repeated Content-Length must agree with the first one.
        if key == "content-length" {
            if let Some(first) = headers.get(&key) {
                if first != value {
                    return Err(ParseError::InvalidContentLength);
                }
            }
        }

        headers.insert(key, value.to_string());
    }

    if headers.contains_key("transfer-encoding") {
        return Err(ParseError::UnsupportedTransferEncoding);
    }

    if let Some(v) = headers.get("content-length") {
        v.parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?;
    }

    let head = RequestHead {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
    };

    Ok((head, headers_end + 4))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_request_head(req).unwrap();

        assert_eq!(parsed.path(), "/");
        assert_eq!(parsed.header("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn body_bytes_are_not_consumed() {
        let req = b"POST /led HTTP/1.1\r\nContent-Length: 4\r\n\r\nab";

        let (parsed, consumed) = parse_request_head(req).unwrap();

        assert_eq!(parsed.content_length(), 4);
        assert_eq!(&req[consumed..], b"ab");
    }
}
