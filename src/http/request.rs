use std::collections::HashMap;
use std::fmt;

/// Request methods a resource can declare in its [`MethodSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
}

impl Method {
    /// Every method, in bit order.
    pub const ALL: [Method; 7] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::HEAD,
        Method::OPTIONS,
        Method::PATCH,
    ];

    /// Exact, case-sensitive match on the request-line token.
    ///
    /// ```
    /// # use lumen::http::request::Method;
    /// assert_eq!(Method::from_str("PATCH"), Some(Method::PATCH));
    /// assert_eq!(Method::from_str("patch"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bitmask of the methods a resource accepts.
///
/// ```
/// # use lumen::http::request::{Method, MethodSet};
/// let set = MethodSet::of(&[Method::GET, Method::POST]);
/// assert!(set.contains(Method::POST));
/// assert!(!set.contains(Method::PUT));
/// assert_eq!(set.allow_header(), "GET, POST");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodSet(u8);

impl MethodSet {
    pub const EMPTY: MethodSet = MethodSet(0);

    pub const fn of(methods: &[Method]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < methods.len() {
            bits |= methods[i].bit();
            i += 1;
        }
        MethodSet(bits)
    }

    pub const fn with(self, method: Method) -> Self {
        MethodSet(self.0 | method.bit())
    }

    pub const fn contains(&self, method: Method) -> bool {
        self.0 & method.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Value for the `Allow` header of a 405 response.
    pub fn allow_header(&self) -> String {
        self.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
    }
}

/// The head of an HTTP request: request line and headers.
///
/// The body is not part of the head. It is delivered to the matched resource
/// in one or more slices as it arrives from the socket.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    /// Target as sent, query string included.
    pub target: String,
    pub version: String,
    /// Keyed by lowercased name.
    pub headers: HashMap<String, String>,
}

/// Heads for tests and tools that do not parse bytes. The version defaults
/// to `HTTP/1.1`.
pub struct RequestHeadBuilder {
    method: Option<Method>,
    target: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
}

impl RequestHeadBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: None,
            headers: HashMap::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn build(self) -> Result<RequestHead, &'static str> {
        Ok(RequestHead {
            method: self.method.ok_or("method missing")?,
            target: self.target.ok_or("target missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
        })
    }
}

impl Default for RequestHeadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestHead {
    /// Path portion of the target, without the query string.
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// Retrieves a header value by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Declared body length. Returns 0 when the header is missing.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// True if the header carries `token` in its comma separated list.
    pub fn header_has_token(&self, key: &str, token: &str) -> bool {
        self.header(key)
            .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
            .unwrap_or(false)
    }

    /// Whether the request carries the transport-level upgrade handshake.
    pub fn wants_upgrade(&self) -> bool {
        self.header_has_token("Connection", "upgrade") && self.header("Upgrade").is_some()
    }

    /// Whether a response body may use chunked transfer encoding.
    pub fn accepts_chunked(&self) -> bool {
        self.version != "HTTP/1.0"
    }

    /// Persistent unless the client asked to close. HTTP/1.0 clients must
    /// opt in with `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        if self.header_has_token("Connection", "close") {
            return false;
        }
        if self.version == "HTTP/1.0" {
            return self.header_has_token("Connection", "keep-alive");
        }
        true
    }
}
