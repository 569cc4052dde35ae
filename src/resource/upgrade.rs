//! Upgrade resources: connections handed off to another framed protocol.
//!
//! Only the handoff lives here: validating the upgrade handshake, computing
//! `Sec-WebSocket-Accept` (RFC 6455 Section 4.2.2) and giving the raw
//! connection plus the resource's scratch buffer to its [`UpgradeHandler`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::ResourceError;
use crate::http::request::{Method, RequestHead};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// RFC 6455 magic GUID concatenated with the client key for Sec-WebSocket-Accept.
const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Byte stream an upgraded connection runs on.
pub trait Io: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Io for T {}

/// A connection after the 101 response went out.
pub struct Upgraded {
    pub io: Box<dyn Io>,
    /// Bytes the client sent after the handshake that were already read.
    pub pending: Bytes,
}

pub type UpgradeFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Runs the message loop of an upgraded connection.
pub trait UpgradeHandler: Send + Sync {
    fn serve<'a>(&'a self, conn: Upgraded, scratch: &'a mut [u8]) -> UpgradeFuture<'a>;
}

pub struct UpgradeResource {
    handler: Arc<dyn UpgradeHandler>,
    scratch: Arc<Mutex<Box<[u8]>>>,
    scratch_capacity: usize,
}

impl UpgradeResource {
    pub fn new(handler: impl UpgradeHandler + 'static, scratch_capacity: usize) -> Self {
        Self {
            handler: Arc::new(handler),
            scratch: Arc::new(Mutex::new(vec![0u8; scratch_capacity].into_boxed_slice())),
            scratch_capacity,
        }
    }

    pub fn scratch_capacity(&self) -> usize {
        self.scratch_capacity
    }

    /// Validates the handshake and reserves the scratch buffer.
    ///
    /// The scratch buffer belongs to the resource, so a second client is
    /// turned away with [`ResourceError::Busy`] while one session runs.
    pub fn handshake(&self, head: &RequestHead) -> Result<Handoff, ResourceError> {
        let client_key = validate_upgrade_request(head)?;

        let scratch = Arc::clone(&self.scratch)
            .try_lock_owned()
            .map_err(|_| ResourceError::Busy)?;

        Ok(Handoff {
            accept_key: compute_accept_key(client_key),
            handler: Arc::clone(&self.handler),
            scratch,
        })
    }
}

/// A successful handshake, waiting for the connection.
pub struct Handoff {
    pub accept_key: String,
    handler: Arc<dyn UpgradeHandler>,
    scratch: OwnedMutexGuard<Box<[u8]>>,
}

impl Handoff {
    /// The `101 Switching Protocols` reply.
    pub fn response(&self) -> Response {
        ResponseBuilder::new(StatusCode::SwitchingProtocols)
            .header("Upgrade", "websocket")
            .header("Connection", "Upgrade")
            .header("Sec-WebSocket-Accept", self.accept_key.as_str())
            .unsized_body()
            .build()
    }

    pub async fn run(mut self, conn: Upgraded) -> anyhow::Result<()> {
        let handler = Arc::clone(&self.handler);
        handler.serve(conn, &mut self.scratch[..]).await
    }
}

/// Compute the `Sec-WebSocket-Accept` value per RFC 6455 Section 4.2.2.
pub fn compute_accept_key(client_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(client_key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Checks the upgrade headers and returns the client key.
pub fn validate_upgrade_request(head: &RequestHead) -> Result<&str, ResourceError> {
    if head.method != Method::GET {
        return Err(ResourceError::BadUpgrade("method must be GET"));
    }

    match head.header("Upgrade") {
        Some(v) if v.eq_ignore_ascii_case("websocket") => {}
        _ => return Err(ResourceError::BadUpgrade("missing or invalid Upgrade header")),
    }

    if !head.header_has_token("Connection", "upgrade") {
        return Err(ResourceError::BadUpgrade(
            "missing or invalid Connection header",
        ));
    }

    let client_key = head
        .header("Sec-WebSocket-Key")
        .filter(|k| !k.is_empty())
        .ok_or(ResourceError::BadUpgrade("missing Sec-WebSocket-Key header"))?;

    match head.header("Sec-WebSocket-Version") {
        Some("13") => {}
        _ => {
            return Err(ResourceError::BadUpgrade(
                "missing or invalid Sec-WebSocket-Version (must be 13)",
            ));
        }
    }

    Ok(client_key)
}
