use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::Config;
use crate::dispatch::{Dispatcher, DynamicCycle, Route};
use crate::error::ResourceError;
use crate::http::parser::{ParseError, parse_request_head};
use crate::http::request::RequestHead;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::writer::{FragmentWriter, Framing, ResponseWriter};
use crate::resource::dynamic::DataStatus;
use crate::resource::upgrade::{Handoff, Upgraded};

/// Per-connection transport limits.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Largest single socket read, and so the largest body delivery.
    pub read_chunk: usize,
    pub max_head_size: usize,
    /// Time allowed for a whole request body to arrive.
    pub body_timeout: Duration,
    /// Most unread body bytes skipped to keep a connection after a reply.
    pub max_drain: usize,
}

impl Limits {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            read_chunk: cfg.read_chunk,
            max_head_size: cfg.max_head_size,
            body_timeout: cfg.body_timeout(),
            max_drain: cfg.max_drain,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    dispatcher: Arc<Dispatcher>,
    limits: Limits,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Dispatching(RequestHead),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Upgrading(Handoff),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(stream: S, dispatcher: Arc<Dispatcher>, limits: Limits) -> Self {
        let limits = Limits {
            read_chunk: limits.read_chunk.max(1),
            ..limits
        };
        Self {
            stream,
            buffer: BytesMut::with_capacity(limits.read_chunk.max(1024)),
            dispatcher,
            limits,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_head().await? {
                        Some(head) => ConnectionState::Dispatching(head),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Dispatching(head) => {
                    self.state = self.dispatch(head).await?;
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    self.state = if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    };
                }

                ConnectionState::Upgrading(handoff) => {
                    let pending = self.buffer.split().freeze();
                    let conn = Upgraded {
                        io: Box::new(self.stream),
                        pending,
                    };
                    return handoff.run(conn).await;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_head(&mut self) -> anyhow::Result<Option<RequestHead>> {
        loop {
            // Try parsing whatever we already have
            match parse_request_head(&self.buffer) {
                Ok((head, consumed)) => {
                    let _ = self.buffer.split_to(consumed);
                    return Ok(Some(head));
                }

                Err(ParseError::Incomplete) => {
                    if self.buffer.len() > self.limits.max_head_size {
                        warn!(size = self.buffer.len(), "request head too large");
                        self.reject(StatusCode::BadRequest).await?;
                        return Ok(None);
                    }
                }

                Err(e) => {
                    warn!(error = ?e, "malformed request");
                    self.reject(StatusCode::BadRequest).await?;
                    return Ok(None);
                }
            }

            if !self.fill().await? {
                // Client closed connection
                return Ok(None);
            }
        }
    }

    async fn dispatch(&mut self, head: RequestHead) -> anyhow::Result<ConnectionState> {
        let keep_alive = head.keep_alive();
        let body_len = head.content_length();
        let framing = if head.accepts_chunked() {
            Framing::Chunked
        } else {
            Framing::UntilClose
        };

        let routed = self.dispatcher.route(&head).await;

        match routed {
            Err(err) => self.fail(err, body_len, keep_alive).await,

            Ok(Route::Static(reply)) => {
                let keep_alive = keep_alive && self.discard_body(body_len).await?;
                let mut response = reply.into_response();
                if !keep_alive {
                    response.headers.insert("Connection".into(), "close".into());
                }
                Ok(ConnectionState::Writing(
                    ResponseWriter::new(&response),
                    keep_alive,
                ))
            }

            Ok(Route::Dynamic(cycle)) => {
                self.stream_dynamic(cycle, framing, body_len, keep_alive)
                    .await
            }

            Ok(Route::Upgrade(handoff)) => {
                ResponseWriter::new(&handoff.response())
                    .write_to_stream(&mut self.stream)
                    .await?;
                debug!(path = %head.path(), "connection upgraded");
                Ok(ConnectionState::Upgrading(handoff))
            }
        }
    }

    /// Feeds the body to the resource one read at a time and writes back
    /// whatever fragments it produces.
    ///
    /// The body must arrive within `body_timeout`; the cycle holds the
    /// resource for no longer than that.
    async fn stream_dynamic(
        &mut self,
        mut cycle: DynamicCycle,
        framing: Framing,
        body_len: usize,
        keep_alive: bool,
    ) -> anyhow::Result<ConnectionState> {
        let mut out = FragmentWriter::new(cycle.content_type(), framing, keep_alive);
        let deadline = Instant::now() + self.limits.body_timeout;
        let mut remaining = body_len;

        loop {
            let data = match self.next_body_slice(remaining, deadline).await? {
                Some(data) => data,
                None => {
                    debug!(missing = remaining, "body incomplete, request aborted");
                    cycle.abort();
                    return Ok(ConnectionState::Closed);
                }
            };
            remaining -= data.len();

            let status = if remaining == 0 {
                DataStatus::Final
            } else {
                DataStatus::More
            };

            match cycle.deliver(status, &data) {
                Ok(Some(fragment)) => {
                    out.write_fragment(&mut self.stream, &fragment).await?;
                    if fragment.is_final_chunk {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    if out.is_committed() {
                        warn!(error = %err, "request failed after response started");
                        return Ok(ConnectionState::Closed);
                    }
                    drop(cycle);
                    return self.fail(err, remaining, keep_alive).await;
                }
            }

            if status == DataStatus::Final {
                break;
            }
        }

        // The resource may finish its reply before the body is complete.
        drop(cycle);
        let keep_alive = out.keeps_alive() && self.discard_body(remaining).await?;

        if !out.is_finished() {
            out.finish(&mut self.stream).await?;
        }

        Ok(if keep_alive {
            ConnectionState::Reading
        } else {
            ConnectionState::Closed
        })
    }

    /// Next piece of body, at most `read_chunk` bytes. `None` on EOF or
    /// once `deadline` passes.
    async fn next_body_slice(
        &mut self,
        remaining: usize,
        deadline: Instant,
    ) -> anyhow::Result<Option<Bytes>> {
        if remaining == 0 {
            return Ok(Some(Bytes::new()));
        }
        if self.buffer.is_empty() && !self.fill_before(deadline).await? {
            return Ok(None);
        }

        let take = remaining.min(self.buffer.len()).min(self.limits.read_chunk);
        Ok(Some(self.buffer.split_to(take).freeze()))
    }

    /// Answers with an error status and decides whether to keep going.
    async fn fail(
        &mut self,
        err: ResourceError,
        unread_body: usize,
        keep_alive: bool,
    ) -> anyhow::Result<ConnectionState> {
        warn!(error = %err, status = err.status().as_u16(), "request rejected");

        let keep_alive = keep_alive && self.discard_body(unread_body).await?;
        let mut response = Response::from_error(&err);
        if !keep_alive {
            response.headers.insert("Connection".into(), "close".into());
        }
        Ok(ConnectionState::Writing(
            ResponseWriter::new(&response),
            keep_alive,
        ))
    }

    async fn reject(&mut self, status: StatusCode) -> anyhow::Result<()> {
        let response = ResponseBuilder::new(status)
            .header("Connection", "close")
            .body(format!("{} {}", status.as_u16(), status.reason_phrase()))
            .build();
        ResponseWriter::new(&response)
            .write_to_stream(&mut self.stream)
            .await
    }

    /// Skips `len` body bytes. Returns false if the connection cannot be
    /// reused: too much left to skip, the client closed or it stalled.
    async fn discard_body(&mut self, mut len: usize) -> anyhow::Result<bool> {
        if len > self.limits.max_drain {
            debug!(unread = len, "unread body too large to drain");
            return Ok(false);
        }

        let deadline = Instant::now() + self.limits.body_timeout;
        while len > 0 {
            if self.buffer.is_empty() && !self.fill_before(deadline).await? {
                return Ok(false);
            }
            let take = len.min(self.buffer.len());
            let _ = self.buffer.split_to(take);
            len -= take;
        }
        Ok(true)
    }

    /// [`fill`](Self::fill) bounded by `deadline`. False on EOF or timeout.
    async fn fill_before(&mut self, deadline: Instant) -> anyhow::Result<bool> {
        match tokio::time::timeout_at(deadline, self.fill()).await {
            Ok(filled) => filled,
            Err(_) => {
                warn!("timed out waiting for request body");
                Ok(false)
            }
        }
    }

    /// One transport read into the connection buffer. False on EOF.
    async fn fill(&mut self) -> anyhow::Result<bool> {
        let mut temp = vec![0u8; self.limits.read_chunk];
        let n = self.stream.read(&mut temp).await?;

        if n == 0 {
            return Ok(false);
        }

        self.buffer.extend_from_slice(&temp[..n]);
        Ok(true)
    }
}
