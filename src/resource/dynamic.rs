//! Dynamic resources and the per-resource streaming engine.
//!
//! A request body reaches a dynamic resource as a series of deliveries, each
//! tagged with a [`DataStatus`]. The [`DynamicEngine`] bound to the resource
//! runs every delivery through this state machine:
//!
//! ```text
//!             More / Final
//!   ┌──────┐ ─────────────▶ ┌──────────────┐
//!   │ Idle │                │ Accumulating │ ◀─┐ More
//!   └──────┘ ◀───────────── └──────┬───────┘ ──┘
//!       ▲      Aborted             │ Final
//!       │      (reset, no reply)   ▼
//!       │                   ┌──────────────┐
//!       └────────────────── │  Finalizing  │  decode, side effect, reply
//!          reset always     └──────────────┘
//! ```
//!
//! Finalizing and aborting both finish inside the call that triggered them,
//! so between calls the engine is either `Idle` or `Accumulating`. The buffer
//! cursor is 0 whenever the engine is `Idle`.
//!
//! One engine serves every request to its resource, so at most one request
//! may be in flight per resource. [`DynamicResource::acquire`] hands out the
//! engine behind an owned lock guard; the connection holds it for the whole
//! request.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::ResourceError;
use crate::http::request::Method;
use crate::resource::buffer::AccumulationBuffer;

/// Tag attached to every body delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStatus {
    /// More body bytes will follow.
    More,
    /// This delivery completes the body.
    Final,
    /// The transport gave up on the request.
    Aborted,
}

/// One delivery of request data to a dynamic resource.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub method: Method,
    pub path: &'a str,
    pub data: &'a [u8],
    pub status: DataStatus,
}

/// One response fragment produced by a dynamic resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    pub body: Bytes,
    pub is_final_chunk: bool,
}

impl ResponseContext {
    pub fn chunk(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            is_final_chunk: false,
        }
    }

    pub fn last(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            is_final_chunk: true,
        }
    }

    pub fn empty_final() -> Self {
        Self::last(Bytes::new())
    }
}

/// Answers every delivery as it arrives. Never buffers.
pub trait ChunkHandler: Send + Sync {
    fn on_chunk(&self, request: &RequestContext<'_>) -> ResponseContext;
}

/// Ignores the body and answers once the body is complete.
pub trait FinalHandler: Send + Sync {
    fn on_final(&self, request: &RequestContext<'_>) -> Result<ResponseContext, ResourceError>;
}

/// Receives the fully accumulated body once.
pub trait PayloadHandler: Send + Sync {
    fn on_payload(
        &self,
        request: &RequestContext<'_>,
        payload: &[u8],
    ) -> Result<ResponseContext, ResourceError>;
}

/// Turns an accumulated body into a typed value.
pub trait PayloadDecoder: Send + Sync {
    type Output;

    fn decode(&self, payload: &[u8]) -> Result<Self::Output, ResourceError>;
}

/// Acts on a decoded value. Runs only from the finalizing step.
pub trait SideEffect<T>: Send + Sync {
    fn apply(&self, value: T) -> Result<ResponseContext, ResourceError>;
}

/// A [`PayloadHandler`] built from a decoder and a side effect.
pub struct Command<D, S> {
    decoder: D,
    effect: S,
}

impl<D, S> Command<D, S> {
    pub fn new(decoder: D, effect: S) -> Self {
        Self { decoder, effect }
    }
}

impl<D, S> PayloadHandler for Command<D, S>
where
    D: PayloadDecoder,
    S: SideEffect<D::Output>,
{
    fn on_payload(
        &self,
        _request: &RequestContext<'_>,
        payload: &[u8],
    ) -> Result<ResponseContext, ResourceError> {
        let value = self.decoder.decode(payload)?;
        self.effect.apply(value)
    }
}

/// How a dynamic resource treats the request body.
pub enum DynamicStrategy {
    /// Every delivery is answered immediately, finality mirrored.
    Passthrough(Box<dyn ChunkHandler>),
    /// Body ignored; one reply after `Final`.
    AwaitFinal(Box<dyn FinalHandler>),
    /// Body collected into a buffer of `capacity` bytes, handed over on `Final`.
    Accumulate {
        capacity: usize,
        handler: Box<dyn PayloadHandler>,
    },
}

impl DynamicStrategy {
    pub fn passthrough(handler: impl ChunkHandler + 'static) -> Self {
        DynamicStrategy::Passthrough(Box::new(handler))
    }

    pub fn await_final(handler: impl FinalHandler + 'static) -> Self {
        DynamicStrategy::AwaitFinal(Box::new(handler))
    }

    pub fn accumulate(capacity: usize, handler: impl PayloadHandler + 'static) -> Self {
        DynamicStrategy::Accumulate {
            capacity,
            handler: Box::new(handler),
        }
    }

    /// Accumulation capacity, for strategies that buffer.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            DynamicStrategy::Accumulate { capacity, .. } => Some(*capacity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Accumulating,
}

pub struct DynamicEngine {
    strategy: DynamicStrategy,
    buffer: AccumulationBuffer,
    state: EngineState,
    received: usize,
}

impl DynamicEngine {
    pub fn new(strategy: DynamicStrategy) -> Self {
        let capacity = strategy.capacity().unwrap_or(0);
        Self {
            strategy,
            buffer: AccumulationBuffer::with_capacity(capacity),
            state: EngineState::Idle,
            received: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Body bytes seen so far for the request in flight.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Runs one delivery through the state machine.
    ///
    /// `Ok(None)` means the delivery produced no fragment. Any error leaves
    /// the engine `Idle` with an empty buffer.
    pub fn invoke(
        &mut self,
        request: &RequestContext<'_>,
    ) -> Result<Option<ResponseContext>, ResourceError> {
        match request.status {
            DataStatus::Aborted => {
                self.abort(request);
                Ok(None)
            }
            DataStatus::More => self.ingest(request),
            DataStatus::Final => {
                let streamed = self.ingest(request)?;
                self.finalize(request, streamed)
            }
        }
    }

    fn ingest(
        &mut self,
        request: &RequestContext<'_>,
    ) -> Result<Option<ResponseContext>, ResourceError> {
        if self.state == EngineState::Idle {
            debug!(path = %request.path, method = %request.method, "request started");
            self.state = EngineState::Accumulating;
        }
        self.received += request.data.len();

        debug!(
            path = %request.path,
            len = request.data.len(),
            status = ?request.status,
            "data received"
        );

        match &self.strategy {
            DynamicStrategy::Passthrough(handler) => Ok(Some(handler.on_chunk(request))),
            DynamicStrategy::AwaitFinal(_) => Ok(None),
            DynamicStrategy::Accumulate { .. } => match self.buffer.try_append(request.data) {
                Ok(()) => Ok(None),
                Err(err) => {
                    warn!(path = %request.path, error = %err, "payload rejected");
                    self.buffer.reset();
                    self.state = EngineState::Idle;
                    self.received = 0;
                    Err(err)
                }
            },
        }
    }

    fn finalize(
        &mut self,
        request: &RequestContext<'_>,
        streamed: Option<ResponseContext>,
    ) -> Result<Option<ResponseContext>, ResourceError> {
        debug!(path = %request.path, total = self.received, "all data received");

        let outcome = match &self.strategy {
            DynamicStrategy::Passthrough(_) => Ok(streamed),
            DynamicStrategy::AwaitFinal(handler) => handler.on_final(request).map(Some),
            DynamicStrategy::Accumulate { handler, .. } => {
                handler.on_payload(request, self.buffer.as_slice()).map(Some)
            }
        };

        self.reset();

        if let Err(err) = &outcome {
            warn!(path = %request.path, error = %err, "request failed while finalizing");
        }
        outcome
    }

    fn abort(&mut self, request: &RequestContext<'_>) {
        if self.state == EngineState::Idle {
            debug!(path = %request.path, "abort with no request in flight");
            return;
        }
        debug!(
            path = %request.path,
            processed = self.received,
            "transaction aborted"
        );
        self.reset();
    }

    fn reset(&mut self) {
        self.buffer.reset();
        self.state = EngineState::Idle;
        self.received = 0;
    }
}

/// A dynamic resource: its engine plus response metadata.
pub struct DynamicResource {
    engine: Arc<Mutex<DynamicEngine>>,
    capacity: Option<usize>,
    content_type: Option<String>,
}

impl DynamicResource {
    pub fn new(strategy: DynamicStrategy) -> Self {
        let capacity = strategy.capacity();
        Self {
            engine: Arc::new(Mutex::new(DynamicEngine::new(strategy))),
            capacity,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Waits until no other request holds the engine.
    pub async fn acquire(&self) -> OwnedMutexGuard<DynamicEngine> {
        Arc::clone(&self.engine).lock_owned().await
    }
}
