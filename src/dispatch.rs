//! Request dispatch.
//!
//! [`Dispatcher::route`] matches a request head against the registry and
//! prepares the matched provider. For dynamic resources that yields a
//! [`DynamicCycle`], which the transport feeds with body deliveries until
//! the request finishes.

use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::error::ResourceError;
use crate::http::request::{Method, RequestHead};
use crate::resource::dynamic::{DataStatus, DynamicEngine, RequestContext, ResponseContext};
use crate::resource::registry::{ResourceKind, ResourceRegistry};
use crate::resource::static_file::StaticReply;
use crate::resource::upgrade::Handoff;

pub enum Route {
    Static(StaticReply),
    Dynamic(DynamicCycle),
    Upgrade(Handoff),
}

pub struct Dispatcher {
    registry: Arc<ResourceRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Resolves the request and readies its provider.
    ///
    /// For a dynamic resource this waits until no other request holds the
    /// resource's engine.
    pub async fn route(&self, head: &RequestHead) -> Result<Route, ResourceError> {
        let path = head.path();
        let descriptor = self.registry.resolve(path, head.method)?;

        debug!(
            path = %path,
            method = %head.method,
            kind = descriptor.kind.name(),
            "resource matched"
        );

        match &descriptor.kind {
            ResourceKind::Static(res) => Ok(Route::Static(res.serve())),
            ResourceKind::Dynamic(res) => {
                let engine = res.acquire().await;
                Ok(Route::Dynamic(DynamicCycle::new(
                    engine,
                    head.method,
                    path,
                    res.content_type(),
                )))
            }
            ResourceKind::Upgrade(res) => {
                if !head.wants_upgrade() {
                    return Err(ResourceError::BadUpgrade("missing upgrade handshake"));
                }
                res.handshake(head).map(Route::Upgrade)
            }
        }
    }
}

/// One request's exclusive session with a dynamic resource.
///
/// Holds the resource's engine until dropped. A cycle that is dropped
/// before the request finished delivers `Aborted`, so the engine is always
/// left `Idle`.
pub struct DynamicCycle {
    engine: OwnedMutexGuard<DynamicEngine>,
    method: Method,
    path: String,
    content_type: Option<String>,
    finished: bool,
}

impl DynamicCycle {
    pub fn new(
        engine: OwnedMutexGuard<DynamicEngine>,
        method: Method,
        path: &str,
        content_type: Option<&str>,
    ) -> Self {
        Self {
            engine,
            method,
            path: path.to_string(),
            content_type: content_type.map(str::to_string),
            finished: false,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn engine(&self) -> &DynamicEngine {
        &self.engine
    }

    /// Hands one delivery to the engine.
    ///
    /// The request finishes on `Final`, `Aborted` or the first error; any
    /// delivery after that is refused with [`ResourceError::RequestClosed`].
    pub fn deliver(
        &mut self,
        status: DataStatus,
        data: &[u8],
    ) -> Result<Option<ResponseContext>, ResourceError> {
        if self.finished {
            return Err(ResourceError::RequestClosed);
        }

        let request = RequestContext {
            method: self.method,
            path: &self.path,
            data,
            status,
        };
        let outcome = self.engine.invoke(&request);

        if status != DataStatus::More || outcome.is_err() {
            self.finished = true;
        }
        outcome
    }

    pub fn abort(mut self) {
        let _ = self.deliver(DataStatus::Aborted, &[]);
    }
}

impl Drop for DynamicCycle {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.deliver(DataStatus::Aborted, &[]);
        }
    }
}
