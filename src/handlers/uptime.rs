use std::time::Instant;

use crate::error::ResourceError;
use crate::resource::dynamic::{FinalHandler, RequestContext, ResponseContext};

/// Milliseconds since the resource was created, as decimal text.
///
/// Any request body is ignored, but nothing is sent until the body is
/// complete.
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started: Instant,
}

impl Uptime {
    pub fn new() -> Self {
        Self::since(Instant::now())
    }

    pub fn since(started: Instant) -> Self {
        Self { started }
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

impl FinalHandler for Uptime {
    fn on_final(&self, _request: &RequestContext<'_>) -> Result<ResponseContext, ResourceError> {
        let millis = self.started.elapsed().as_millis();
        Ok(ResponseContext::last(millis.to_string()))
    }
}
