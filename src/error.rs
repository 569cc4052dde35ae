//! Error kinds for resource registration and request handling.
//!
//! Every [`ResourceError`] is scoped to one request. The connection that hit
//! it answers with [`ResourceError::status`] (or closes, if the response was
//! already under way) and keeps serving.

use thiserror::Error;

use crate::http::request::{Method, MethodSet};
use crate::http::response::StatusCode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("no resource registered for {path}")]
    NotFound { path: String },

    #[error("{method} not allowed on {path}")]
    MethodNotAllowed {
        path: String,
        method: Method,
        allowed: MethodSet,
    },

    #[error("payload of {attempted} bytes exceeds buffer capacity {capacity}")]
    PayloadTooLarge { capacity: usize, attempted: usize },

    #[error("payload decode failed: {0}")]
    DecodeFailure(String),

    #[error("side effect failed: {0}")]
    SideEffectFailure(String),

    #[error("bad upgrade request: {0}")]
    BadUpgrade(&'static str),

    #[error("resource busy")]
    Busy,

    #[error("request already finished")]
    RequestClosed,
}

impl ResourceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ResourceError::NotFound { .. } => StatusCode::NotFound,
            ResourceError::MethodNotAllowed { .. } => StatusCode::MethodNotAllowed,
            ResourceError::PayloadTooLarge { .. } => StatusCode::PayloadTooLarge,
            ResourceError::DecodeFailure(_) => StatusCode::BadRequest,
            ResourceError::SideEffectFailure(_) => StatusCode::InternalServerError,
            ResourceError::BadUpgrade(_) => StatusCode::BadRequest,
            ResourceError::Busy => StatusCode::ServiceUnavailable,
            ResourceError::RequestClosed => StatusCode::InternalServerError,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resource path must start with '/': {0:?}")]
    InvalidPath(String),

    #[error("resource {0} accepts no methods")]
    EmptyMethodSet(String),

    #[error("resource {path}: buffer capacity {capacity} outside 1..={max}")]
    InvalidCapacity {
        path: String,
        capacity: usize,
        max: usize,
    },
}
