//! lumen - resource dispatch core of a small embedded HTTP server
//!
//! A fixed table of path-addressed resources (static blobs, streamed
//! dynamic handlers, protocol upgrades) served over HTTP/1.1, with request
//! bodies delivered to dynamic resources in bounded pieces.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod http;
pub mod resource;
pub mod server;
pub mod site;
