//! HTTP transport for the resource table.
//!
//! This layer turns socket reads into request heads and body deliveries for
//! the dispatcher, and turns the fragments resources produce back into
//! HTTP/1.1 responses.
//!
//! - **`connection`**: Per-connection state machine
//! - **`parser`**: Parses request heads from byte buffers
//! - **`request`**: Methods, method sets and the request head
//! - **`response`**: Status codes and full responses
//! - **`writer`**: Serializes full responses and chunked fragments
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a request head
//!        └──────┬──────┘
//!               │ Head parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Route; stream the body into a dynamic
//!        └──────┬───────────┘   resource, writing fragments as they come
//!               │
//!               ├─ Static / error reply → Writing
//!               ├─ Upgrade accepted → Upgrading (connection handed off)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send a complete response
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
