//! Resource table and the three handling strategies.
//!
//! - **`registry`**: path to descriptor lookup, built once at startup
//! - **`static_file`**: precomputed blobs with fixed metadata
//! - **`dynamic`**: the streaming engine for callback-driven resources
//! - **`buffer`**: the bounded accumulation buffer used by the engine
//! - **`upgrade`**: handoff of a connection to another protocol

pub mod buffer;
pub mod dynamic;
pub mod registry;
pub mod static_file;
pub mod upgrade;

pub use buffer::AccumulationBuffer;
pub use dynamic::{
    DataStatus, DynamicEngine, DynamicResource, DynamicStrategy, EngineState, RequestContext,
    ResponseContext,
};
pub use registry::{ResourceDescriptor, ResourceKind, ResourceRegistry};
pub use static_file::StaticResource;
pub use upgrade::UpgradeResource;
