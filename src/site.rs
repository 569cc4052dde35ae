//! The device's resource table.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::RegistryError;
use crate::handlers::led::{LED_PAYLOAD_CAPACITY, LedControl, LedDriver};
use crate::handlers::{Echo, EchoSession, Uptime};
use crate::http::request::{Method, MethodSet};
use crate::resource::dynamic::{DynamicResource, DynamicStrategy};
use crate::resource::registry::{ResourceKind, ResourceRegistry};
use crate::resource::static_file::StaticResource;
use crate::resource::upgrade::UpgradeResource;

static INDEX_HTML_GZ: &[u8] = include_bytes!("../assets/index.html.gz");
static MAIN_JS_GZ: &[u8] = include_bytes!("../assets/main.js.gz");

/// Scratch buffer of the `/ws_echo` session.
pub const WS_ECHO_SCRATCH: usize = 1024;

const GET: MethodSet = MethodSet::of(&[Method::GET]);
const POST: MethodSet = MethodSet::of(&[Method::POST]);
const GET_POST: MethodSet = MethodSet::of(&[Method::GET, Method::POST]);

pub fn resource_table(led_driver: Arc<dyn LedDriver>) -> Result<ResourceRegistry, RegistryError> {
    let registry = ResourceRegistry::builder()
        .register(
            "/",
            GET,
            ResourceKind::Static(
                StaticResource::new(Bytes::from_static(INDEX_HTML_GZ), "text/html")
                    .with_encoding("gzip"),
            ),
        )?
        .register(
            "/main.js",
            GET,
            ResourceKind::Static(
                StaticResource::new(Bytes::from_static(MAIN_JS_GZ), "text/javascript")
                    .with_encoding("gzip"),
            ),
        )?
        .register(
            "/dynamic",
            GET_POST,
            ResourceKind::Dynamic(DynamicResource::new(DynamicStrategy::passthrough(Echo))),
        )?
        .register(
            "/uptime",
            GET,
            ResourceKind::Dynamic(
                DynamicResource::new(DynamicStrategy::await_final(Uptime::new()))
                    .with_content_type("text/plain"),
            ),
        )?
        .register(
            "/led",
            POST,
            ResourceKind::Dynamic(DynamicResource::new(DynamicStrategy::accumulate(
                LED_PAYLOAD_CAPACITY,
                LedControl::with_driver(led_driver),
            ))),
        )?
        .register(
            "/ws_echo",
            GET,
            ResourceKind::Upgrade(UpgradeResource::new(EchoSession, WS_ECHO_SCRATCH)),
        )?
        .build();

    Ok(registry)
}
