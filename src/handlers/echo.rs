use std::fmt::Write;

use bytes::Bytes;
use tracing::debug;

use crate::resource::dynamic::{ChunkHandler, DataStatus, RequestContext, ResponseContext};

/// Longest prefix of a delivery shown in debug logs.
const PREVIEW_LEN: usize = 32;

/// Sends every delivery straight back, finality mirrored.
#[derive(Debug, Default, Clone, Copy)]
pub struct Echo;

impl ChunkHandler for Echo {
    fn on_chunk(&self, request: &RequestContext<'_>) -> ResponseContext {
        debug!(
            method = %request.method,
            len = request.data.len(),
            preview = %hex_preview(request.data),
            "echo received"
        );

        ResponseContext {
            body: Bytes::copy_from_slice(request.data),
            is_final_chunk: request.status == DataStatus::Final,
        }
    }
}

fn hex_preview(data: &[u8]) -> String {
    let mut out = String::with_capacity(PREVIEW_LEN * 3);
    for (i, b) in data.iter().take(PREVIEW_LEN).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", b);
    }
    if data.len() > PREVIEW_LEN {
        out.push_str(" ..");
    }
    out
}
