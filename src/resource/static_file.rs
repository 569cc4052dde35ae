use bytes::Bytes;

use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::resource::dynamic::ResponseContext;

/// A precomputed body with fixed metadata, served in one fragment.
#[derive(Debug, Clone)]
pub struct StaticResource {
    body: Bytes,
    content_type: String,
    content_encoding: Option<String>,
}

impl StaticResource {
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
            content_encoding: None,
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(encoding.into());
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    /// The whole blob as a single final fragment.
    pub fn serve(&self) -> StaticReply {
        StaticReply {
            fragment: ResponseContext::last(self.body.clone()),
            content_type: self.content_type.clone(),
            content_encoding: self.content_encoding.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticReply {
    pub fragment: ResponseContext,
    pub content_type: String,
    pub content_encoding: Option<String>,
}

impl StaticReply {
    pub fn into_response(self) -> Response {
        let mut builder = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", self.content_type)
            .body(self.fragment.body);

        if let Some(encoding) = self.content_encoding {
            builder = builder.header("Content-Encoding", encoding);
        }

        builder.build()
    }
}
