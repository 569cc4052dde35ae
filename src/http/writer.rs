use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, StatusCode};
use crate::resource::dynamic::ResponseContext;

const HTTP_VERSION: &str = "HTTP/1.1";

fn serialize_head(status: StatusCode, headers: &[(&str, &str)], buf: &mut Vec<u8>) {
    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");
}

pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body.len());

    let headers: Vec<(&str, &str)> = resp
        .headers
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    serialize_head(resp.status, &headers, &mut buf);

    buf.extend_from_slice(&resp.body);
    buf
}

/// Encodes one chunk of a `Transfer-Encoding: chunked` body.
///
/// An empty slice encodes the terminating chunk.
pub fn encode_chunk(data: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\r\n");
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    pub async fn write_to_stream<W: AsyncWrite + Unpin>(
        &mut self,
        stream: &mut W,
    ) -> anyhow::Result<()> {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}

/// How the body of a dynamic response is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Transfer-Encoding: chunked`. HTTP/1.1 clients only.
    Chunked,
    /// Raw bytes, ended by closing the connection. For HTTP/1.0 clients.
    UntilClose,
}

/// Writes the fragments of a dynamic response.
///
/// The `200` head goes out with the first fragment that carries bytes or
/// finishes the response. Until then the response is uncommitted and the
/// caller may still answer with an error status instead.
pub struct FragmentWriter {
    content_type: Option<String>,
    framing: Framing,
    keep_alive: bool,
    committed: bool,
    finished: bool,
}

impl FragmentWriter {
    pub fn new(content_type: Option<&str>, framing: Framing, keep_alive: bool) -> Self {
        Self {
            content_type: content_type.map(str::to_string),
            framing,
            keep_alive: keep_alive && framing == Framing::Chunked,
            committed: false,
            finished: false,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// False when the body is delimited by closing the connection.
    pub fn keeps_alive(&self) -> bool {
        self.keep_alive
    }

    /// Bytes to send for `fragment`, head included if not yet committed.
    pub fn encode(&mut self, fragment: &ResponseContext) -> Vec<u8> {
        let mut buf = Vec::new();

        if self.finished || (fragment.body.is_empty() && !fragment.is_final_chunk) {
            return buf;
        }

        if !self.committed {
            let mut headers = Vec::with_capacity(3);
            if self.framing == Framing::Chunked {
                headers.push(("Transfer-Encoding", "chunked"));
            }
            if let Some(ct) = self.content_type.as_deref() {
                headers.push(("Content-Type", ct));
            }
            if !self.keep_alive {
                headers.push(("Connection", "close"));
            }
            serialize_head(StatusCode::Ok, &headers, &mut buf);
            self.committed = true;
        }

        match self.framing {
            Framing::Chunked => {
                if !fragment.body.is_empty() {
                    encode_chunk(&fragment.body, &mut buf);
                }
                if fragment.is_final_chunk {
                    encode_chunk(&[], &mut buf);
                }
            }
            Framing::UntilClose => buf.extend_from_slice(&fragment.body),
        }

        self.finished = fragment.is_final_chunk;
        buf
    }

    pub async fn write_fragment<W: AsyncWrite + Unpin>(
        &mut self,
        stream: &mut W,
        fragment: &ResponseContext,
    ) -> anyhow::Result<()> {
        let bytes = self.encode(fragment);
        if !bytes.is_empty() {
            stream.write_all(&bytes).await?;
            stream.flush().await?;
        }
        Ok(())
    }

    /// Ends the response if no final fragment was written.
    pub async fn finish<W: AsyncWrite + Unpin>(&mut self, stream: &mut W) -> anyhow::Result<()> {
        self.write_fragment(stream, &ResponseContext::empty_final())
            .await
    }
}
