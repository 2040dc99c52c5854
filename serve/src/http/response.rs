//! Response serialization and chunked-transfer framing (§4.1 "Response
//! serialization", §4.4, §6.2).

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A fully-materialized response body, as opposed to a streaming driver
/// (§3 `Response`: "body bytes OR stream-driver callback").
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, serde_json::to_vec(value).unwrap_or_default())
            .with_header("Content-Type", "application/json")
    }

    pub fn plain(status: u16, text: impl Into<String>) -> Self {
        Self::new(status, text.into().into_bytes()).with_header("Content-Type", "text/plain")
    }

    pub fn no_content(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    /// Empties the body while keeping headers, for HEAD mirrors of GET (§4.2).
    pub fn without_body(mut self) -> Self {
        self.body.clear();
        self
    }
}

/// Recognized reason phrases (§4.1); anything else defaults to `"OK"`.
fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        _ => "OK",
    }
}

/// Serializes `response` as a complete HTTP/1.1 message: status line,
/// `Content-Length`, any extra headers, blank line, body (§4.1).
pub fn serialize(response: &Response) -> Vec<u8> {
    let mut out = Vec::with_capacity(response.body.len() + 256);
    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            response.status,
            reason_phrase(response.status)
        )
        .as_bytes(),
    );
    out.extend_from_slice(format!("Content-Length: {}\r\n", response.body.len()).as_bytes());
    for (name, value) in &response.headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(b"Access-Control-Allow-Origin: *\r\n");
    out.extend_from_slice(b"Connection: close\r\n");
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&response.body);
    out
}

/// Writes just the status line + headers for a streaming response (no
/// `Content-Length` — the body is chunked), leaving the socket positioned
/// for the first chunk (§4.4, §6.2).
pub async fn write_stream_headers<W: AsyncWrite + Unpin>(
    writer: &mut W,
    status: u16,
    content_type: &str,
    extra_headers: &[(&str, &str)],
) -> std::io::Result<()> {
    let mut head = format!("HTTP/1.1 {} {}\r\n", status, reason_phrase(status));
    head.push_str(&format!("Content-Type: {content_type}\r\n"));
    head.push_str("Transfer-Encoding: chunked\r\n");
    head.push_str("Cache-Control: no-cache\r\n");
    head.push_str("Access-Control-Allow-Origin: *\r\n");
    head.push_str("Connection: close\r\n");
    for (name, value) in extra_headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");
    writer.write_all(head.as_bytes()).await
}

/// Writes one chunk: lowercase-hex size line, the bytes, then a trailing
/// CRLF (§6.2 "Chunk size line is lowercase hex + CRLF; body + CRLF").
pub async fn write_chunk<W: AsyncWrite + Unpin>(writer: &mut W, data: &[u8]) -> std::io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    writer.write_all(format!("{:x}\r\n", data.len()).as_bytes()).await?;
    writer.write_all(data).await?;
    writer.write_all(b"\r\n").await
}

/// Writes the terminating zero-size chunk (§3 invariant: "the last bytes
/// are `0\r\n\r\n`").
pub async fn write_terminal_chunk<W: AsyncWrite + Unpin>(writer: &mut W) -> std::io::Result<()> {
    writer.write_all(b"0\r\n\r\n").await
}
