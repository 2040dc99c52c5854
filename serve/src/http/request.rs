//! Connection Reader & HTTP Codec, request side (§4.1).
//!
//! [`ConnectionBuffer`] owns the growing byte buffer for one connection.
//! Each time more bytes arrive, [`ConnectionBuffer::try_parse_request`]
//! looks for a complete request; `Ok(None)` means "keep reading," `Err`
//! means the connection should be answered with an error and closed.

use std::collections::HashMap;

use crate::error::HttpError;

/// Sanity limit on total request size (head + body) before we give up and
/// answer 413 (§4.1 "recommended 64 MiB").
const MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// One parsed HTTP request. Headers are lowercase-keyed (§4.1 "lowercase
/// the key").
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub version: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    /// `body` decoded as UTF-8, if it happens to be valid text.
    pub fn body_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Accumulates bytes for one connection and extracts complete requests
/// (§4.1 algorithm).
#[derive(Debug, Default)]
pub struct ConnectionBuffer {
    buf: Vec<u8>,
}

impl ConnectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Looks for one complete request at the front of the buffer. Returns
    /// `Ok(None)` when more bytes are needed, `Ok(Some(request))` with the
    /// consumed bytes dropped, or `Err` for a malformed head / oversized
    /// body.
    pub fn try_parse_request(&mut self) -> Result<Option<Request>, HttpError> {
        let Some(head_end) = find_crlf_crlf(&self.buf) else {
            if self.buf.len() > MAX_REQUEST_BYTES {
                return Err(HttpError::PayloadTooLarge);
            }
            return Ok(None);
        };

        let head = &self.buf[..head_end];
        let body_start = head_end + 4;

        let head_str = String::from_utf8_lossy(head);
        let mut lines = head_str.split("\r\n");
        let request_line = lines.next().unwrap_or("");
        let mut tokens = request_line.split_whitespace();
        let method = tokens.next();
        let path = tokens.next();
        let version = tokens.next().unwrap_or("HTTP/1.1").to_string();
        let (Some(method), Some(path)) = (method, path) else {
            return Err(HttpError::MalformedRequest(format!(
                "bad request line: {request_line:?}"
            )));
        };

        let mut headers = HashMap::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        let content_length = headers
            .get("content-length")
            .and_then(|v| v.trim().parse::<usize>().ok());

        let (body, consumed) = match content_length {
            Some(len) => {
                if body_start.saturating_add(len) > MAX_REQUEST_BYTES {
                    return Err(HttpError::PayloadTooLarge);
                }
                if self.buf.len() < body_start + len {
                    return Ok(None);
                }
                (self.buf[body_start..body_start + len].to_vec(), body_start + len)
            }
            // No declared length: assume a zero-length body (GET/HEAD/OPTIONS
            // have none) rather than swallowing whatever happens to already
            // be buffered after the head, which could be the start of the
            // next pipelined request.
            None => (Vec::new(), body_start),
        };

        let request = Request {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            version,
            headers,
            body,
        };

        self.buf.drain(..consumed);
        Ok(Some(request))
    }
}

fn find_crlf_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_head_returns_none() {
        let mut conn = ConnectionBuffer::new();
        conn.feed(b"GET / HTTP/1.1\r\nHost: x");
        assert!(conn.try_parse_request().unwrap().is_none());
    }

    #[test]
    fn parses_a_simple_get_with_no_body() {
        let mut conn = ConnectionBuffer::new();
        conn.feed(b"GET /v1/models HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let req = conn.try_parse_request().unwrap().unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/v1/models");
        assert_eq!(req.header("host"), Some("localhost"));
        assert!(req.body.is_empty());
        assert!(conn.is_empty());
    }

    #[test]
    fn header_keys_are_lowercased() {
        let mut conn = ConnectionBuffer::new();
        conn.feed(b"GET / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n");
        let req = conn.try_parse_request().unwrap().unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn blocks_until_content_length_bytes_are_buffered() {
        let mut conn = ConnectionBuffer::new();
        conn.feed(b"POST /v1/chat/completions HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel");
        assert!(conn.try_parse_request().unwrap().is_none());
        conn.feed(b"lo");
        let req = conn.try_parse_request().unwrap().unwrap();
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn malformed_request_line_is_rejected() {
        let mut conn = ConnectionBuffer::new();
        conn.feed(b"justsometoken\r\n\r\n");
        assert!(matches!(
            conn.try_parse_request(),
            Err(HttpError::MalformedRequest(_))
        ));
    }

    #[test]
    fn pipelined_bytes_after_one_request_are_kept_for_the_next_parse() {
        let mut conn = ConnectionBuffer::new();
        conn.feed(b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n");
        let first = conn.try_parse_request().unwrap().unwrap();
        assert_eq!(first.path, "/a");
        let second = conn.try_parse_request().unwrap().unwrap();
        assert_eq!(second.path, "/b");
    }
}
