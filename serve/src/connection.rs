//! Per-connection task (§4.1, §5): one TCP stream handled end to end by a
//! single task, which is also the one writer for that socket (§5
//! "single-writer serializer").

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::http::{response::serialize, ConnectionBuffer, Response};
use crate::router::{dispatch, Outcome, StreamJob};
use crate::state::AppState;
use crate::stream::{stream_chat_completion, stream_ollama_generate, stream_text_completion, Emitter};

/// Reads until one complete request is parsed (or the peer closes early),
/// dispatches it, and writes the response. No keep-alive: the socket is
/// closed after the first exchange regardless of outcome.
pub async fn handle_connection(mut socket: TcpStream, state: AppState) {
    let mut conn = ConnectionBuffer::new();
    let mut read_buf = [0u8; 8192];

    let request = loop {
        match conn.try_parse_request() {
            Ok(Some(request)) => break Some(request),
            Ok(None) => {}
            Err(e) => {
                let response = e.into_response();
                let _ = tokio::io::AsyncWriteExt::write_all(&mut socket, &serialize(&response)).await;
                return;
            }
        }

        match socket.read(&mut read_buf).await {
            Ok(0) => break None,
            Ok(n) => conn.feed(&read_buf[..n]),
            Err(e) => {
                tracing::warn!(error = %e, "connection read failed");
                return;
            }
        }
    };

    let Some(request) = request else {
        return;
    };

    log_request(&request, &state);

    match dispatch(&request, &state).await {
        Ok(Outcome::Response(response)) => {
            let _ = tokio::io::AsyncWriteExt::write_all(&mut socket, &serialize(&response)).await;
        }
        Ok(Outcome::Stream(job)) => {
            if let Err(e) = drive_stream(job, socket, &state).await {
                tracing::warn!(error = %e, "stream write failed");
            }
        }
        Err(e) => {
            let response: Response = e.into_response();
            let _ = tokio::io::AsyncWriteExt::write_all(&mut socket, &serialize(&response)).await;
        }
    }
}

const BODY_LOG_TRUNCATE_AT: usize = 2000;

/// Logs the request line and a body preview (§B "Logging"): bodies over
/// 2000 chars are truncated unless full logging is requested. `PI_DEBUG_FULL_LOG`
/// is authoritative when set; otherwise the persisted `debugFullRequestLog`
/// setting applies (SPEC_FULL §C: "env wins when both are set").
fn log_request(request: &crate::http::Request, state: &AppState) {
    let full = match std::env::var("PI_DEBUG_FULL_LOG") {
        Ok(v) => v == "1",
        Err(_) => state.settings().debug_full_request_log,
    };
    let preview = match request.body_utf8() {
        Some(text) if !full && text.chars().count() > BODY_LOG_TRUNCATE_AT => {
            let head: String = text.chars().take(BODY_LOG_TRUNCATE_AT).collect();
            let remaining = text.chars().count() - BODY_LOG_TRUNCATE_AT;
            format!("{head}... ({remaining} bytes truncated)")
        }
        Some(text) => text.to_string(),
        None => format!("<{} binary bytes>", request.body.len()),
    };
    tracing::debug!(method = %request.method, path = %request.path, body = %preview, "request received");
}

async fn drive_stream(job: StreamJob, socket: TcpStream, state: &AppState) -> std::io::Result<()> {
    let emitter = Emitter::new(socket);
    match job {
        StreamJob::ChatCompletion(request) => {
            stream_chat_completion(emitter, state.generator.as_ref(), &request).await
        }
        StreamJob::TextCompletion(request) => {
            stream_text_completion(emitter, state.generator.as_ref(), &request).await
        }
        StreamJob::OllamaGenerate(request) => {
            let created_at = chrono::Utc::now().to_rfc3339();
            stream_ollama_generate(emitter, state.generator.as_ref(), &request, &created_at).await
        }
    }
}
