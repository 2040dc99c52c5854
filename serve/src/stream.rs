//! Stream Engine (§4.4): SSE and NDJSON emitters layered on chunked
//! transfer-encoding, serialized through a single writer per connection.

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use gateway_core::{
    generate_or_fallback, run_multi_segment, unix_now, ChatMessage, ChatRequest, CompletionRequest,
    Generator, SegmentSink,
};
use stream_event::{
    ndjson_line, sse_json_line, ChatCompletionChunk, GenerateRecord, TextCompletionChunk, DONE_LINE,
};

use crate::http::response::{write_chunk, write_stream_headers};

/// Fixed-size character window used to chunk a single-shot generation into
/// stream events (§4.4 "Chunk sizing for non-multi-segment streaming").
const WINDOW_CHARS: usize = 64;

/// Splits `text` into windows of at most `window` characters each. Returns
/// an empty vec for empty text (no empty deltas are emitted).
fn split_into_windows(text: &str, window: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(window)
        .map(|c| c.iter().collect::<String>())
        .collect()
}

/// Owns the socket for the duration of one stream (§3 Ownership, §5
/// "single-writer serializer"): every write funnels through these methods,
/// which are only ever called sequentially from the one connection task
/// driving the stream, so no additional locking is needed.
pub struct Emitter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> Emitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn write_headers(
        &mut self,
        status: u16,
        content_type: &str,
        extra_headers: &[(&str, &str)],
    ) -> std::io::Result<()> {
        write_stream_headers(&mut self.writer, status, content_type, extra_headers).await
    }

    /// `emitSSE(raw)` (§4.4): writes `"data: " + raw + "\n\n"` as one chunk.
    pub async fn emit_sse_raw(&mut self, raw: &str) -> std::io::Result<()> {
        write_chunk(&mut self.writer, format!("data: {raw}\n\n").as_bytes()).await
    }

    /// `emitSSE(json)` (§4.4): serializes then frames as one SSE chunk.
    pub async fn emit_sse<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        let line = sse_json_line(value).unwrap_or_default();
        write_chunk(&mut self.writer, line.as_bytes()).await
    }

    /// `emitNDJSON(json)` (§4.4): serializes, appends `\n`, flushes as one chunk.
    pub async fn emit_ndjson<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        let line = ndjson_line(value).unwrap_or_default();
        write_chunk(&mut self.writer, line.as_bytes()).await
    }

    pub async fn emit_done_sentinel(&mut self) -> std::io::Result<()> {
        write_chunk(&mut self.writer, DONE_LINE.as_bytes()).await
    }

    /// Writes the terminating zero-size chunk (§3 invariant) and flushes.
    pub async fn finish(mut self) -> std::io::Result<()> {
        crate::http::response::write_terminal_chunk(&mut self.writer).await?;
        self.writer.flush().await
    }
}

/// Bridges the multi-segment streamer's [`SegmentSink`] to one chat-delta SSE
/// event per segment (§4.6 "emitting each round as one segment").
struct ChatDeltaSink<'a, W> {
    emitter: &'a mut Emitter<W>,
    id: String,
    created: u64,
    model: String,
}

#[async_trait]
impl<'a, W: AsyncWrite + Unpin + Send> SegmentSink for ChatDeltaSink<'a, W> {
    async fn emit_segment(&mut self, text: &str) {
        let chunk = ChatCompletionChunk::delta(&self.id, self.created, &self.model, text);
        if let Err(e) = self.emitter.emit_sse(&chunk).await {
            tracing::warn!(error = %e, "failed to write chat delta, peer likely closed");
        }
    }
}

/// Drives one streaming chat completion (§4.4 "SSE for chat.completions
/// streaming", §4.6). Only called for requests with no tools attached — the
/// router forces non-streaming whenever tools are present (§9 REDESIGN FLAG).
pub async fn stream_chat_completion<W: AsyncWrite + Unpin + Send>(
    mut emitter: Emitter<W>,
    generator: &dyn Generator,
    request: &ChatRequest,
) -> std::io::Result<()> {
    emitter
        .write_headers(200, "text/event-stream", &[])
        .await?;

    let id = gateway_core::new_response_id("chatcmpl-");
    let created = unix_now();
    let model = request.model.clone();

    if request.multi_segment {
        let mut sink = ChatDeltaSink {
            emitter: &mut emitter,
            id: id.clone(),
            created,
            model: model.clone(),
        };
        let prompt = gateway_core::budget::build_prompt(generator, &request.messages).await;
        run_multi_segment(generator, &prompt, &mut sink).await;
    } else {
        let prompt = gateway_core::budget::build_prompt(generator, &request.messages).await;
        let text = generate_or_fallback(generator, "Respond to the conversation above.", &prompt).await;
        for window in split_into_windows(&text, WINDOW_CHARS) {
            let chunk = ChatCompletionChunk::delta(&id, created, &model, window);
            emitter.emit_sse(&chunk).await?;
        }
    }

    let terminal = ChatCompletionChunk::terminal(&id, created, &model);
    emitter.emit_sse(&terminal).await?;
    emitter.emit_done_sentinel().await?;
    emitter.finish().await
}

/// Drives one streaming text completion (§4.4 "SSE for text completions
/// streaming"). Completions have no multi-segment mode — one bounded
/// generation, split into fixed-size windows.
pub async fn stream_text_completion<W: AsyncWrite + Unpin + Send>(
    mut emitter: Emitter<W>,
    generator: &dyn Generator,
    request: &CompletionRequest,
) -> std::io::Result<()> {
    emitter
        .write_headers(200, "text/event-stream", &[])
        .await?;

    let id = gateway_core::new_response_id("cmpl-");
    let created = unix_now();

    let prompt_messages = vec![ChatMessage::new(gateway_core::message::Role::User, &request.prompt)];
    let prompt = gateway_core::budget::build_prompt(generator, &prompt_messages).await;
    let text = generate_or_fallback(generator, "Complete the prompt above.", &prompt).await;

    for window in split_into_windows(&text, WINDOW_CHARS) {
        let chunk = TextCompletionChunk::delta(&id, created, &request.model, window);
        emitter.emit_sse(&chunk).await?;
    }

    emitter.emit_done_sentinel().await?;
    emitter.finish().await
}

/// Drives one streaming Ollama generate response (§4.3 "Ollama generate",
/// §4.4). Closed by a final `{done:true}` record with no `response` field.
pub async fn stream_ollama_generate<W: AsyncWrite + Unpin + Send>(
    mut emitter: Emitter<W>,
    generator: &dyn Generator,
    request: &CompletionRequest,
    created_at: &str,
) -> std::io::Result<()> {
    emitter
        .write_headers(200, "application/x-ndjson", &[])
        .await?;

    let prompt_messages = vec![ChatMessage::new(gateway_core::message::Role::User, &request.prompt)];
    let prompt = gateway_core::budget::build_prompt(generator, &prompt_messages).await;
    let text = generate_or_fallback(generator, "Complete the prompt above.", &prompt).await;

    for window in split_into_windows(&text, WINDOW_CHARS) {
        let record = GenerateRecord::chunk(&request.model, created_at, window);
        emitter.emit_ndjson(&record).await?;
    }

    let done = GenerateRecord::done(&request.model, created_at);
    emitter.emit_ndjson(&done).await?;
    emitter.finish().await
}
