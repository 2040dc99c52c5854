//! # stream-event
//!
//! Wire-shape types for one streamed unit — an OpenAI-compatible SSE chunk
//! or an Ollama NDJSON record — and their line-framing. No transport
//! dependency: this crate knows nothing about HTTP, chunked encoding, or
//! sockets; `serve`'s stream engine writes these lines onto the wire.

pub mod ndjson;
pub mod sse;

pub use ndjson::{ndjson_line, GenerateRecord};
pub use sse::{
    sse_json_line, sse_line, ChatChunkChoice, ChatCompletionChunk, ChatDelta,
    TextChunkChoice, TextCompletionChunk, DONE_LINE,
};
