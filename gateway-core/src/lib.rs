//! # gateway-core
//!
//! The request-processing engine behind the local model HTTP gateway: the
//! wire-independent data model, the context budgeter, the generator façade,
//! the multi-segment long-form streamer, the tool-call orchestrator, and the
//! built-in sandboxed file-operation `ToolExecutor`.
//!
//! This crate has no transport dependency — it knows nothing about sockets,
//! HTTP, SSE, or NDJSON. `serve` drives it: decoding wire requests into the
//! types here, calling [`budget::build_prompt`], [`segment::run_multi_segment`]
//! or [`orchestrator::run_tool_orchestration`], and encoding the results back
//! onto the wire.
//!
//! ## Modules
//!
//! - [`message`]: [`message::ChatMessage`], [`message::MessageContent`] — the
//!   polymorphic `content` flattening.
//! - [`model`]: request/response data model — [`model::ChatRequest`],
//!   [`model::ChatResponse`], [`model::ToolChoice`], [`model::ModelInfo`].
//! - [`generator`]: the [`generator::Generator`] façade trait and its
//!   graceful-fallback wrapper.
//! - [`budget`]: the context budgeter — [`budget::build_prompt`].
//! - [`segment`]: the multi-segment long-form generator —
//!   [`segment::run_multi_segment`].
//! - [`orchestrator`]: the tool-call round-trip state machine —
//!   [`orchestrator::run_tool_orchestration`].
//! - [`tools`]: the built-in [`tools::ToolExecutor`] and file-operation tool
//!   catalog.
//! - [`error`]: [`error::GatewayError`].

pub mod budget;
pub mod error;
pub mod generator;
pub mod message;
pub mod model;
pub mod orchestrator;
pub mod segment;
pub mod tools;

pub use error::GatewayError;
pub use generator::{generate_or_fallback, Generator, MockGenerator};
pub use message::{ChatMessage, ContentPart, MessageContent, Role};
pub use model::{
    new_response_id, unix_now, ChatChoice, ChatRequest, ChatResponse, CompletionChoice,
    CompletionRequest, CompletionResponse, ModelInfo, ToolCallBody, ToolCallEnvelope, ToolChoice,
    ToolDefinition, MODEL_ID,
};
pub use orchestrator::{run_tool_orchestration, OrchestrationOutcome};
pub use segment::{run_multi_segment, SegmentSink, MAX_SEGMENTS, SEGMENT_CHARS};
pub use tools::{BuiltinToolExecutor, PathPolicy, ToolCatalogEntry, ToolExecutor, TOOL_CATALOG};
