//! Error types for the gateway engine.
//!
//! Mirrors the teacher's per-crate `thiserror` enum convention: one flat
//! enum per crate boundary, `Display` carrying enough detail for logs.

use thiserror::Error;

/// Errors raised resolving and executing a tool call (§4.7). The budgeter,
/// generator façade, and multi-segment streamer handle their own failure
/// modes as fallback content rather than through this enum.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A tool invocation could not be resolved to a known tool.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// A tool's arguments failed validation (missing/invalid field).
    #[error("invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    /// A resolved path escaped every allowed root.
    #[error("path outside allowed roots: {0}")]
    PathNotAllowed(String),

    /// Underlying filesystem I/O failure from a tool.
    #[error("filesystem error: {0}")]
    Io(String),
}

impl GatewayError {
    /// Renders this error as the `{"error": "..."}` JSON shape that tool
    /// results use to surface errors to the model (§4.7, §7) instead of a
    /// transport-level failure.
    pub fn to_tool_result(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}
