//! Built-in tool catalog and executor (§4.7, §6.4).
//!
//! The orchestrator calls through [`ToolExecutor`]; [`BuiltinToolExecutor`]
//! is the fixed, always-available implementation backing the file-operation
//! tool names the synthetic system message advertises.

mod check_path;
mod copy_file;
mod create_directory;
mod delete_file;
mod edit_file;
mod list_directory;
mod move_file;
pub mod path;
mod read_file;
mod write_file;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayError;
pub use path::PathPolicy;

/// One entry in the tool catalog advertised to the model (§4.7 step 1).
#[derive(Debug, Clone, Copy)]
pub struct ToolCatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
}

/// The fixed built-in tool catalog (§4.7, §6.4).
pub const TOOL_CATALOG: &[ToolCatalogEntry] = &[
    ToolCatalogEntry {
        name: "read_file",
        description: "Read a file. Args: path (required), max_bytes (optional, default 1 MiB).",
    },
    ToolCatalogEntry {
        name: "write_file",
        description: "Write text content to a file, creating parent directories as needed. Args: path, content (both required).",
    },
    ToolCatalogEntry {
        name: "edit_file",
        description: "Replace text in a file. Args: path, new_text (required), and either old_text or line_number.",
    },
    ToolCatalogEntry {
        name: "delete_file",
        description: "Delete a file or directory. Args: path (required), recursive (optional, for non-empty directories).",
    },
    ToolCatalogEntry {
        name: "move_file",
        description: "Move or rename a file. Args: source_path, destination_path (both required).",
    },
    ToolCatalogEntry {
        name: "copy_file",
        description: "Copy a file. Args: source_path, destination_path (both required).",
    },
    ToolCatalogEntry {
        name: "list_directory",
        description: "List directory entries. Args: path (required), recursive, include_hidden (optional).",
    },
    ToolCatalogEntry {
        name: "create_directory",
        description: "Create a directory, including missing parents. Args: path (required).",
    },
    ToolCatalogEntry {
        name: "check_path",
        description: "Report whether a path exists and whether it's a file or directory. Args: path (required).",
    },
];

/// A pluggable component keyed by tool name (§6.4). Errors surface inside
/// the returned JSON as `{"error": ...}`, never as a transport failure.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, name: &str, arguments: &Value) -> Value;

    /// The catalog this executor advertises, used both by the orchestrator's
    /// synthetic system message and by `GET /debug/tools`.
    fn catalog(&self) -> &[ToolCatalogEntry] {
        TOOL_CATALOG
    }
}

/// The fixed file-operation tool set (§6.4), sandboxed by a [`PathPolicy`].
pub struct BuiltinToolExecutor {
    policy: PathPolicy,
}

impl BuiltinToolExecutor {
    pub fn new(policy: PathPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl ToolExecutor for BuiltinToolExecutor {
    async fn execute(&self, name: &str, arguments: &Value) -> Value {
        let result: Result<Value, GatewayError> = match name {
            "read_file" => read_file::read_file(&self.policy, arguments),
            "write_file" => write_file::write_file(&self.policy, arguments),
            "edit_file" => edit_file::edit_file(&self.policy, arguments),
            "delete_file" => delete_file::delete_file(&self.policy, arguments),
            "move_file" => move_file::move_file(&self.policy, arguments),
            "copy_file" => copy_file::copy_file(&self.policy, arguments),
            "list_directory" => list_directory::list_directory(&self.policy, arguments),
            "create_directory" => create_directory::create_directory(&self.policy, arguments),
            "check_path" => check_path::check_path(&self.policy, arguments),
            other => Err(GatewayError::ToolNotFound(other.to_string())),
        };
        match result {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool execution failed");
                e.to_tool_result()
            }
        }
    }
}
