//! `move_file` tool (§6.4): renames/moves a file or directory, both
//! endpoints validated against the sandbox independently.

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

pub fn move_file(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let source_param = args
        .get("source_path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing source_path".to_string()))?;
    let dest_param = args
        .get("destination_path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            GatewayError::InvalidToolArguments("missing destination_path".to_string())
        })?;

    let source = policy
        .resolve(source_param)
        .map_err(GatewayError::PathNotAllowed)?;
    let destination = policy
        .resolve(dest_param)
        .map_err(GatewayError::PathNotAllowed)?;

    if !source.exists() {
        return Err(GatewayError::Io(format!("source not found: {}", source.display())));
    }
    if let Some(parent) = destination.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::Io(e.to_string()))?;
        }
    }
    std::fs::rename(&source, &destination).map_err(|e| GatewayError::Io(e.to_string()))?;

    Ok(json!({
        "source_path": source.display().to_string(),
        "destination_path": destination.display().to_string(),
        "success": true,
    }))
}
