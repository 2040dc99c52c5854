//! `list_directory` tool (§6.4): lists immediate children, or the whole
//! subtree with `recursive`.

use serde_json::{json, Value};
use walkdir::WalkDir;

use crate::error::GatewayError;

use super::path::PathPolicy;

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn list_directory(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let path_param = args
        .get("path")
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(".");
    let recursive = args.get("recursive").and_then(|v| v.as_bool()).unwrap_or(false);
    let include_hidden = args
        .get("include_hidden")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let path = policy
        .resolve(path_param)
        .map_err(GatewayError::PathNotAllowed)?;
    if !path.is_dir() {
        return Err(GatewayError::Io(format!("not a directory: {}", path.display())));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut items = Vec::new();
    for entry in WalkDir::new(&path)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| include_hidden || !is_hidden(&e.file_name().to_string_lossy()))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let rel = entry
            .path()
            .strip_prefix(&path)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        let meta = entry.metadata().map_err(|e| GatewayError::Io(e.to_string()))?;
        items.push(json!({
            "name": rel,
            "is_directory": meta.is_dir(),
            "size": meta.len(),
        }));
    }

    Ok(json!({
        "path": path.display().to_string(),
        "count": items.len(),
        "items": items,
    }))
}
