//! `read_file` tool (§6.4): reads file content under the sandboxed roots.

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

pub fn read_file(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let path_param = args
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing path".to_string()))?;
    let path = policy
        .resolve(path_param)
        .map_err(GatewayError::PathNotAllowed)?;

    if !path.is_file() {
        return Err(GatewayError::Io(format!(
            "not a file: {}",
            path.display()
        )));
    }

    let max_bytes = args
        .get("max_bytes")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_MAX_BYTES);

    let bytes = std::fs::read(&path).map_err(|e| GatewayError::Io(e.to_string()))?;
    let size = bytes.len();
    let truncated = size > max_bytes;
    let slice = if truncated { &bytes[..max_bytes] } else { &bytes[..] };
    let content = String::from_utf8_lossy(slice).into_owned();

    Ok(json!({
        "path": path.display().to_string(),
        "content": content,
        "size": size,
        "truncated": truncated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(root: &std::path::Path) -> PathPolicy {
        PathPolicy::for_test(root)
    }

    #[test]
    fn reads_small_file_untruncated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let result = read_file(&policy(dir.path()), &json!({"path": "a.txt"})).unwrap();
        assert_eq!(result["content"], "hello");
        assert_eq!(result["size"], 5);
        assert_eq!(result["truncated"], false);
    }

    #[test]
    fn truncates_past_max_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.txt"), "x".repeat(100)).unwrap();
        let result = read_file(
            &policy(dir.path()),
            &json!({"path": "big.txt", "max_bytes": 10}),
        )
        .unwrap();
        assert_eq!(result["truncated"], true);
        assert_eq!(result["content"].as_str().unwrap().len(), 10);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&policy(dir.path()), &json!({"path": "missing.txt"})).unwrap_err();
        assert!(matches!(err, GatewayError::Io(_)));
    }
}
