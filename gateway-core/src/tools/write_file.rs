//! `write_file` tool (§6.4): writes text content to a file under the
//! sandboxed roots, creating parent directories as needed.

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

pub fn write_file(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let path_param = args
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing path".to_string()))?;
    let content = args
        .get("content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing content".to_string()))?;

    let path = policy
        .resolve(path_param)
        .map_err(GatewayError::PathNotAllowed)?;
    let created = !path.exists();

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::Io(e.to_string()))?;
        }
    }
    std::fs::write(&path, content).map_err(|e| GatewayError::Io(e.to_string()))?;

    Ok(json!({
        "path": path.display().to_string(),
        "bytes_written": content.len(),
        "created": created,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::path::PathPolicy;

    #[test]
    fn writes_new_file_and_reports_created() {
        let dir = tempfile::tempdir().unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = write_file(&policy, &json!({"path": "a.txt", "content": "hi"})).unwrap();
        assert_eq!(result["created"], true);
        assert_eq!(result["bytes_written"], 2);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hi");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let policy = PathPolicy::for_test(dir.path());
        write_file(&policy, &json!({"path": "nested/deep/a.txt", "content": "x"})).unwrap();
        assert!(dir.path().join("nested/deep/a.txt").exists());
    }

    #[test]
    fn overwriting_reports_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let policy = PathPolicy::for_test(dir.path());
        std::fs::write(dir.path().join("a.txt"), "old").unwrap();
        let result = write_file(&policy, &json!({"path": "a.txt", "content": "new"})).unwrap();
        assert_eq!(result["created"], false);
    }
}
