//! `check_path` tool (§6.4): reports existence and kind of a path without
//! reading its content.

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

pub fn check_path(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let path_param = args
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing path".to_string()))?;
    let path = policy
        .resolve(path_param)
        .map_err(GatewayError::PathNotAllowed)?;

    let exists = path.exists();
    let is_directory = exists && path.is_dir();
    let is_file = exists && path.is_file();
    let size = if is_file {
        std::fs::metadata(&path).ok().map(|m| m.len())
    } else {
        None
    };

    let mut result = json!({
        "path": path.display().to_string(),
        "exists": exists,
        "is_directory": is_directory,
        "is_file": is_file,
    });
    if let Some(size) = size {
        result["size"] = json!(size);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::path::PathPolicy;

    #[test]
    fn reports_file_with_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = check_path(&policy, &json!({"path": "a.txt"})).unwrap();
        assert_eq!(result["exists"], true);
        assert_eq!(result["is_file"], true);
        assert_eq!(result["size"], 5);
    }

    #[test]
    fn reports_missing_path_without_size() {
        let dir = tempfile::tempdir().unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = check_path(&policy, &json!({"path": "missing.txt"})).unwrap();
        assert_eq!(result["exists"], false);
        assert!(result.get("size").is_none());
    }

    #[test]
    fn reports_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = check_path(&policy, &json!({"path": "sub"})).unwrap();
        assert_eq!(result["is_directory"], true);
        assert_eq!(result["is_file"], false);
    }
}
