//! `create_directory` tool (§6.4): creates a directory (and any missing
//! parents), idempotently.

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

pub fn create_directory(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let path_param = args
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing path".to_string()))?;
    let path = policy
        .resolve(path_param)
        .map_err(GatewayError::PathNotAllowed)?;

    let already_exists = path.exists();
    if already_exists && !path.is_dir() {
        return Err(GatewayError::Io(format!(
            "path exists and is not a directory: {}",
            path.display()
        )));
    }
    if !already_exists {
        std::fs::create_dir_all(&path).map_err(|e| GatewayError::Io(e.to_string()))?;
    }

    Ok(json!({
        "path": path.display().to_string(),
        "created": !already_exists,
        "already_exists": already_exists,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::path::PathPolicy;

    #[test]
    fn creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = create_directory(&policy, &json!({"path": "a/b/c"})).unwrap();
        assert_eq!(result["created"], true);
        assert_eq!(result["already_exists"], false);
        assert!(dir.path().join("a/b/c").is_dir());
    }

    #[test]
    fn existing_directory_reports_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = create_directory(&policy, &json!({"path": "sub"})).unwrap();
        assert_eq!(result["created"], false);
        assert_eq!(result["already_exists"], true);
    }
}
