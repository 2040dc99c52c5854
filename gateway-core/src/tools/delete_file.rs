//! `delete_file` tool (§6.4): deletes a file or, with `recursive`, a
//! directory tree.

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

pub fn delete_file(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let path_param = args
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing path".to_string()))?;
    let recursive = args.get("recursive").and_then(|v| v.as_bool()).unwrap_or(false);

    let path = policy
        .resolve(path_param)
        .map_err(GatewayError::PathNotAllowed)?;
    if !path.exists() {
        return Err(GatewayError::Io(format!("path not found: {}", path.display())));
    }

    let was_directory = path.is_dir();
    if was_directory {
        if recursive {
            std::fs::remove_dir_all(&path).map_err(|e| GatewayError::Io(e.to_string()))?;
        } else {
            std::fs::remove_dir(&path).map_err(|e| GatewayError::Io(e.to_string()))?;
        }
    } else {
        std::fs::remove_file(&path).map_err(|e| GatewayError::Io(e.to_string()))?;
    }

    Ok(json!({
        "path": path.display().to_string(),
        "deleted": true,
        "was_directory": was_directory,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::path::PathPolicy;

    #[test]
    fn deletes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = delete_file(&policy, &json!({"path": "a.txt"})).unwrap();
        assert_eq!(result["deleted"], true);
        assert_eq!(result["was_directory"], false);
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn refuses_non_recursive_delete_of_nonempty_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/a.txt"), "x").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let err = delete_file(&policy, &json!({"path": "sub"})).unwrap_err();
        assert!(matches!(err, GatewayError::Io(_)));
    }

    #[test]
    fn recursive_delete_removes_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/a.txt"), "x").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result =
            delete_file(&policy, &json!({"path": "sub", "recursive": true})).unwrap();
        assert_eq!(result["was_directory"], true);
        assert!(!dir.path().join("sub").exists());
    }
}
