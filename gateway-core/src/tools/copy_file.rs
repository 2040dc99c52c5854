//! `copy_file` tool (§6.4): copies a file (directories are not supported).

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

pub fn copy_file(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
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

    if !source.is_file() {
        return Err(GatewayError::Io(format!(
            "source is not a file: {}",
            source.display()
        )));
    }
    if let Some(parent) = destination.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::Io(e.to_string()))?;
        }
    }
    std::fs::copy(&source, &destination).map_err(|e| GatewayError::Io(e.to_string()))?;

    Ok(json!({
        "source_path": source.display().to_string(),
        "destination_path": destination.display().to_string(),
        "success": true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::path::PathPolicy;

    #[test]
    fn copies_file_leaving_source_intact() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "content").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = copy_file(
            &policy,
            &json!({"source_path": "a.txt", "destination_path": "b.txt"}),
        )
        .unwrap();
        assert_eq!(result["success"], true);
        assert!(dir.path().join("a.txt").exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("b.txt")).unwrap(), "content");
    }

    #[test]
    fn refuses_to_copy_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let err = copy_file(
            &policy,
            &json!({"source_path": "sub", "destination_path": "dest"}),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Io(_)));
    }
}
