//! `edit_file` tool (§6.4): replaces either a literal text occurrence or one
//! line of a file, in place.

use serde_json::{json, Value};

use crate::error::GatewayError;

use super::path::PathPolicy;

pub fn edit_file(policy: &PathPolicy, args: &Value) -> Result<Value, GatewayError> {
    let path_param = args
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing path".to_string()))?;
    let new_text = args
        .get("new_text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::InvalidToolArguments("missing new_text".to_string()))?;

    let path = policy
        .resolve(path_param)
        .map_err(GatewayError::PathNotAllowed)?;
    if !path.is_file() {
        return Err(GatewayError::Io(format!("not a file: {}", path.display())));
    }
    let original =
        std::fs::read_to_string(&path).map_err(|e| GatewayError::Io(e.to_string()))?;

    let old_text = args.get("old_text").and_then(|v| v.as_str());
    let line_number = args.get("line_number").and_then(|v| v.as_u64());

    let (edited, changes_count, message) = match (old_text, line_number) {
        (Some(old), _) => {
            let count = original.matches(old).count();
            if count == 0 {
                return Ok(json!({
                    "path": path.display().to_string(),
                    "success": false,
                    "message": "old_text not found in file",
                    "changes_count": 0,
                }));
            }
            (original.replace(old, new_text), count, "replaced all occurrences of old_text".to_string())
        }
        (None, Some(line)) => {
            let mut lines: Vec<&str> = original.split('\n').collect();
            let idx = (line as usize).checked_sub(1);
            match idx.filter(|&i| i < lines.len()) {
                Some(i) => {
                    lines[i] = new_text;
                    (lines.join("\n"), 1, format!("replaced line {line}"))
                }
                None => {
                    return Ok(json!({
                        "path": path.display().to_string(),
                        "success": false,
                        "message": format!("line_number {line} out of range"),
                        "changes_count": 0,
                    }));
                }
            }
        }
        (None, None) => {
            return Err(GatewayError::InvalidToolArguments(
                "one of old_text or line_number is required".to_string(),
            ));
        }
    };

    std::fs::write(&path, &edited).map_err(|e| GatewayError::Io(e.to_string()))?;

    Ok(json!({
        "path": path.display().to_string(),
        "success": true,
        "message": message,
        "changes_count": changes_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::path::PathPolicy;

    #[test]
    fn replaces_old_text_occurrences() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "foo bar foo").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = edit_file(
            &policy,
            &json!({"path": "a.txt", "old_text": "foo", "new_text": "baz"}),
        )
        .unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["changes_count"], 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "baz bar baz"
        );
    }

    #[test]
    fn replaces_specific_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\nthree").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = edit_file(
            &policy,
            &json!({"path": "a.txt", "line_number": 2, "new_text": "TWO"}),
        )
        .unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "one\nTWO\nthree"
        );
    }

    #[test]
    fn missing_old_text_reports_failure_not_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let result = edit_file(
            &policy,
            &json!({"path": "a.txt", "old_text": "nope", "new_text": "x"}),
        )
        .unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["changes_count"], 0);
    }

    #[test]
    fn requires_old_text_or_line_number() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let policy = PathPolicy::for_test(dir.path());
        let err = edit_file(&policy, &json!({"path": "a.txt", "new_text": "x"})).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidToolArguments(_)));
    }
}
