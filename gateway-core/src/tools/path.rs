//! Path resolution and containment for the built-in file tools (§6.4).
//!
//! Generalizes the teacher's single-working-folder `resolve_path_under` into
//! a multi-root policy: a workspace root plus any number of additional
//! allowed roots, with a development-only bypass.

use std::env;
use std::path::{Component, Path, PathBuf};

const WORKSPACE_ROOT_VAR: &str = "PI_WORKSPACE_ROOT";
const ALLOWED_ROOTS_VAR: &str = "PI_ALLOWED_ROOTS";
const ALLOW_ALL_PATHS_VAR: &str = "PI_ALLOW_ALL_PATHS";

/// The set of roots tool paths may resolve under, and whether containment is
/// enforced at all.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    roots: Vec<PathBuf>,
    allow_all: bool,
}

impl PathPolicy {
    /// Reads `PI_WORKSPACE_ROOT`, `PI_ALLOWED_ROOTS`, and
    /// `PI_ALLOW_ALL_PATHS` from the process environment (§6.3). The
    /// workspace root defaults to the user's documents directory, falling
    /// back to home when that's unavailable.
    pub fn from_env() -> Self {
        let workspace_root = env::var(WORKSPACE_ROOT_VAR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::document_dir())
            .or_else(|| dirs::home_dir())
            .unwrap_or_else(|| PathBuf::from("."));

        let mut roots = vec![workspace_root];
        if let Ok(extra) = env::var(ALLOWED_ROOTS_VAR) {
            roots.extend(extra.split(':').filter(|s| !s.is_empty()).map(PathBuf::from));
        }

        let allow_all = env::var(ALLOW_ALL_PATHS_VAR).as_deref() == Ok("1");

        Self { roots, allow_all }
    }

    /// The first root, used as the base for relative path resolution.
    pub fn workspace_root(&self) -> &Path {
        &self.roots[0]
    }

    /// Builds a policy rooted at a single directory with containment
    /// enforced. Used by the individual tool tests and by downstream crates
    /// wiring a sandbox without going through the environment.
    pub fn for_test(root: &Path) -> Self {
        Self {
            roots: vec![root.to_path_buf()],
            allow_all: false,
        }
    }

    /// Resolves `path_param` per §6.4: `~` expands to the user's home
    /// directory, absolute paths are used verbatim, relative paths resolve
    /// against the workspace root. Returns `Err` with a description when the
    /// resolved path escapes every allowed root and `PI_ALLOW_ALL_PATHS`
    /// isn't set.
    pub fn resolve(&self, path_param: &str) -> Result<PathBuf, String> {
        let expanded = expand_tilde(path_param);
        let joined = if expanded.is_absolute() {
            expanded
        } else {
            self.workspace_root().join(expanded)
        };
        let normalized = normalize_path(&joined);

        if self.allow_all {
            return Ok(normalized);
        }

        let contained = self.roots.iter().any(|root| {
            let root_normalized = normalize_path(root);
            normalized.starts_with(&root_normalized)
        });

        if contained {
            Ok(normalized)
        } else {
            Err(format!(
                "path outside allowed roots: {}",
                normalized.display()
            ))
        }
    }
}

/// Expands a leading `~` or `~/...` to the user's home directory via `dirs`.
/// Paths not starting with `~` are returned unchanged.
fn expand_tilde(path_param: &str) -> PathBuf {
    if let Some(rest) = path_param.strip_prefix('~') {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        if rest.is_empty() {
            home
        } else {
            home.join(rest)
        }
    } else {
        PathBuf::from(path_param)
    }
}

/// Resolves `.` and `..` components without touching the filesystem (§8:
/// `normalize(normalize(P)) = normalize(P)`).
fn normalize_path(path: &Path) -> PathBuf {
    let mut buf = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(p) => buf = PathBuf::from(p.as_os_str()),
            Component::RootDir => buf.push(comp),
            Component::CurDir => {}
            Component::ParentDir => {
                buf.pop();
            }
            Component::Normal(s) => buf.push(s),
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(root: &Path) -> PathPolicy {
        PathPolicy {
            roots: vec![root.to_path_buf()],
            allow_all: false,
        }
    }

    #[test]
    fn normalize_path_resolves_dot_dot() {
        assert_eq!(normalize_path(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
    }

    #[test]
    fn normalize_path_is_idempotent() {
        let p = Path::new("/a/./b/../c/d");
        let once = normalize_path(p);
        let twice = normalize_path(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn relative_path_resolves_under_workspace_root() {
        let p = policy(Path::new("/workspace"));
        let resolved = p.resolve("notes/todo.txt").unwrap();
        assert_eq!(resolved, PathBuf::from("/workspace/notes/todo.txt"));
    }

    #[test]
    fn path_escaping_root_is_rejected() {
        let p = policy(Path::new("/workspace"));
        let err = p.resolve("../../etc/passwd").unwrap_err();
        assert!(err.contains("outside allowed roots"));
    }

    #[test]
    fn absolute_path_within_extra_root_is_allowed() {
        let p = PathPolicy {
            roots: vec![PathBuf::from("/workspace"), PathBuf::from("/tmp/extra")],
            allow_all: false,
        };
        let resolved = p.resolve("/tmp/extra/file.txt").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/extra/file.txt"));
    }

    #[test]
    fn allow_all_bypasses_containment() {
        let p = PathPolicy {
            roots: vec![PathBuf::from("/workspace")],
            allow_all: true,
        };
        let resolved = p.resolve("/etc/passwd").unwrap();
        assert_eq!(resolved, PathBuf::from("/etc/passwd"));
    }
}
