//! URL path → filesystem path resolution
//!
//! Percent-decodes the request path, normalizes `.`/`..` segments and maps the
//! result under the serving root. With containment enforced, the resolved path
//! (after following symlinks of whatever part of it exists) must stay inside
//! the root.

use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a request path could not be mapped onto the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Not valid UTF-8 after percent-decoding, or contains NUL
    Undecodable,
    /// Resolves outside the root
    Escape,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undecodable => write!(f, "request path is not valid UTF-8"),
            Self::Escape => write!(f, "request path resolves outside the root directory"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Map `url_path` (no query) onto `root`, which must already be canonical.
///
/// `enforce_root = false` keeps `..` segments literally and skips the
/// containment check; only uploads may opt into that.
pub fn resolve(root: &Path, url_path: &str, enforce_root: bool) -> Result<PathBuf, ResolveError> {
    let decoded = percent_decode_str(url_path)
        .decode_utf8()
        .map_err(|_| ResolveError::Undecodable)?;
    if decoded.contains('\0') {
        return Err(ResolveError::Undecodable);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." if enforce_root => {
                if segments.pop().is_none() {
                    return Err(ResolveError::Escape);
                }
            }
            other => segments.push(other),
        }
    }

    let resolved = segments.iter().fold(root.to_path_buf(), |acc, s| acc.join(s));

    if enforce_root {
        check_containment(root, &resolved)?;
    }
    Ok(resolved)
}

/// Canonicalize the deepest existing ancestor of `path` and require it under `root`.
///
/// A dangling symlink on the way counts as existing: writing through it would
/// create its target, so the link target itself must stay inside the root.
fn check_containment(root: &Path, path: &Path) -> Result<(), ResolveError> {
    check_within(root, path, MAX_LINK_HOPS)
}

const MAX_LINK_HOPS: usize = 16;

fn check_within(root: &Path, path: &Path, hops: usize) -> Result<(), ResolveError> {
    let mut probe = Some(path);
    while let Some(candidate) = probe {
        if let Ok(canonical) = candidate.canonicalize() {
            return if canonical.starts_with(root) {
                Ok(())
            } else {
                Err(ResolveError::Escape)
            };
        }
        if candidate.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
            let target = candidate.read_link().map_err(|_| ResolveError::Escape)?;
            let parent = candidate.parent().ok_or(ResolveError::Escape)?;
            if hops == 0 {
                return Err(ResolveError::Escape);
            }
            let mut next = parent.join(target);
            if let Ok(rest) = path.strip_prefix(candidate) {
                if !rest.as_os_str().is_empty() {
                    next.push(rest);
                }
            }
            return check_within(root, &next, hops - 1);
        }
        probe = candidate.parent();
    }
    Err(ResolveError::Escape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("devserve-path-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("sub")).unwrap();
        dir.canonicalize().unwrap()
    }

    #[test]
    fn test_plain_and_encoded_paths() {
        let root = temp_root("plain");
        assert_eq!(resolve(&root, "/", true).unwrap(), root);
        assert_eq!(resolve(&root, "/sub/a.txt", true).unwrap(), root.join("sub").join("a.txt"));
        assert_eq!(
            resolve(&root, "/sub/my%20file.bin", true).unwrap(),
            root.join("sub").join("my file.bin")
        );
        assert_eq!(resolve(&root, "//sub/./a", true).unwrap(), root.join("sub").join("a"));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn test_dot_dot_inside_root_is_normalized() {
        let root = temp_root("dotdot");
        assert_eq!(resolve(&root, "/sub/../a.txt", true).unwrap(), root.join("a.txt"));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn test_escape_rejected_when_enforced() {
        let root = temp_root("escape");
        assert_eq!(resolve(&root, "/../a.txt", true), Err(ResolveError::Escape));
        assert_eq!(resolve(&root, "/sub/../../a.txt", true), Err(ResolveError::Escape));
        assert_eq!(resolve(&root, "/%2e%2e/a.txt", true), Err(ResolveError::Escape));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn test_escape_kept_literally_when_permissive() {
        let root = temp_root("permissive");
        let resolved = resolve(&root, "/../a.txt", false).unwrap();
        assert_eq!(resolved, root.join("..").join("a.txt"));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn test_undecodable() {
        let root = temp_root("undecodable");
        assert_eq!(resolve(&root, "/%ff%fe", true), Err(ResolveError::Undecodable));
        assert_eq!(resolve(&root, "/a%00b", true), Err(ResolveError::Undecodable));
        let _ = fs::remove_dir_all(root);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_rejected() {
        let root = temp_root("symlink");
        let outside = std::env::temp_dir();
        std::os::unix::fs::symlink(&outside, root.join("out")).unwrap();
        assert_eq!(resolve(&root, "/out/x.txt", true), Err(ResolveError::Escape));
        let _ = fs::remove_dir_all(root);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_out_of_root_rejected() {
        let root = temp_root("dangling");
        std::os::unix::fs::symlink("../devserve-dangling-target.txt", root.join("link.txt")).unwrap();
        std::os::unix::fs::symlink("/nonexistent-devserve-dir/x", root.join("abs")).unwrap();
        assert_eq!(resolve(&root, "/link.txt", true), Err(ResolveError::Escape));
        assert_eq!(resolve(&root, "/abs", true), Err(ResolveError::Escape));
        let _ = fs::remove_dir_all(root);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_inside_root_allowed() {
        let root = temp_root("dangling-inside");
        std::os::unix::fs::symlink("sub/new.txt", root.join("link.txt")).unwrap();
        std::os::unix::fs::symlink("loop-b", root.join("loop-a")).unwrap();
        std::os::unix::fs::symlink("loop-a", root.join("loop-b")).unwrap();
        assert_eq!(resolve(&root, "/link.txt", true).unwrap(), root.join("link.txt"));
        assert_eq!(resolve(&root, "/loop-a", true), Err(ResolveError::Escape));
        let _ = fs::remove_dir_all(root);
    }
}
