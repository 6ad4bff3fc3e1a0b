//! Lexical root containment (no filesystem access).

use std::path::{Component, Path, PathBuf};

use crate::error::{GrablibError, Result};

/// Joins `rel` onto `root` and checks the result is a strict descendant of `root`.
///
/// `.` components are dropped. Any `..` component, a root or prefix component, or a
/// result equal to `root` counts as an escape.
pub fn within_root(root: &Path, rel: &str) -> Result<PathBuf> {
    let escape = || GrablibError::PathEscape {
        root: root.to_path_buf(),
        path: rel.to_string(),
    };

    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(escape())
            }
        }
    }
    if parts.is_empty() {
        return Err(escape());
    }

    let mut out = root.to_path_buf();
    out.extend(parts);
    Ok(out)
}
