//! Cleanup stage: delete build outputs matching glob patterns.

use std::fs;
use std::path::{Component, Path};

use crate::error::{GrablibError, Result};
use crate::report::BuildReport;

/// Deletes everything under `build_root` matching `patterns`.
///
/// Directories are removed recursively. Matches that resolve outside the build root
/// are skipped. A pattern matching nothing is not an error.
pub fn wipe(build_root: &Path, patterns: &[String], report: &mut BuildReport) -> Result<()> {
    let mut count = 0;
    let escaped_root = glob::Pattern::escape(&build_root.to_string_lossy());

    for pattern in patterns {
        let full = format!("{}/{}", escaped_root, pattern);
        let paths = glob::glob(&full)
            .map_err(|e| GrablibError::InvalidGlob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                let path = e.path().to_path_buf();
                GrablibError::io(path, e.into_error())
            })?;

        tracing::info!("deleting {} paths based on \"{}\"", paths.len(), pattern);
        for path in paths {
            if !inside(build_root, &path) {
                tracing::warn!(path = %path.display(), "match outside build root, not deleting");
                continue;
            }
            // Already gone when an earlier match was its parent directory.
            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(_) => continue,
            };
            if meta.is_dir() {
                tracing::info!("deleting directory \"{}\"", path.display());
                fs::remove_dir_all(&path).map_err(|e| GrablibError::io(&path, e))?;
            } else {
                tracing::info!("deleting file \"{}\"", path.display());
                fs::remove_file(&path).map_err(|e| GrablibError::io(&path, e))?;
            }
            count += 1;
            report.wiped += 1;
        }
    }
    tracing::info!("{} paths deleted", count);
    Ok(())
}

fn inside(root: &Path, path: &Path) -> bool {
    match path.strip_prefix(root) {
        Ok(rel) => {
            !rel.as_os_str().is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)))
        }
        Err(_) => false,
    }
}
