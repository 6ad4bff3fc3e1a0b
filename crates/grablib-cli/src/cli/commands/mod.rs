//! CLI command handlers, one file per subcommand.

mod build;
mod check;
mod download;
mod run;

pub use build::run_build;
pub use check::run_check;
pub use download::run_download;
pub use run::run_all;

use anyhow::{Context, Result};
use grablib_core::config::{self, GrablibConfig};
use std::path::{Path, PathBuf};

/// Loads `path`, or the default config file of the current directory.
pub(crate) fn load_config(path: Option<&Path>) -> Result<(PathBuf, GrablibConfig)> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let cwd = std::env::current_dir().context("reading current directory")?;
            config::find_default(&cwd).with_context(|| {
                format!(
                    "no config file found in {} (looked for {})",
                    cwd.display(),
                    config::DEFAULT_CONFIG_NAMES.join(", ")
                )
            })?
        }
    };
    let cfg = config::load(&path)?;
    tracing::debug!("loaded config from {}", path.display());
    Ok((path, cfg))
}
