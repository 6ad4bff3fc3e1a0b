//! Project configuration: what to download, where to place it, and how to build.
//!
//! Loaded from `grablib.toml` or `grablib.json`. Relative roots are resolved against
//! the directory holding the config file.

mod ordered;
mod target;

pub use ordered::OrderedMap;
pub use target::{CatSource, DownloadTarget, EntryTarget, OneOrMany};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GrablibError, Result};

/// File names tried by [`find_default`], in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["grablib.toml", "grablib.json"];

/// Build section: cleanup globs, concatenations and style trees.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSpec {
    #[serde(default)]
    pub wipe: Option<OneOrMany<String>>,
    /// Destination (relative to `build_root`) to ordered sources.
    #[serde(default)]
    pub cat: Option<OrderedMap<String, Vec<CatSource>>>,
    /// Output directory (relative to `build_root`) to input directory.
    #[serde(default)]
    pub sass: Option<OrderedMap<String, String>>,
}

/// Whole-project configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrablibConfig {
    #[serde(default)]
    pub download_root: Option<PathBuf>,
    #[serde(default)]
    pub download: OrderedMap<String, DownloadTarget>,
    /// Extra URL aliases, overlaid on the built-in ones.
    #[serde(default)]
    pub aliases: OrderedMap<String, String>,
    #[serde(default)]
    pub build_root: Option<PathBuf>,
    #[serde(default)]
    pub build: Option<BuildSpec>,
    /// Debug builds skip script minification and emit unminified, source-mapped CSS.
    #[serde(default)]
    pub debug: bool,
    /// Directory relative roots and plain build sources are anchored to. Set by
    /// [`GrablibConfig::finish`].
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl GrablibConfig {
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    pub fn from_json_str(s: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }

    /// Makes relative roots absolute against `base`, records `base` and checks
    /// required roots.
    pub fn finish(mut self, base: &Path) -> std::result::Result<Self, String> {
        self.base_dir = Some(base.to_path_buf());
        for root in [&mut self.download_root, &mut self.build_root]
            .into_iter()
            .flatten()
        {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
        if !self.download.is_empty() && self.download_root.is_none() {
            return Err("`download` is set but `download_root` is missing".to_string());
        }
        if self.build.is_some() && self.build_root.is_none() {
            return Err("`build` is set but `build_root` is missing".to_string());
        }
        Ok(self)
    }
}

/// Load a config file, choosing the format from its extension.
pub fn load(path: &Path) -> Result<GrablibConfig> {
    let config_err = |message: String| GrablibError::Config {
        path: path.to_path_buf(),
        message,
    };

    let data = fs::read_to_string(path).map_err(|e| GrablibError::io(path, e))?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => GrablibConfig::from_toml_str(&data),
        Some("json") => GrablibConfig::from_json_str(&data),
        _ => Err("unsupported config format, expected .toml or .json".to_string()),
    }
    .map_err(config_err)?;

    let base = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().map_err(|e| GrablibError::io(path, e))?,
    };
    let cfg = parsed.finish(&base).map_err(config_err)?;
    tracing::debug!(path = %path.display(), downloads = cfg.download.len(), "loaded config");
    Ok(cfg)
}

/// First of [`DEFAULT_CONFIG_NAMES`] present in `dir`.
pub fn find_default(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}
