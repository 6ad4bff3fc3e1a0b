//! `grablib check` – validate the config and summarise it.

use anyhow::Result;
use grablib_core::config::{DownloadTarget, GrablibConfig};
use std::path::Path;

use super::load_config;

pub fn run_check(config: Option<&Path>) -> Result<()> {
    let (path, cfg) = load_config(config)?;
    println!("Config {} is valid.", path.display());
    for line in summary(&cfg) {
        println!("{line}");
    }
    Ok(())
}

fn summary(cfg: &GrablibConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(root) = &cfg.download_root {
        let archives = cfg
            .download
            .iter()
            .filter(|(_, t)| matches!(t, DownloadTarget::Archive(_)))
            .count();
        lines.push(format!(
            "{:<14} {} ({} files, {} archives)",
            "download_root",
            root.display(),
            cfg.download.len() - archives,
            archives
        ));
    }
    if !cfg.aliases.is_empty() {
        lines.push(format!("{:<14} {}", "aliases", cfg.aliases.len()));
    }
    if let (Some(root), Some(build)) = (&cfg.build_root, &cfg.build) {
        lines.push(format!("{:<14} {}", "build_root", root.display()));
        if let Some(wipe) = &build.wipe {
            lines.push(format!("{:<14} {} patterns", "  wipe", wipe.as_slice().len()));
        }
        if let Some(cat) = &build.cat {
            lines.push(format!("{:<14} {} destinations", "  cat", cat.len()));
        }
        if let Some(sass) = &build.sass {
            lines.push(format!("{:<14} {} directories", "  sass", sass.len()));
        }
    }
    lines.push(format!("{:<14} {}", "debug", cfg.debug));
    lines
}
