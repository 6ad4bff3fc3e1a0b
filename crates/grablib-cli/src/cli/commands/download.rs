//! `grablib download` – fetch files and expand archives.

use anyhow::{Context, Result};
use grablib_core::config::GrablibConfig;
use grablib_core::download::Downloader;
use grablib_core::fetch::{AliasTable, CurlFetcher};
use std::path::Path;

use super::load_config;

pub fn run_download(config: Option<&Path>) -> Result<()> {
    let (_, cfg) = load_config(config)?;
    download(&cfg)
}

/// Runs the downloader and prints its counters, also when it fails.
pub(crate) fn download(cfg: &GrablibConfig) -> Result<()> {
    if cfg.download.is_empty() {
        println!("Nothing to download.");
        return Ok(());
    }
    let root = cfg
        .download_root
        .as_deref()
        .context("download_root is not set")?;

    let fetcher = CurlFetcher::new(AliasTable::with_overrides(&cfg.aliases));
    let mut downloader = Downloader::new(root, &cfg.download, fetcher);
    let result = downloader.run();
    println!("Download: {}", downloader.report());
    result?;
    Ok(())
}
