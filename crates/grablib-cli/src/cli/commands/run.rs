//! `grablib run` – download, then build.

use anyhow::Result;
use std::path::Path;

use super::build::build;
use super::download::download;
use super::load_config;

pub fn run_all(config: Option<&Path>, debug: bool) -> Result<()> {
    let (_, cfg) = load_config(config)?;
    download(&cfg)?;
    build(&cfg, debug)
}
