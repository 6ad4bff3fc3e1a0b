//! `grablib build` – run the asset pipeline.

use anyhow::Result;
use grablib_core::build::Builder;
use grablib_core::config::GrablibConfig;
use std::path::Path;

use super::load_config;

pub fn run_build(config: Option<&Path>, debug: bool) -> Result<()> {
    let (_, cfg) = load_config(config)?;
    build(&cfg, debug)
}

/// `debug` forces a debug build; otherwise the config flag decides.
pub(crate) fn build(cfg: &GrablibConfig, debug: bool) -> Result<()> {
    let debug = debug || cfg.debug;
    let Some(mut builder) = Builder::for_config(cfg, debug)? else {
        println!("Nothing to build.");
        return Ok(());
    };
    if debug {
        tracing::info!("debug build");
    }

    let result = builder.run();
    println!("Build: {}", builder.report());
    result?;
    Ok(())
}
