//! CLI for grablib.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_all, run_build, run_check, run_download};

/// Top-level CLI for grablib.
#[derive(Debug, Parser)]
#[command(name = "grablib")]
#[command(about = "grablib: fetch static assets and build them into a site", long_about = None)]
pub struct Cli {
    /// Log debug detail.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log to the XDG state log file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where to find the project configuration.
#[derive(Debug, Args)]
pub struct ConfigArg {
    /// Path to grablib.toml or grablib.json (default: look in the current directory).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download files and expand archives into the download root.
    Download {
        #[command(flatten)]
        config: ConfigArg,
    },

    /// Wipe, concatenate and compile styles into the build root.
    Build {
        #[command(flatten)]
        config: ConfigArg,
        /// Debug build: no script minification, expanded CSS with source maps.
        #[arg(long)]
        debug: bool,
    },

    /// Download, then build.
    Run {
        #[command(flatten)]
        config: ConfigArg,
        /// Debug build: no script minification, expanded CSS with source maps.
        #[arg(long)]
        debug: bool,
    },

    /// Load and validate the configuration, then print a summary.
    Check {
        #[command(flatten)]
        config: ConfigArg,
    },
}

impl CliCommand {
    pub fn run(self) -> Result<()> {
        match self {
            CliCommand::Download { config } => run_download(config.config.as_deref()),
            CliCommand::Build { config, debug } => run_build(config.config.as_deref(), debug),
            CliCommand::Run { config, debug } => run_all(config.config.as_deref(), debug),
            CliCommand::Check { config } => run_check(config.config.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests;
