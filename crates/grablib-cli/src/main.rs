use grablib_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    // Initialize logging before any work; a file that cannot be opened falls back to stderr.
    if cli.log_file {
        if let Err(e) = logging::init_logging_file(cli.verbose) {
            logging::init_logging_stderr(cli.verbose);
            tracing::warn!("could not open log file, logging to stderr: {:#}", e);
        }
    } else {
        logging::init_logging_stderr(cli.verbose);
    }

    if let Err(err) = cli.command.run() {
        eprintln!("grablib error: {:#}", err);
        std::process::exit(1);
    }
}
