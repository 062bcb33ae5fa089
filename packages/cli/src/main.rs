//! FairTree CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::Cli;

const DEFAULT_FILTER: &str = "fairtree=info,fairtree_core=info";
const VERBOSE_FILTER: &str = "fairtree=debug,fairtree_core=debug";

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.execute() {
        output::print_failure(&e);
        std::process::exit(1);
    }
}
