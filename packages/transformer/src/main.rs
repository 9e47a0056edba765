//! CLI entry point for the transformer.

use clap::Parser;
use crosswalk_transformer::cli::{self, Cli};
use crosswalk_transformer::config::RuntimeConfig;

fn main() {
    let cli = Cli::parse();

    let config = match RuntimeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(cli::env_filter(cli.verbose, &config))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(&cli, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
