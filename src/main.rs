//! Soundslot CLI
//!
//! Command-line interface for the Soundslot sound registry.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use soundslot::cli::commands;
use soundslot::cli::{Cli, Commands};
use soundslot::LoadParameters;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::resolve_config(cli.config.as_deref(), cli.backend)?;

    let filter = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    info!("Soundslot v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Play {
            path,
            looping,
            volume,
            start_ms,
            end_ms,
            timeout_secs,
        }) => {
            let params = LoadParameters::default()
                .looping(looping)
                .with_volume(volume)
                .with_range(start_ms, end_ms);
            commands::play(&config, &path, params, Duration::from_secs(timeout_secs))
        }
        Some(Commands::Probe { paths }) => commands::probe(&config, &paths),
        None => {
            println!("Soundslot v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}
