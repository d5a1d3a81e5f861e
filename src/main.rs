use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use crate::cli::{Cli, Commands, PathArgs};
use crate::config::Config;

mod card;
mod cli;
mod commands;
mod config;
mod diagnostics;
mod extractor;
mod metrics;
mod normalize;
mod page;
mod reconcile;
mod report;
mod select;
mod storage;

fn main() -> ExitCode {
    let args = Cli::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match process_args(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn apply_overrides(mut config: Config, paths: PathArgs) -> Config {
    if let Some(data_dir) = paths.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(output_dir) = paths.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(cache_file) = paths.cache_file {
        config.cache_file = cache_file;
    }
    if paths.no_convert {
        config.converter.enabled = false;
    }
    config
}

fn process_args(args: Cli) -> Result<()> {
    info!("load config");
    let config = Config::load(args.paths.config.as_deref())?;
    let config = apply_overrides(config, args.paths);

    match args.command {
        Commands::Run { force } => commands::run(&config, force),
        Commands::Extract => commands::run_extract(&config),
        Commands::Report => commands::run_report(&config),
        Commands::Info => commands::show_info(&config),
        Commands::Config { init } => commands::show_config(&config, init),
    }
}
