use clap::{command, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "binder",
    about = "Turn saved TCG Collector and Cardmarket pages into collection reports and want lists",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub paths: PathArgs,

    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

/// Overrides for the matching config file entries.
#[derive(Debug, Args)]
pub struct PathArgs {
    /// Path to the config file
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the saved HTML pages
    #[arg(short = 'd', long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory where reports and want lists are written
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Extraction cache file
    #[arg(long = "cache-file", value_name = "FILE", global = true)]
    pub cache_file: Option<PathBuf>,

    /// Skip the online want list conversion
    #[arg(long = "no-convert", global = true)]
    pub no_convert: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract the saved pages if they changed, then generate reports
    #[command(name = "run", alias = "r")]
    Run {
        /// Re-extract even when the cache is up to date
        #[arg(short, long)]
        force: bool,
    },
    /// Extract the saved pages and write the cache
    #[command(name = "extract", alias = "x")]
    Extract,
    /// Generate reports from the existing cache
    #[command(name = "report", alias = "reports")]
    Report,
    /// Show what the cache contains
    #[command(name = "info", alias = "i")]
    Info,
    /// Output current configuration
    #[command(name = "config", alias = "conf")]
    Config {
        /// Write the default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["binder", "run", "--force", "--data-dir", "saved", "--no-convert"]);

        assert!(matches!(cli.command, Commands::Run { force: true }));
        assert_eq!(cli.paths.data_dir, Some(PathBuf::from("saved")));
        assert!(cli.paths.no_convert);
    }
}
