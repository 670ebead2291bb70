//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod context;
pub mod export;
pub mod init;
pub mod regions;
pub mod status;

pub use context::CommandContext;

/// Output format options
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format - one row per entry (default)
    #[default]
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

/// Guardex - export multi-region threat-detection findings to CSV
#[derive(Parser, Debug)]
#[command(name = "guardex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "GUARDEX_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "GUARDEX_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the service endpoint template
    #[arg(long, global = true, env = "GUARDEX_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "GUARDEX_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Guardex configuration
    Init,

    /// Show configuration status
    Status,

    /// Display version information
    Version,

    /// List discoverable regions
    Regions {
        /// Region name prefix to match (defaults to the configured prefix)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Export findings from the selected regions to a CSV artifact
    Export(ExportArgs),
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Region to export; repeat for multiple regions, processed in order
    #[arg(short = 'r', long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Export every discoverable region matching the prefix
    #[arg(long, conflicts_with = "regions")]
    pub all: bool,

    /// Region name prefix used with --all (defaults to the configured prefix)
    #[arg(long, requires = "all")]
    pub prefix: Option<String>,

    /// Directory for the CSV artifact
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of regions processed concurrently
    #[arg(long, default_value_t = 1, value_name = "N")]
    pub parallel: usize,

    /// Record failed regions in the summary instead of aborting
    #[arg(long)]
    pub keep_going: bool,
}
