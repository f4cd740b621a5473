//! CLI argument parsing for insttally

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for tallies
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One value per line (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Tally alternating key/duration lines (default input: transferFrom.txt)
    Paired {
        /// 1 = keys, 2 = counts, 3 = summed durations; anything else prints nothing
        selector: String,
    },
    /// Tally one key per line and print the keys (default input: all.txt)
    Single,
}

#[derive(Parser, Debug)]
#[command(name = "insttally")]
#[command(version)]
#[command(about = "Tally instruction counts and timings from newline-delimited traces", long_about = None)]
pub struct Cli {
    /// Input file (overrides the config file and the built-in default)
    #[arg(short, long, value_name = "PATH", global = true)]
    pub input: Option<PathBuf>,

    /// TOML file with default input paths
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Print a summary table (counts and timing per key) to stderr
    #[arg(short = 'c', long = "summary", global = true)]
    pub summary: bool,

    /// Enable debug tracing output on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}
