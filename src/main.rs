use anyhow::{Context, Result};
use clap::Parser;
use insttally::cli::{Cli, Command, OutputFormat};
use insttally::config::TallyConfig;
use insttally::csv_output::CsvOutput;
use insttally::input;
use insttally::json_output::JsonOutput;
use insttally::tally::{Selector, Tally};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the config file if one was given, otherwise use defaults
fn load_config(path: Option<&PathBuf>) -> Result<TallyConfig> {
    match path {
        Some(path) => TallyConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(TallyConfig::default()),
    }
}

/// Read the input and build the tally for the chosen mode
///
/// Returns the tally together with the column to print, or `None` when the
/// selector names no column.
fn build_tally(
    command: &Command,
    input_override: Option<PathBuf>,
    config: &TallyConfig,
) -> Result<(Tally, Option<Selector>)> {
    match command {
        Command::Paired { selector } => {
            let path = input_override.unwrap_or_else(|| config.paired_input.clone());
            let lines = input::read_lines(&path)?;
            let tally = Tally::from_paired_lines(&lines)
                .with_context(|| format!("Failed to tally {}", path.display()))?;
            Ok((tally, Selector::parse(selector)))
        }
        Command::Single => {
            let path = input_override.unwrap_or_else(|| config.single_input.clone());
            let lines = input::read_lines(&path)?;
            Ok((Tally::from_lines(&lines), Some(Selector::Keys)))
        }
    }
}

/// Write the tally to stdout in the requested format
fn emit(tally: &Tally, selector: Selector, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match format {
        OutputFormat::Text => tally.write_column(&mut out, selector)?,
        OutputFormat::Json => writeln!(out, "{}", JsonOutput::from_tally(tally).to_json()?)?,
        OutputFormat::Csv => write!(out, "{}", CsvOutput::new(tally).to_csv())?,
    }

    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(args.config.as_ref())?;
    debug!(?config, "configuration loaded");

    let (tally, selector) = build_tally(&args.command, args.input, &config)?;
    info!(keys = tally.len(), mode = ?tally.mode(), "tally complete");

    let Some(selector) = selector else {
        debug!("selector names no column, nothing to print");
        return Ok(());
    };

    emit(&tally, selector, args.format)?;

    if args.summary {
        tally
            .print_summary()
            .context("Failed to write summary to stderr")?;
    }

    Ok(())
}
