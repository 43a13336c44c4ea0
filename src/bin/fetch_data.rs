//! Acquisition step: download the configured archives and extract them.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use rusty_stats::acquire;
use rusty_stats::config::load_config;

#[derive(Debug, Parser)]
#[command(about = "Download and extract the dataset archives")]
struct Args {
    /// Configuration file (default: ./rusty-stats.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory archives are saved and extracted into
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    let data_dir = args.data_dir.unwrap_or(config.paths.data_dir);

    let files = acquire::fetch_all(&config.acquire, &data_dir)
        .with_context(|| format!("fetching archives into {}", data_dir.display()))?;
    log::info!("{} files available in {}", files.len(), data_dir.display());
    Ok(())
}

fn main() -> ExitCode {
    rusty_stats::init_logging();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
