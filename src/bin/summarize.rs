//! Summary step: load the dataset, compute the summaries, write the artifacts.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use rusty_stats::artifact::{self, ArtifactInput};
use rusty_stats::config::load_config;
use rusty_stats::data::loader::load_file;
use rusty_stats::{cohort, summary};

#[derive(Debug, Parser)]
#[command(about = "Compute univariate and bivariate summaries of a dataset")]
struct Args {
    /// Configuration file (default: ./rusty-stats.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset file, overriding the configured one
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory the artifacts are written to
    #[arg(long)]
    results_dir: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = args.results_dir {
        config.paths.results_dir = dir;
    }
    let dataset_path = args.input.unwrap_or_else(|| config.dataset_path());
    let options = config.loader_options().context("loader settings")?;

    if !dataset_path.exists() {
        anyhow::bail!(
            "Data file not found: {} (run fetch-data or generate-sample first)",
            dataset_path.display()
        );
    }

    log::info!("Loading data from {}", dataset_path.display());
    let dataset = load_file(&dataset_path, &options)
        .with_context(|| format!("loading {}", dataset_path.display()))?;

    let summaries = summary::summarize(&dataset);
    log::info!(
        "Computed {} univariate and {} bivariate records",
        summaries.univariate.len(),
        summaries.bivariate.len()
    );

    let report = match &config.cohort {
        Some(cohort_config) => {
            log::info!("Running cohort analysis");
            cohort::analyze(&dataset, cohort_config).context("cohort analysis")?
        }
        None => None,
    };

    let input = ArtifactInput {
        dataset_path: &dataset_path,
        rows: dataset.row_count(),
        columns: dataset.column_count(),
        summaries: &summaries,
        cohort: report.as_ref(),
        max_frequency_entries: config.summary.max_frequency_entries,
    };
    let manifest = artifact::write_artifacts(&config.paths.results_dir, &input)
        .with_context(|| format!("writing artifacts to {}", config.paths.results_dir.display()))?;

    for file in &manifest.files {
        log::info!("Exported {}", config.paths.results_dir.join(file).display());
    }
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
