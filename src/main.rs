mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyStatsApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

/// Browse the summaries written by `summarize`.
#[derive(Debug, Parser)]
#[command(about = "Dashboard for precomputed summary statistics")]
struct Args {
    /// Configuration file (default: ./rusty-stats.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results directory to open (default: paths.results_dir)
    #[arg(long)]
    results_dir: Option<PathBuf>,
}

fn main() -> eframe::Result {
    rusty_stats::init_logging();
    let args = Args::parse();

    let config = match rusty_stats::config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring configuration: {e}");
            rusty_stats::config::Config::default()
        }
    };
    let results_dir = args.results_dir.unwrap_or(config.paths.results_dir);
    let state = AppState::new(results_dir, config.dashboard.labels);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Stats – Summary Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyStatsApp::new(state)))),
    )
}
