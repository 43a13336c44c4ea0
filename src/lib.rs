//! Download a tabular dataset, summarise it, and persist the summaries for
//! the dashboard.
//!
//! Pipeline:
//! ```text
//!   fetch-data          summarize                         rusty-stats
//!  ┌──────────┐   ┌──────────────────────────────┐   ┌──────────────┐
//!  │ acquire  │ → │ data → summary (+ cohort) →  │ → │  dashboard   │
//!  │ zip → fs │   │ artifact (staged, atomic)    │   │ reads results│
//!  └──────────┘   └──────────────────────────────┘   └──────────────┘
//! ```

pub mod acquire;
pub mod artifact;
pub mod cohort;
pub mod config;
pub mod data;
pub mod error;
pub mod summary;

pub use error::{StatsError, StatsResult};

/// Initialise `env_logger` for a binary, defaulting to `info`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
