//! Rendering: panels hold the controls, plots and tables show the summaries.

pub mod panels;
pub mod plot;
pub mod tables;
