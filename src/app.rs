use eframe::egui::{self, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyStatsApp {
    pub state: AppState,
}

impl RustyStatsApp {
    /// Build the app and load whatever the results directory already holds.
    pub fn new(mut state: AppState) -> Self {
        state.reload();
        Self { state }
    }
}

impl eframe::App for RustyStatsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: per-tab controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables and plots ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.artifacts.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Run `summarize`, then open its results folder  (File → Open results folder…)");
                });
                return;
            }

            match self.state.tab {
                Tab::Univariate => {
                    egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                        tables::univariate_table(ui, &self.state);
                        ui.separator();
                        ui.allocate_ui(egui::vec2(ui.available_width(), 320.0), |ui: &mut Ui| {
                            plot::column_plot(ui, &self.state);
                        });
                        tables::frequency_table(ui, &self.state);
                    });
                }
                Tab::Bivariate => tables::bivariate_table(ui, &self.state),
                Tab::Combinations => {
                    egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                        tables::combination_views(ui, &self.state);
                    });
                }
                Tab::Distribution => tables::distribution_grid(ui, &self.state),
            }
        });
    }
}
