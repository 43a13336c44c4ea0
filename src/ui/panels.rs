use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_stats::summary::Association;

use crate::state::{cost_columns, group_columns, AppState, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, the tab strip and the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open results folder…").clicked() {
                open_results_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in state.available_tabs() {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }

        ui.separator();

        if let Some(a) = &state.artifacts {
            ui.label(format!(
                "{}: {} rows, {} columns",
                a.manifest.dataset, a.manifest.rows, a.manifest.columns
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – per-tab controls
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.tab.title());
    ui.label(
        RichText::new(state.results_dir.display().to_string())
            .small()
            .weak(),
    );
    ui.separator();

    if state.artifacts.is_none() {
        ui.label("No summaries loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.tab {
            Tab::Univariate => column_list(ui, state),
            Tab::Bivariate => bivariate_filters(ui, state),
            Tab::Combinations => combination_filters(ui, state),
            Tab::Distribution => group_list(ui, state),
        });
}

fn column_list(ui: &mut Ui, state: &mut AppState) {
    let columns: Vec<(String, String)> = state
        .artifacts
        .iter()
        .flat_map(|a| &a.univariate)
        .map(|r| (r.column.clone(), r.kind.to_string()))
        .collect();

    for (column, kind) in columns {
        let selected = state.selected_column.as_deref() == Some(column.as_str());
        let text = format!("{column}  ({kind})");
        if ui.selectable_label(selected, text).clicked() {
            state.selected_column = Some(column);
        }
    }
}

fn bivariate_filters(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Measure");
    let current = state
        .measure_filter
        .map(|m| m.to_string())
        .unwrap_or_else(|| "all".to_string());
    egui::ComboBox::from_id_salt("measure_filter")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut state.measure_filter, None, "all");
            for m in [
                Association::Pearson,
                Association::CramersV,
                Association::CorrelationRatio,
            ] {
                ui.selectable_value(&mut state.measure_filter, Some(m), m.to_string());
            }
        });

    ui.add_space(8.0);
    ui.strong("Minimum |value|");
    ui.add(egui::Slider::new(&mut state.min_abs_value, 0.0..=1.0).step_by(0.05));
    ui.label(format!("{} pairs shown", state.visible_pairs().len()));
}

fn combination_filters(ui: &mut Ui, state: &mut AppState) {
    let Some(report) = state.artifacts.as_ref().and_then(|a| a.cohort.as_ref()) else {
        return;
    };
    let max_conditions = report.distribution.flag_names.len().max(1);
    let max_members = report
        .combinations
        .records
        .iter()
        .map(|r| r.member_count)
        .max()
        .unwrap_or(1)
        .max(1);
    let costs = cost_columns(&report.combinations);

    ui.strong("Number of conditions");
    ui.add(egui::Slider::new(
        &mut state.combination.conditions,
        1..=max_conditions,
    ));

    ui.strong("Minimum member count");
    ui.add(egui::Slider::new(&mut state.combination.min_members, 1..=max_members).logarithmic(true));

    ui.strong("Cost");
    let current = state.combination.cost_column.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("cost_column")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for column in costs {
                if ui.selectable_label(current == column, &column).clicked() {
                    state.combination.cost_column = Some(column);
                }
            }
        });
}

fn group_list(ui: &mut Ui, state: &mut AppState) {
    let groups = state
        .artifacts
        .as_ref()
        .and_then(|a| a.cohort.as_ref())
        .map(|c| group_columns(&c.distribution.rows))
        .unwrap_or_default();

    for group in groups {
        let selected = state.group_column.as_deref() == Some(group.as_str());
        if ui.selectable_label(selected, &group).clicked() {
            state.group_column = Some(group);
        }
    }
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_results_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open results folder")
        .set_directory(&state.results_dir)
        .pick_folder();

    if let Some(path) = folder {
        state.open(path);
    }
}
