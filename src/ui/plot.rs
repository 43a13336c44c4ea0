use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use rusty_stats::artifact::{FrequencyRow, UnivariateRow};
use rusty_stats::data::model::ColumnKind;

use crate::color::generate_palette;
use crate::state::{AppState, CombinationView};

// ---------------------------------------------------------------------------
// Univariate plot
// ---------------------------------------------------------------------------

/// Box plot for a numeric column, frequency bars for a categorical one.
pub fn column_plot(ui: &mut Ui, state: &AppState) {
    let Some(summary) = state.selected_summary() else {
        ui.label("Select a column on the left.");
        return;
    };

    match summary.kind {
        ColumnKind::Numeric => box_plot(ui, summary),
        ColumnKind::Categorical => frequency_plot(ui, &summary.column, &state.selected_frequencies()),
    }
}

fn box_plot(ui: &mut Ui, summary: &UnivariateRow) {
    let (Some(min), Some(q25), Some(median), Some(q75), Some(max)) = (
        summary.min,
        summary.q25,
        summary.median,
        summary.q75,
        summary.max,
    ) else {
        ui.label(format!("{} has no values.", summary.column));
        return;
    };

    let elem = BoxElem::new(0.0, BoxSpread::new(min, q25, median, q75, max))
        .name(&summary.column)
        .box_width(0.5)
        .fill(Color32::LIGHT_BLUE.linear_multiply(0.3))
        .stroke(Stroke::new(1.5, Color32::LIGHT_BLUE));

    Plot::new("box_plot")
        .legend(Legend::default())
        .y_axis_label(&summary.column)
        .show_x(false)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&summary.column));
        });
}

fn frequency_plot(ui: &mut Ui, column: &str, rows: &[&FrequencyRow]) {
    if rows.is_empty() {
        ui.label(format!("{column} has no values."));
        return;
    }
    let palette = generate_palette(rows.len());

    let bars: Vec<Bar> = rows
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, (row, color))| {
            Bar::new(i as f64, row.count as f64)
                .name(format!("{} ({:.1}%)", row.value, row.percent))
                .fill(color)
        })
        .collect();

    Plot::new("frequency_plot")
        .x_axis_label(column)
        .y_axis_label("Count")
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(column));
        });
}

// ---------------------------------------------------------------------------
// Combination scatter
// ---------------------------------------------------------------------------

/// Cost per member against member count of the top combinations.
pub fn cost_scatter(ui: &mut Ui, state: &AppState, rows: &[CombinationView]) {
    Plot::new("cost_scatter")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Cost per member")
        .y_axis_label("Members")
        .show(ui, |plot_ui| {
            for (row, color) in rows.iter().zip(generate_palette(rows.len())) {
                let points = PlotPoints::from(vec![[row.cost_per_member, row.members as f64]]);
                plot_ui.points(
                    Points::new(points)
                        .name(state.label_set(&row.conditions))
                        .color(color)
                        .radius(6.0),
                );
            }
        });
}
