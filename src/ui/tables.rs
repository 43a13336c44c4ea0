use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{diverging, heat, normalise, text_on};
use crate::state::{self, AppState};

const ROW_HEIGHT: f32 = 18.0;

fn number(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

fn count(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Striped table with a header row; `cells` yields one row of strings per index.
fn simple_table(ui: &mut Ui, id: &str, headers: &[&str], rows: usize, cells: impl Fn(usize) -> Vec<String>) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), headers.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in headers {
                    header.col(|ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|mut body| {
                for i in 0..rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        for cell in cells(i) {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Univariate tab
// ---------------------------------------------------------------------------

pub fn univariate_table(ui: &mut Ui, state: &AppState) {
    let Some(artifacts) = &state.artifacts else {
        return;
    };
    let rows = &artifacts.univariate;
    simple_table(
        ui,
        "univariate",
        &[
            "column", "kind", "count", "missing", "mean", "std", "min", "q25", "median", "q75",
            "max", "cardinality", "mode", "mode freq.",
        ],
        rows.len(),
        |i| {
            let r = &rows[i];
            vec![
                r.column.clone(),
                r.kind.to_string(),
                r.count.to_string(),
                r.missing.to_string(),
                number(r.mean),
                number(r.std),
                number(r.min),
                number(r.q25),
                number(r.median),
                number(r.q75),
                number(r.max),
                count(r.cardinality),
                r.mode.clone().unwrap_or_default(),
                count(r.mode_frequency),
            ]
        },
    );
}

pub fn frequency_table(ui: &mut Ui, state: &AppState) {
    let rows = state.selected_frequencies();
    if rows.is_empty() {
        return;
    }
    simple_table(ui, "frequencies", &["value", "count", "percent"], rows.len(), |i| {
        let r = rows[i];
        vec![r.value.clone(), r.count.to_string(), format!("{:.2}", r.percent)]
    });
}

// ---------------------------------------------------------------------------
// Bivariate tab
// ---------------------------------------------------------------------------

pub fn bivariate_table(ui: &mut Ui, state: &AppState) {
    let pairs = state.visible_pairs();
    if pairs.is_empty() {
        ui.label("No pairs pass the current filters.");
        return;
    }

    ui.push_id("bivariate", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(80.0), 5)
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in ["column a", "column b", "measure", "value", "observations"] {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, pairs.len(), |mut row| {
                    let r = pairs[row.index()];
                    row.col(|ui| {
                        ui.label(&r.column_a);
                    });
                    row.col(|ui| {
                        ui.label(&r.column_b);
                    });
                    row.col(|ui| {
                        ui.label(r.measure.to_string());
                    });
                    row.col(|ui| {
                        let bg = diverging(r.value);
                        let text = match r.value {
                            Some(v) => format!("{v:+.3}"),
                            None => "n/a".to_string(),
                        };
                        ui.label(RichText::new(text).background_color(bg).color(text_on(bg)));
                    });
                    row.col(|ui| {
                        ui.label(r.observations.to_string());
                    });
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Combinations tab
// ---------------------------------------------------------------------------

fn view_table(ui: &mut Ui, id: &str, state: &AppState, rows: &[state::CombinationView], cost: bool) {
    if rows.is_empty() {
        ui.label("No combinations found. Change the filter criteria.");
        return;
    }
    let headers: &[&str] = if cost {
        &["conditions", "members", "total cost", "cost per member"]
    } else {
        &["conditions", "occurrence", "% of members"]
    };
    simple_table(ui, id, headers, rows.len(), |i| {
        let r = &rows[i];
        let mut cells = vec![state.label_set(&r.conditions)];
        if cost {
            cells.push(r.members.to_string());
            cells.push(format!("{:.0}", r.cost));
            cells.push(format!("{:.0}", r.cost_per_member));
        } else {
            cells.push(r.occurrence.to_string());
            cells.push(format!("{:.1}", r.population_pct));
        }
        cells
    });
}

pub fn combination_views(ui: &mut Ui, state: &AppState) {
    let Some(report) = state.artifacts.as_ref().and_then(|a| a.cohort.as_ref()) else {
        return;
    };
    let table = &report.combinations;
    let filter = &state.combination;
    let cost_name = filter.cost_column.as_deref().unwrap_or("cost");

    ui.heading("Most common combinations");
    let common = state::most_common(table, filter);
    if let Some(top) = common.first() {
        ui.label(format!(
            "[{}] is the most common combination, occurring in {} members.",
            state.label_set(&top.conditions),
            top.occurrence
        ));
    }
    view_table(ui, "most_common", state, &common, false);

    ui.add_space(12.0);
    ui.heading(format!("Highest {cost_name}"));
    let costly = state::highest_cost(table, filter);
    view_table(ui, "highest_cost", state, &costly, true);

    ui.add_space(12.0);
    ui.heading(format!("Highest {cost_name} per member"));
    let per_member = state::highest_cost_per_member(table, filter);
    view_table(ui, "highest_per_member", state, &per_member, true);
    if !per_member.is_empty() {
        super::plot::cost_scatter(ui, state, &per_member);
    }
}

// ---------------------------------------------------------------------------
// Distribution tab
// ---------------------------------------------------------------------------

/// Cohorts as columns, population and flag shares as rows; each cohort
/// column is tinted on its own min-max scale.
pub fn distribution_grid(ui: &mut Ui, state: &AppState) {
    let rows = state.selected_distribution();
    let Some(report) = state.artifacts.as_ref().and_then(|a| a.cohort.as_ref()) else {
        return;
    };
    if rows.is_empty() {
        ui.label("No distribution for this group column.");
        return;
    }

    let mut measures = vec!["Population".to_string()];
    measures.extend(report.distribution.flag_names.iter().map(|f| state.label(f).to_string()));

    // cohort → values down the measures
    let columns: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| {
            let mut values = vec![r.population_pct];
            values.extend(&r.flag_shares);
            values
        })
        .collect();
    let scaled: Vec<Vec<f64>> = columns.iter().map(|c| normalise(c)).collect();

    egui::ScrollArea::both().show(ui, |ui: &mut Ui| {
        egui::Grid::new("distribution_grid")
            .spacing([4.0, 2.0])
            .show(ui, |ui: &mut Ui| {
                ui.strong("");
                for r in &rows {
                    ui.strong(&r.cohort);
                }
                ui.end_row();

                for (m, name) in measures.iter().enumerate() {
                    ui.strong(name);
                    for (values, shades) in columns.iter().zip(&scaled) {
                        let bg = heat(shades[m]);
                        ui.label(
                            RichText::new(format!("{:.1}", values[m]))
                                .background_color(bg)
                                .color(text_on(bg))
                                .monospace(),
                        );
                    }
                    ui.end_row();
                }
            });
    });
}
