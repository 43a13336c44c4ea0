use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

use rusty_stats::artifact::{self, FrequencyRow, LoadedArtifacts, UnivariateRow};
use rusty_stats::cohort::{CombinationRecord, CombinationTable, DistributionRow, SET_SEPARATOR};
use rusty_stats::summary::{Association, BivariateRecord};

/// Rows shown per combination view.
pub const TOP_N: usize = 5;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Univariate,
    Bivariate,
    Combinations,
    Distribution,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Univariate => "Univariate",
            Tab::Bivariate => "Bivariate",
            Tab::Combinations => "Combinations",
            Tab::Distribution => "Distribution",
        }
    }
}

// ---------------------------------------------------------------------------
// Combination views
// ---------------------------------------------------------------------------

/// Slider and selector values of the combinations tab.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinationFilter {
    /// Exact number of active conditions.
    pub conditions: usize,
    /// Minimum member count for the cost views.
    pub min_members: usize,
    /// Measure or total used as the cost.
    pub cost_column: Option<String>,
}

impl Default for CombinationFilter {
    fn default() -> Self {
        Self {
            conditions: 1,
            min_members: 1,
            cost_column: None,
        }
    }
}

/// One combination as shown in the views.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinationView {
    pub conditions: String,
    pub members: usize,
    pub occurrence: usize,
    /// Occurrence as a share of all members, one decimal.
    pub population_pct: f64,
    pub cost: f64,
    pub cost_per_member: f64,
}

/// Every measure and total of a table, in artifact column order.
pub fn cost_columns(table: &CombinationTable) -> Vec<String> {
    table
        .measure_names
        .iter()
        .chain(&table.total_names)
        .cloned()
        .collect()
}

/// The cost column with the largest grand total, i.e. the overall cost
/// when a total over every measure is configured.
pub fn default_cost_column(table: &CombinationTable) -> Option<String> {
    cost_columns(table)
        .into_iter()
        .map(|column| {
            let sum: f64 = table
                .records
                .iter()
                .filter_map(|r| cost_of(table, r, &column))
                .sum();
            (column, sum)
        })
        .fold(None, |best: Option<(String, f64)>, (column, sum)| match best {
            Some((_, top)) if top >= sum => best,
            _ => Some((column, sum)),
        })
        .map(|(column, _)| column)
}

fn cost_of(table: &CombinationTable, record: &CombinationRecord, column: &str) -> Option<f64> {
    if let Some(i) = table.measure_names.iter().position(|m| m == column) {
        return record.measure_sums.get(i).copied();
    }
    let i = table.total_names.iter().position(|t| t == column)?;
    record.totals.get(i).copied()
}

fn views(table: &CombinationTable, filter: &CombinationFilter) -> Vec<CombinationView> {
    let total_members: usize = table.records.iter().map(|r| r.member_count).sum();

    table
        .records
        .iter()
        .filter(|r| r.number_of_conditions == filter.conditions)
        .map(|r| {
            let cost = filter
                .cost_column
                .as_deref()
                .and_then(|c| cost_of(table, r, c))
                .unwrap_or(0.0);
            let occurrence = r.total_occurrence.unwrap_or(r.member_count);
            let population_pct = if total_members == 0 {
                0.0
            } else {
                (occurrence as f64 * 1000.0 / total_members as f64).round() / 10.0
            };
            CombinationView {
                conditions: r.active_conditions.clone(),
                members: r.member_count,
                occurrence,
                population_pct,
                cost,
                cost_per_member: if r.member_count == 0 {
                    0.0
                } else {
                    cost / r.member_count as f64
                },
            }
        })
        .collect()
}

fn top_by<F>(mut rows: Vec<CombinationView>, key: F) -> Vec<CombinationView>
where
    F: Fn(&CombinationView) -> f64,
{
    rows.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    rows.truncate(TOP_N);
    rows
}

/// Most frequent combinations with the selected number of conditions.
pub fn most_common(table: &CombinationTable, filter: &CombinationFilter) -> Vec<CombinationView> {
    top_by(views(table, filter), |v| v.occurrence as f64)
}

/// Combinations with the highest summed cost, ignoring small member counts.
pub fn highest_cost(table: &CombinationTable, filter: &CombinationFilter) -> Vec<CombinationView> {
    let rows = views(table, filter)
        .into_iter()
        .filter(|v| v.members >= filter.min_members)
        .collect();
    top_by(rows, |v| v.cost)
}

pub fn highest_cost_per_member(
    table: &CombinationTable,
    filter: &CombinationFilter,
) -> Vec<CombinationView> {
    let rows = views(table, filter)
        .into_iter()
        .filter(|v| v.members >= filter.min_members)
        .collect();
    top_by(rows, |v| v.cost_per_member)
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Directory the artifacts are read from.
    pub results_dir: PathBuf,

    /// Loaded artifacts (None until a results directory loads cleanly).
    pub artifacts: Option<LoadedArtifacts>,

    pub tab: Tab,

    /// Column shown in the univariate plot.
    pub selected_column: Option<String>,

    /// Bivariate filters: `None` shows every measure.
    pub measure_filter: Option<Association>,
    pub min_abs_value: f64,

    pub combination: CombinationFilter,

    /// Group column of the distribution heat grid.
    pub group_column: Option<String>,

    /// Display names for flag codes.
    pub labels: BTreeMap<String, String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(results_dir: PathBuf, labels: BTreeMap<String, String>) -> Self {
        Self {
            results_dir,
            artifacts: None,
            tab: Tab::Univariate,
            selected_column: None,
            measure_filter: None,
            min_abs_value: 0.0,
            combination: CombinationFilter::default(),
            group_column: None,
            labels,
            status_message: None,
        }
    }

    /// (Re)load the artifacts of `results_dir`. Failures land in the status line.
    pub fn reload(&mut self) {
        match artifact::load_all(&self.results_dir) {
            Ok(artifacts) => {
                log::info!(
                    "Loaded summaries of {} ({} rows, {} columns) from {}",
                    artifacts.manifest.dataset,
                    artifacts.manifest.rows,
                    artifacts.manifest.columns,
                    self.results_dir.display()
                );
                self.set_artifacts(artifacts);
            }
            Err(e) => {
                log::error!("Failed to load results: {e:#}");
                self.artifacts = None;
                self.status_message = Some(format!(
                    "No summaries in {}: {e}",
                    self.results_dir.display()
                ));
            }
        }
    }

    /// Point the dashboard at another results directory and load it.
    pub fn open(&mut self, results_dir: PathBuf) {
        self.results_dir = results_dir;
        self.reload();
    }

    /// Ingest freshly loaded artifacts and reset selections that no longer apply.
    pub fn set_artifacts(&mut self, artifacts: LoadedArtifacts) {
        let keep_column = self
            .selected_column
            .as_ref()
            .is_some_and(|c| artifacts.univariate.iter().any(|r| &r.column == c));
        if !keep_column {
            self.selected_column = artifacts.univariate.first().map(|r| r.column.clone());
        }

        if let Some(report) = &artifacts.cohort {
            let columns = cost_columns(&report.combinations);
            let keep_cost = self
                .combination
                .cost_column
                .as_ref()
                .is_some_and(|c| columns.contains(c));
            if !keep_cost {
                self.combination.cost_column = default_cost_column(&report.combinations);
            }
            let groups = group_columns(&report.distribution.rows);
            if !self.group_column.as_ref().is_some_and(|g| groups.contains(g)) {
                self.group_column = groups.into_iter().next();
            }
        }

        self.artifacts = Some(artifacts);
        if !self.available_tabs().contains(&self.tab) {
            self.tab = Tab::Univariate;
        }
        self.status_message = None;
    }

    /// Tabs backed by the loaded artifacts.
    pub fn available_tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Univariate, Tab::Bivariate];
        if self.artifacts.as_ref().is_some_and(|a| a.cohort.is_some()) {
            tabs.push(Tab::Combinations);
            tabs.push(Tab::Distribution);
        }
        tabs
    }

    /// Display name of a flag code; unknown codes are shown as-is.
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        self.labels.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Display form of a joined set of flag codes.
    pub fn label_set(&self, set: &str) -> String {
        set.split(SET_SEPARATOR)
            .map(|code| self.label(code.trim()))
            .collect::<Vec<_>>()
            .join(SET_SEPARATOR)
    }

    pub fn selected_summary(&self) -> Option<&UnivariateRow> {
        let artifacts = self.artifacts.as_ref()?;
        let column = self.selected_column.as_ref()?;
        artifacts.univariate.iter().find(|r| &r.column == column)
    }

    /// Frequency rows of the selected column, most frequent first.
    pub fn selected_frequencies(&self) -> Vec<&FrequencyRow> {
        match (&self.artifacts, &self.selected_column) {
            (Some(a), Some(column)) => a
                .frequencies
                .iter()
                .filter(|f| &f.column == column)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Pair records passing the measure and |value| filters.
    pub fn visible_pairs(&self) -> Vec<&BivariateRecord> {
        let Some(artifacts) = &self.artifacts else {
            return Vec::new();
        };
        artifacts
            .bivariate
            .iter()
            .filter(|r| self.measure_filter.map_or(true, |m| r.measure == m))
            .filter(|r| match r.value {
                Some(v) => v.abs() >= self.min_abs_value,
                None => self.min_abs_value <= 0.0,
            })
            .collect()
    }

    /// Distribution rows of the selected group column.
    pub fn selected_distribution(&self) -> Vec<&DistributionRow> {
        let (Some(artifacts), Some(group)) = (&self.artifacts, &self.group_column) else {
            return Vec::new();
        };
        artifacts
            .cohort
            .iter()
            .flat_map(|c| &c.distribution.rows)
            .filter(|r| &r.group_column == group)
            .collect()
    }
}

/// Distinct group columns, in artifact order.
pub fn group_columns(rows: &[DistributionRow]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for row in rows {
        if !groups.contains(&row.group_column) {
            groups.push(row.group_column.clone());
        }
    }
    groups
}
