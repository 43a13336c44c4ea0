use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::stats;
use crate::data::model::{Column, ColumnData, ColumnKind};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Non-missing cells.
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// One row of a categorical frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
    /// Share of the non-missing cells, 0–100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub missing: usize,
    /// Number of distinct non-missing values.
    pub cardinality: usize,
    pub mode: Option<String>,
    pub mode_frequency: Option<usize>,
    /// Sorted by count descending, then value ascending.
    pub frequencies: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStats {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// The univariate record of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct UnivariateSummary {
    pub column: String,
    pub stats: ColumnStats,
}

impl UnivariateSummary {
    pub fn kind(&self) -> ColumnKind {
        match self.stats {
            ColumnStats::Numeric(_) => ColumnKind::Numeric,
            ColumnStats::Categorical(_) => ColumnKind::Categorical,
        }
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

pub fn summarize_column(column: &Column) -> UnivariateSummary {
    let stats = match &column.data {
        ColumnData::Numeric(values) => ColumnStats::Numeric(summarize_numeric(values)),
        ColumnData::Categorical(values) => {
            ColumnStats::Categorical(summarize_categorical(values))
        }
    };
    UnivariateSummary {
        column: column.name.clone(),
        stats,
    }
}

pub fn summarize_numeric(values: &[Option<f64>]) -> NumericSummary {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    let missing = values.len() - present.len();

    // mean/std in file order; quartiles need sorted values
    let mean = stats::mean(&present);
    let std = stats::sample_std(&present);
    present.sort_by(f64::total_cmp);

    NumericSummary {
        count: present.len(),
        missing,
        mean,
        std,
        min: present.first().copied(),
        q25: stats::quantile_sorted(&present, 0.25),
        median: stats::quantile_sorted(&present, 0.5),
        q75: stats::quantile_sorted(&present, 0.75),
        max: present.last().copied(),
    }
}

pub fn summarize_categorical(values: &[Option<String>]) -> CategoricalSummary {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut count = 0usize;
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_default() += 1;
        count += 1;
    }

    let mut frequencies: Vec<FrequencyEntry> = counts
        .into_iter()
        .map(|(value, n)| FrequencyEntry {
            value: value.to_string(),
            count: n,
            percent: 100.0 * n as f64 / count as f64,
        })
        .collect();
    // BTreeMap already yields values ascending; a stable sort keeps that for ties.
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));

    CategoricalSummary {
        count,
        missing: values.len() - count,
        cardinality: frequencies.len(),
        mode: frequencies.first().map(|f| f.value.clone()),
        mode_frequency: frequencies.first().map(|f| f.count),
        frequencies,
    }
}
