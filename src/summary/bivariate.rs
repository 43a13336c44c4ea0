use std::fmt;

use serde::{Deserialize, Serialize};

use super::stats;
use crate::data::model::{Column, ColumnData, Dataset};

/// Association measure, chosen by the kinds of the two columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Association {
    /// numeric × numeric
    Pearson,
    /// categorical × categorical
    CramersV,
    /// numeric × categorical
    CorrelationRatio,
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Association::Pearson => write!(f, "pearson"),
            Association::CramersV => write!(f, "cramers_v"),
            Association::CorrelationRatio => write!(f, "correlation_ratio"),
        }
    }
}

/// One unordered column pair. `column_a` precedes `column_b` in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BivariateRecord {
    pub column_a: String,
    pub column_b: String,
    pub measure: Association,
    /// `None` when the measure is undefined for the observed data.
    pub value: Option<f64>,
    /// Rows where both cells are present.
    pub observations: usize,
}

/// Every unordered pair of columns, in dataset order.
pub fn summarize_pairs(dataset: &Dataset) -> Vec<BivariateRecord> {
    let columns = dataset.columns();
    let mut records = Vec::with_capacity(columns.len() * columns.len().saturating_sub(1) / 2);

    for (i, a) in columns.iter().enumerate() {
        for b in &columns[i + 1..] {
            records.push(associate(a, b));
        }
    }
    records
}

/// Pairwise-complete association between two columns of equal length.
pub fn associate(a: &Column, b: &Column) -> BivariateRecord {
    let (measure, value, observations) = match (&a.data, &b.data) {
        (ColumnData::Numeric(x), ColumnData::Numeric(y)) => {
            let (xs, ys): (Vec<f64>, Vec<f64>) = x
                .iter()
                .zip(y)
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                .unzip();
            (Association::Pearson, stats::pearson(&xs, &ys), xs.len())
        }
        (ColumnData::Categorical(x), ColumnData::Categorical(y)) => {
            let pairs: Vec<(&str, &str)> = x
                .iter()
                .zip(y)
                .filter_map(|(x, y)| Some((x.as_deref()?, y.as_deref()?)))
                .collect();
            (Association::CramersV, stats::cramers_v(&pairs), pairs.len())
        }
        (ColumnData::Numeric(num), ColumnData::Categorical(cat))
        | (ColumnData::Categorical(cat), ColumnData::Numeric(num)) => {
            let pairs: Vec<(&str, f64)> = cat
                .iter()
                .zip(num)
                .filter_map(|(g, y)| Some((g.as_deref()?, (*y)?)))
                .collect();
            (
                Association::CorrelationRatio,
                stats::correlation_ratio(&pairs),
                pairs.len(),
            )
        }
    };

    BivariateRecord {
        column_a: a.name.clone(),
        column_b: b.name.clone(),
        measure,
        value,
        observations,
    }
}
