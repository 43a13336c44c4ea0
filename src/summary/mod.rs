//! Summary generation: one univariate record per column and one bivariate
//! record per unordered column pair.
//!
//! Both tables are pure functions of the [`Dataset`]; persisting them is the
//! job of [`crate::artifact`].

pub mod bivariate;
pub mod stats;
pub mod univariate;

use crate::data::model::Dataset;

pub use bivariate::{Association, BivariateRecord};
pub use univariate::{
    CategoricalSummary, ColumnStats, FrequencyEntry, NumericSummary, UnivariateSummary,
};

/// Both summary tables of one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarySet {
    pub univariate: Vec<UnivariateSummary>,
    pub bivariate: Vec<BivariateRecord>,
}

impl SummarySet {
    pub fn is_empty(&self) -> bool {
        self.univariate.is_empty() && self.bivariate.is_empty()
    }
}

/// Summarise every column and every unordered column pair.
///
/// A dataset without columns yields an empty set.
pub fn summarize(dataset: &Dataset) -> SummarySet {
    let univariate: Vec<_> = dataset
        .columns()
        .iter()
        .map(univariate::summarize_column)
        .collect();
    let bivariate = bivariate::summarize_pairs(dataset);

    log::debug!(
        "Summarised {} columns and {} column pairs over {} rows",
        univariate.len(),
        bivariate.len(),
        dataset.row_count()
    );

    SummarySet {
        univariate,
        bivariate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    #[test]
    fn empty_dataset_gives_empty_summaries() {
        let set = summarize(&Dataset::default());
        assert!(set.univariate.is_empty());
        assert!(set.bivariate.is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn columns_without_rows_are_still_summarised() {
        let ds = Dataset::new(vec![
            Column::numeric("a", vec![]),
            Column::categorical("b", vec![]),
        ])
        .unwrap();
        let set = summarize(&ds);
        assert_eq!(set.univariate.len(), 2);
        assert_eq!(set.bivariate.len(), 1);
        assert_eq!(set.bivariate[0].value, None);
        assert_eq!(set.bivariate[0].observations, 0);
    }

    #[test]
    fn infinite_cells_never_leak_into_measures() {
        let ds = crate::data::loader::load_csv_str(
            "a,b\n1,1\ninf,2\n3,3\n",
            &crate::data::loader::LoaderOptions::default(),
        )
        .unwrap();
        let set = summarize(&ds);
        let pair = &set.bivariate[0];
        assert_eq!(pair.measure, Association::CorrelationRatio);
        let value = pair.value.unwrap();
        assert!((0.0..=1.0).contains(&value));

        let raw = Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0), Some(f64::INFINITY), Some(3.0)]),
            Column::numeric("y", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        let set = summarize(&raw);
        assert_eq!(set.bivariate[0].value, None);
        match &set.univariate[0].stats {
            ColumnStats::Numeric(s) => {
                assert_eq!(s.mean, None);
                assert_eq!(s.std, None);
            }
            other => panic!("unexpected stats: {other:?}"),
        }
    }
}
