//! Property-based checks of the summary tables.

use std::collections::BTreeSet;

use proptest::prelude::*;

use rusty_stats::data::model::{Column, Dataset};
use rusty_stats::summary::{summarize, Association, ColumnStats};

/// One column of `rows` cells, numeric or categorical, with some missing.
fn column(index: usize, rows: usize) -> impl Strategy<Value = Column> {
    prop_oneof![
        prop::collection::vec(prop::option::weighted(0.85, -1000i32..1000), rows).prop_map(
            move |cells| {
                Column::numeric(
                    format!("n{index}"),
                    cells.into_iter().map(|c| c.map(f64::from)).collect(),
                )
            }
        ),
        prop::collection::vec(prop::option::weighted(0.85, "[a-d]"), rows)
            .prop_map(move |cells| Column::categorical(format!("c{index}"), cells)),
    ]
}

fn dataset() -> impl Strategy<Value = Dataset> {
    (0usize..6, 0usize..25).prop_flat_map(|(width, rows)| {
        (0..width)
            .map(|i| column(i, rows))
            .collect::<Vec<_>>()
            .prop_map(|columns| Dataset::new(columns).unwrap())
    })
}

proptest! {
    #[test]
    fn one_univariate_record_per_column(ds in dataset()) {
        let set = summarize(&ds);
        let names: Vec<&str> = set.univariate.iter().map(|u| u.column.as_str()).collect();
        let expected: Vec<&str> = ds.column_names().collect();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn one_bivariate_record_per_unordered_pair(ds in dataset()) {
        let n = ds.column_count();
        let set = summarize(&ds);
        prop_assert_eq!(set.bivariate.len(), n * n.saturating_sub(1) / 2);

        let pairs: BTreeSet<(String, String)> = set
            .bivariate
            .iter()
            .map(|r| (r.column_a.clone(), r.column_b.clone()))
            .collect();
        prop_assert_eq!(pairs.len(), set.bivariate.len());
        for r in &set.bivariate {
            prop_assert_ne!(&r.column_a, &r.column_b);
            prop_assert!(!pairs.contains(&(r.column_b.clone(), r.column_a.clone())));
        }
    }

    #[test]
    fn counts_cover_every_row(ds in dataset()) {
        let rows = ds.row_count();
        for u in summarize(&ds).univariate {
            let (count, missing) = match &u.stats {
                ColumnStats::Numeric(s) => (s.count, s.missing),
                ColumnStats::Categorical(s) => {
                    let listed: usize = s.frequencies.iter().map(|f| f.count).sum();
                    prop_assert_eq!(listed, s.count);
                    prop_assert_eq!(s.cardinality, s.frequencies.len());
                    (s.count, s.missing)
                }
            };
            prop_assert_eq!(count + missing, rows);
        }
    }

    #[test]
    fn quartiles_are_ordered(ds in dataset()) {
        for u in summarize(&ds).univariate {
            if let ColumnStats::Numeric(s) = u.stats {
                if let (Some(min), Some(q25), Some(median), Some(q75), Some(max)) =
                    (s.min, s.q25, s.median, s.q75, s.max)
                {
                    prop_assert!(min <= q25 && q25 <= median && median <= q75 && q75 <= max);
                } else {
                    prop_assert_eq!(s.count, 0);
                }
            }
        }
    }

    #[test]
    fn measures_stay_in_range(ds in dataset()) {
        for r in summarize(&ds).bivariate {
            if let Some(v) = r.value {
                let lower = match r.measure {
                    Association::Pearson => -1.0,
                    Association::CramersV | Association::CorrelationRatio => 0.0,
                };
                prop_assert!((lower..=1.0).contains(&v), "{} out of range: {}", r.measure, v);
            }
        }
    }
}

#[test]
fn empty_dataset_has_empty_summaries() {
    let set = summarize(&Dataset::default());
    assert!(set.is_empty());
}
