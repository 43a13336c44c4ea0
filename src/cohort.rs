//! Cohort analysis over 0/1 flag columns (e.g. chronic-condition indicators).
//!
//! Two tables come out of it:
//! * a combination table: rows grouped by their exact set of active flags,
//!   with member counts, summed measures and how often the set occurs as a
//!   subset of some row's active flags;
//! * a distribution table: per group column and cohort, the share of the
//!   whole population and of each flag's population.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{AgeBands, CohortConfig};
use crate::data::model::{Column, ColumnData, Dataset, Value};
use crate::error::{StatsError, StatsResult};

/// Label separator inside an active set, e.g. `SP_CHF, SP_COPD`.
pub const SET_SEPARATOR: &str = ", ";

/// Name of the derived group column counting active flags per row.
pub const TOTAL_CONDITIONS: &str = "total_conditions";

/// Name of the derived group column built from [`AgeBands`].
pub const AGE_BUCKET: &str = "age_bucket";

/// Active sets above this size would make subset counting explode.
const MAX_FLAGS: usize = 24;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Numeric columns whose name contains the flag pattern, minus exclusions.
pub fn flag_columns<'a>(dataset: &'a Dataset, config: &CohortConfig) -> Vec<&'a Column> {
    dataset
        .columns()
        .iter()
        .filter(|c| c.name.contains(&config.flag_pattern))
        .filter(|c| !config.exclude.contains(&c.name))
        .filter(|c| {
            let numeric = c.as_numeric().is_some();
            if !numeric {
                log::warn!("Skipping non-numeric flag column {}", c.name);
            }
            numeric
        })
        .collect()
}

/// Per row, the names of the active flags in column order.
pub fn active_flags(flags: &[&Column], row_count: usize, active_value: f64) -> Vec<Vec<String>> {
    (0..row_count)
        .map(|row| {
            flags
                .iter()
                .filter(|col| {
                    col.as_numeric()
                        .and_then(|values| values[row])
                        .is_some_and(|v| v == active_value)
                })
                .map(|col| col.name.clone())
                .collect()
        })
        .collect()
}

/// Counts every non-empty subset of every row's active set once per row.
/// Keys are sorted flag names.
pub fn count_combinations(rows: &[Vec<String>]) -> BTreeMap<Vec<String>, usize> {
    let mut counts = BTreeMap::new();
    for active in rows {
        let mut sorted = active.clone();
        sorted.sort();
        let n = sorted.len();
        for mask in 1u64..(1u64 << n) {
            let combo: Vec<String> = (0..n)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| sorted[bit].clone())
                .collect();
            *counts.entry(combo).or_insert(0) += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Combination table
// ---------------------------------------------------------------------------

/// Rows sharing one exact active set.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinationRecord {
    /// Joined active set, or the configured none-label.
    pub active_conditions: String,
    pub member_count: usize,
    /// One sum per configured measure, in configuration order.
    pub measure_sums: Vec<f64>,
    /// One value per configured total, in name order.
    pub totals: Vec<f64>,
    pub number_of_conditions: usize,
    /// Rows whose active set contains this set; `None` for the empty set.
    pub total_occurrence: Option<usize>,
    pub condition_band: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinationTable {
    pub measure_names: Vec<String>,
    pub total_names: Vec<String>,
    pub records: Vec<CombinationRecord>,
}

impl CombinationTable {
    /// Column headers in artifact order.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["active_conditions_str".to_string(), "member_count".to_string()];
        headers.extend(self.measure_names.iter().cloned());
        headers.extend(self.total_names.iter().cloned());
        headers.extend(
            [
                "number_of_conditions",
                "total_occurrence",
                "chronic_condition_count",
            ]
            .map(String::from),
        );
        headers
    }
}

fn condition_band(n: usize) -> &'static str {
    if n < 3 {
        "<3"
    } else {
        "Multiple"
    }
}

/// Group rows by their exact active set and aggregate the configured measures.
pub fn aggregate_by_active_set(
    dataset: &Dataset,
    active: &[Vec<String>],
    config: &CohortConfig,
) -> StatsResult<CombinationTable> {
    let measures: Vec<&[Option<f64>]> = config
        .measures
        .iter()
        .map(|name| {
            dataset
                .column(name)
                .ok_or_else(|| StatsError::MissingColumn(name.clone()))
                .and_then(|column| {
                    column
                        .as_numeric()
                        .ok_or_else(|| StatsError::NotNumeric(name.clone()))
                })
        })
        .collect::<StatsResult<_>>()?;

    let totals: Vec<(String, Vec<usize>)> = config
        .totals
        .iter()
        .map(|(name, parts)| -> StatsResult<(String, Vec<usize>)> {
            let indices = parts
                .iter()
                .map(|part| {
                    config.measures.iter().position(|m| m == part).ok_or_else(|| {
                        StatsError::InvalidConfig(format!(
                            "total '{name}' refers to '{part}', which is not a configured measure"
                        ))
                    })
                })
                .collect::<StatsResult<Vec<_>>>()?;
            Ok((name.clone(), indices))
        })
        .collect::<StatsResult<_>>()?;

    let occurrences = count_combinations(active);

    // label → (sorted set, member count, measure sums)
    let mut groups: BTreeMap<String, (Vec<String>, usize, Vec<f64>)> = BTreeMap::new();
    for (row, set) in active.iter().enumerate() {
        let label = if set.is_empty() {
            config.none_label.clone()
        } else {
            set.join(SET_SEPARATOR)
        };
        let entry = groups.entry(label).or_insert_with(|| {
            let mut sorted = set.clone();
            sorted.sort();
            (sorted, 0, vec![0.0; measures.len()])
        });
        entry.1 += 1;
        for (sum, values) in entry.2.iter_mut().zip(&measures) {
            if let Some(v) = values[row] {
                *sum += v;
            }
        }
    }

    let mut records: Vec<CombinationRecord> = groups
        .into_iter()
        .map(|(label, (sorted, member_count, measure_sums))| {
            let totals = totals
                .iter()
                .map(|(_, idx)| idx.iter().map(|&i| measure_sums[i]).sum())
                .collect();
            let number_of_conditions = sorted.len();
            let total_occurrence = if sorted.is_empty() {
                None
            } else {
                occurrences.get(&sorted).copied()
            };
            CombinationRecord {
                active_conditions: label,
                member_count,
                measure_sums,
                totals,
                number_of_conditions,
                total_occurrence,
                condition_band: condition_band(number_of_conditions).to_string(),
            }
        })
        .collect();
    // groups were label-ordered; a stable sort keeps that for equal counts
    records.sort_by(|a, b| b.member_count.cmp(&a.member_count));

    Ok(CombinationTable {
        measure_names: config.measures.clone(),
        total_names: totals.into_iter().map(|(name, _)| name).collect(),
        records,
    })
}

// ---------------------------------------------------------------------------
// Distribution table
// ---------------------------------------------------------------------------

/// Per-row cohort keys of one group column.
#[derive(Debug, Clone)]
pub struct Grouping {
    pub name: String,
    pub keys: Vec<Option<Value>>,
    /// Display labels for integer bucket keys.
    pub bucket_labels: Option<Vec<String>>,
}

impl Grouping {
    pub fn from_column(column: &Column) -> Self {
        let keys = match &column.data {
            ColumnData::Numeric(values) => values.iter().map(|v| v.map(Value::Float)).collect(),
            ColumnData::Categorical(values) => values
                .iter()
                .map(|v| v.as_ref().map(|s| Value::String(s.clone())))
                .collect(),
        };
        Self {
            name: column.name.clone(),
            keys,
            bucket_labels: None,
        }
    }

    /// Number of active flags per row.
    pub fn total_conditions(active: &[Vec<String>]) -> Self {
        Self {
            name: TOTAL_CONDITIONS.to_string(),
            keys: active
                .iter()
                .map(|set| Some(Value::Integer(set.len() as i64)))
                .collect(),
            bucket_labels: None,
        }
    }

    /// Age at `reference_year` from a `YYYYMMDD` birth date, bucketed by
    /// half-open ranges starting at each edge. Ages below the first edge
    /// are left out.
    pub fn age_buckets(dataset: &Dataset, bands: &AgeBands) -> StatsResult<Self> {
        if bands.edges.is_empty() || bands.edges.len() != bands.labels.len() {
            return Err(StatsError::InvalidConfig(format!(
                "age bands need one label per edge ({} edges, {} labels)",
                bands.edges.len(),
                bands.labels.len()
            )));
        }
        let births = dataset
            .column(&bands.birth_date_column)
            .ok_or_else(|| StatsError::MissingColumn(bands.birth_date_column.clone()))?
            .as_numeric()
            .ok_or_else(|| StatsError::NotNumeric(bands.birth_date_column.clone()))?;

        let keys = births
            .iter()
            .map(|birth| {
                let year = ((*birth)? / 10_000.0).floor();
                let age = f64::from(bands.reference_year) - year;
                let idx = bands.edges.iter().rposition(|&edge| age >= edge)?;
                Some(Value::Integer(idx as i64))
            })
            .collect();

        Ok(Self {
            name: AGE_BUCKET.to_string(),
            keys,
            bucket_labels: Some(bands.labels.clone()),
        })
    }

    fn label(&self, key: &Value) -> String {
        match (key, &self.bucket_labels) {
            (Value::Integer(i), Some(labels)) => usize::try_from(*i)
                .ok()
                .and_then(|i| labels.get(i).cloned())
                .unwrap_or_else(|| key.to_string()),
            _ => key.to_string(),
        }
    }
}

/// One cohort of one group column.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRow {
    pub group_column: String,
    pub cohort: String,
    /// Share of all rows, rounded to 2 decimals.
    pub population_pct: f64,
    /// Per flag, share of that flag's population in this cohort, rounded to 1 decimal.
    pub flag_shares: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionTable {
    pub flag_names: Vec<String>,
    pub rows: Vec<DistributionRow>,
}

impl DistributionTable {
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            "Group Column".to_string(),
            "Cohort".to_string(),
            "% of Total Population".to_string(),
        ];
        headers.extend(
            self.flag_names
                .iter()
                .map(|flag| format!("% of {flag} Population")),
        );
        headers
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Distribution rows of one grouping, cohorts in key order.
pub fn group_distribution(
    grouping: &Grouping,
    flag_names: &[String],
    active: &[Vec<String>],
) -> Vec<DistributionRow> {
    let total = grouping.keys.len();
    let mut base: BTreeMap<&Value, usize> = BTreeMap::new();
    for key in grouping.keys.iter().flatten() {
        *base.entry(key).or_default() += 1;
    }

    // flag → (cohort counts, rows with a group key)
    let per_flag: Vec<(BTreeMap<&Value, usize>, usize)> = flag_names
        .iter()
        .map(|flag| {
            let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
            let mut population = 0usize;
            for (key, set) in grouping.keys.iter().zip(active) {
                if let Some(key) = key {
                    if set.contains(flag) {
                        *counts.entry(key).or_default() += 1;
                        population += 1;
                    }
                }
            }
            (counts, population)
        })
        .collect();

    base.into_iter()
        .map(|(key, count)| {
            let flag_shares = per_flag
                .iter()
                .map(|(counts, population)| {
                    if *population == 0 {
                        return 0.0;
                    }
                    let n = counts.get(key).copied().unwrap_or(0);
                    round_to(100.0 * n as f64 / *population as f64, 1)
                })
                .collect();
            DistributionRow {
                group_column: grouping.name.clone(),
                cohort: grouping.label(key),
                population_pct: round_to(100.0 * count as f64 / total as f64, 2),
                flag_shares,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortReport {
    pub combinations: CombinationTable,
    pub distribution: DistributionTable,
}

/// Run the whole cohort analysis. `None` when the dataset has no flag columns.
pub fn analyze(dataset: &Dataset, config: &CohortConfig) -> StatsResult<Option<CohortReport>> {
    let flags = flag_columns(dataset, config);
    if flags.is_empty() {
        log::warn!(
            "No flag columns match '{}'; skipping cohort analysis",
            config.flag_pattern
        );
        return Ok(None);
    }
    if flags.len() > MAX_FLAGS {
        return Err(StatsError::InvalidConfig(format!(
            "{} flag columns match '{}'; at most {MAX_FLAGS} are supported",
            flags.len(),
            config.flag_pattern
        )));
    }
    let flag_names: Vec<String> = flags.iter().map(|c| c.name.clone()).collect();
    log::info!("Flag columns identified: {flag_names:?}");

    let active = active_flags(&flags, dataset.row_count(), config.active_value);
    let combinations = aggregate_by_active_set(dataset, &active, config)?;

    // derived groupings sit where they are listed, otherwise after the columns
    let mut groupings = Vec::new();
    let mut seen = BTreeSet::new();
    for name in &config.group_columns {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match (name.as_str(), dataset.column(name)) {
            (TOTAL_CONDITIONS, _) => groupings.push(Grouping::total_conditions(&active)),
            (AGE_BUCKET, _) => match &config.age {
                Some(bands) => groupings.push(Grouping::age_buckets(dataset, bands)?),
                None => log::warn!("{AGE_BUCKET} listed without [cohort.age]; skipping"),
            },
            (_, Some(column)) => groupings.push(Grouping::from_column(column)),
            (_, None) => log::warn!("Group column {name} not found; skipping"),
        }
    }
    if !seen.contains(TOTAL_CONDITIONS) {
        groupings.push(Grouping::total_conditions(&active));
    }
    if let (Some(bands), false) = (&config.age, seen.contains(AGE_BUCKET)) {
        groupings.push(Grouping::age_buckets(dataset, bands)?);
    }

    let rows = groupings
        .iter()
        .flat_map(|g| group_distribution(g, &flag_names, &active))
        .collect();

    Ok(Some(CohortReport {
        combinations,
        distribution: DistributionTable { flag_names, rows },
    }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn flags_dataset() -> Dataset {
        // SP_A/SP_B are flags (1 = yes, 2 = no); SP_STATE_CODE is not.
        Dataset::new(vec![
            Column::categorical(
                "sex",
                vec![Some("F".into()), Some("M".into()), Some("F".into()), Some("F".into())],
            ),
            Column::numeric("SP_A", vec![Some(1.0), Some(1.0), Some(2.0), Some(2.0)]),
            Column::numeric("SP_B", vec![Some(1.0), Some(2.0), Some(2.0), Some(1.0)]),
            Column::numeric("SP_STATE_CODE", vec![Some(5.0), Some(5.0), Some(1.0), Some(1.0)]),
            Column::numeric("cost", vec![Some(10.0), Some(20.0), Some(5.0), None]),
            Column::numeric("birth", vec![Some(19400101.0), Some(19300615.0), None, Some(19500101.0)]),
        ])
        .unwrap()
    }

    fn config() -> CohortConfig {
        CohortConfig {
            measures: vec!["cost".to_string()],
            totals: [("total_cost".to_string(), vec!["cost".to_string()])]
                .into_iter()
                .collect(),
            group_columns: vec!["sex".to_string()],
            ..CohortConfig::default()
        }
    }

    #[test]
    fn flags_follow_pattern_and_exclusions() {
        let ds = flags_dataset();
        let names: Vec<_> = flag_columns(&ds, &config())
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["SP_A", "SP_B"]);
    }

    #[test]
    fn combinations_count_every_subset() {
        let rows = vec![
            vec!["B".to_string(), "A".to_string()],
            vec!["A".to_string()],
            vec![],
        ];
        let counts = count_combinations(&rows);
        assert_eq!(counts.get(&vec!["A".to_string()]), Some(&2));
        assert_eq!(counts.get(&vec!["B".to_string()]), Some(&1));
        assert_eq!(counts.get(&vec!["A".to_string(), "B".to_string()]), Some(&1));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn active_sets_are_aggregated() {
        let ds = flags_dataset();
        let config = config();
        let flags = flag_columns(&ds, &config);
        let active = active_flags(&flags, ds.row_count(), config.active_value);
        assert_eq!(
            active,
            vec![
                vec!["SP_A".to_string(), "SP_B".to_string()],
                vec!["SP_A".to_string()],
                vec![],
                vec!["SP_B".to_string()],
            ]
        );

        let table = aggregate_by_active_set(&ds, &active, &config).unwrap();
        assert_eq!(table.total_names, vec!["total_cost"]);
        let labels: Vec<_> = table
            .records
            .iter()
            .map(|r| r.active_conditions.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["NO CHRONIC CONDITIONS", "SP_A", "SP_A, SP_B", "SP_B"]
        );

        let both = &table.records[2];
        assert_eq!(both.member_count, 1);
        assert_eq!(both.measure_sums, vec![10.0]);
        assert_eq!(both.totals, vec![10.0]);
        assert_eq!(both.number_of_conditions, 2);
        assert_eq!(both.total_occurrence, Some(1));
        assert_eq!(both.condition_band, "<3");

        let only_a = &table.records[1];
        assert_eq!(only_a.total_occurrence, Some(2));

        let none = &table.records[0];
        assert_eq!(none.total_occurrence, None);
        assert_eq!(none.measure_sums, vec![5.0]);

        let only_b = &table.records[3];
        assert_eq!(only_b.measure_sums, vec![0.0]);
    }

    #[test]
    fn totals_must_reference_measures() {
        let ds = flags_dataset();
        let mut config = config();
        config
            .totals
            .insert("bad".to_string(), vec!["nope".to_string()]);
        let err = aggregate_by_active_set(&ds, &[vec![], vec![], vec![], vec![]], &config)
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfig(_)));
    }

    #[test]
    fn distribution_shares_by_group() {
        let ds = flags_dataset();
        let report = analyze(&ds, &config()).unwrap().expect("flags present");
        let dist = report.distribution;
        assert_eq!(dist.flag_names, vec!["SP_A", "SP_B"]);
        assert_eq!(
            dist.headers()[3..].to_vec(),
            vec![
                "% of SP_A Population".to_string(),
                "% of SP_B Population".to_string()
            ]
        );

        let sex: Vec<_> = dist.rows.iter().filter(|r| r.group_column == "sex").collect();
        assert_eq!(sex.len(), 2);
        assert_eq!(sex[0].cohort, "F");
        assert_eq!(sex[0].population_pct, 75.0);
        // SP_A population: rows 0 (F) and 1 (M)
        assert_eq!(sex[0].flag_shares, vec![50.0, 100.0]);
        assert_eq!(sex[1].cohort, "M");
        assert_eq!(sex[1].flag_shares, vec![50.0, 0.0]);

        let totals: Vec<_> = dist
            .rows
            .iter()
            .filter(|r| r.group_column == TOTAL_CONDITIONS)
            .map(|r| (r.cohort.as_str(), r.population_pct))
            .collect();
        assert_eq!(totals, vec![("0", 25.0), ("1", 50.0), ("2", 25.0)]);
    }

    #[test]
    fn age_buckets_use_reference_year() {
        let ds = flags_dataset();
        let bands = AgeBands {
            birth_date_column: "birth".to_string(),
            reference_year: 2008,
            edges: vec![0.0, 65.0, 75.0],
            labels: vec!["<65".into(), "65 - 74".into(), "75+".into()],
        };
        let grouping = Grouping::age_buckets(&ds, &bands).unwrap();
        // ages 68, 78, missing, 58
        assert_eq!(
            grouping.keys,
            vec![
                Some(Value::Integer(1)),
                Some(Value::Integer(2)),
                None,
                Some(Value::Integer(0)),
            ]
        );

        let rows = group_distribution(&grouping, &[], &[vec![], vec![], vec![], vec![]]);
        let cohorts: Vec<_> = rows.iter().map(|r| r.cohort.as_str()).collect();
        assert_eq!(cohorts, vec!["<65", "65 - 74", "75+"]);
    }

    #[test]
    fn shipped_age_edges_are_left_closed() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::config::DEFAULT_CONFIG_FILE);
        let bands = crate::config::load_config(Some(&path))
            .unwrap()
            .cohort
            .and_then(|c| c.age)
            .expect("age bands");

        // ages 64, 69, 63, 89 at 2008
        let ds = Dataset::new(vec![Column::numeric(
            &bands.birth_date_column,
            vec![Some(19440101.0), Some(19390101.0), Some(19450101.0), Some(19190101.0)],
        )])
        .unwrap();
        let grouping = Grouping::age_buckets(&ds, &bands).unwrap();
        let labels: Vec<_> = grouping
            .keys
            .iter()
            .map(|k| grouping.label(k.as_ref().unwrap()))
            .collect();
        assert_eq!(labels, vec!["65 - 69", "70 - 74", "25 - 64", "90+"]);
    }

    #[test]
    fn listed_derived_groups_keep_their_position() {
        let ds = flags_dataset();
        let config = CohortConfig {
            group_columns: vec![
                AGE_BUCKET.to_string(),
                "sex".to_string(),
                "SP_STATE_CODE".to_string(),
                TOTAL_CONDITIONS.to_string(),
            ],
            age: Some(AgeBands {
                birth_date_column: "birth".to_string(),
                reference_year: 2008,
                edges: vec![0.0, 65.0],
                labels: vec!["<65".into(), "65+".into()],
            }),
            ..config()
        };
        let report = analyze(&ds, &config).unwrap().expect("flags present");
        let mut order: Vec<&str> = Vec::new();
        for row in &report.distribution.rows {
            if order.last() != Some(&row.group_column.as_str()) {
                order.push(&row.group_column);
            }
        }
        assert_eq!(order, vec![AGE_BUCKET, "sex", "SP_STATE_CODE", TOTAL_CONDITIONS]);

        // unlisted derived groups follow the configured columns
        let report = analyze(&ds, &CohortConfig { group_columns: vec!["sex".into()], ..config })
            .unwrap()
            .expect("flags present");
        let last = report.distribution.rows.last().unwrap();
        assert_eq!(last.group_column, AGE_BUCKET);
    }

    #[test]
    fn no_flags_skips_analysis() {
        let ds = Dataset::new(vec![Column::numeric("x", vec![Some(1.0)])]).unwrap();
        assert_eq!(analyze(&ds, &CohortConfig::default()).unwrap(), None);
    }
}
