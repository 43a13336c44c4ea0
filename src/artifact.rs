//! Summary artifacts: CSV tables plus a JSON manifest in the results directory.
//!
//! Every file of a run is rendered in memory, written into a staging
//! directory inside the results directory, and only then renamed over the
//! previous artifacts. Nothing is timestamped, so an unchanged dataset
//! yields byte-identical files.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cohort::{CohortReport, CombinationRecord, CombinationTable, DistributionRow, DistributionTable};
use crate::data::model::ColumnKind;
use crate::error::{StatsError, StatsResult};
use crate::summary::{BivariateRecord, ColumnStats, SummarySet, UnivariateSummary};

pub const UNIVARIATE_FILE: &str = "univariate_summary.csv";
pub const BIVARIATE_FILE: &str = "bivariate_summary.csv";
pub const FREQUENCY_FILE: &str = "frequency_table.csv";
pub const COMBINATION_FILE: &str = "condition_combinations.csv";
pub const DISTRIBUTION_FILE: &str = "group_distribution.csv";
pub const MANIFEST_FILE: &str = "summary_manifest.json";

const UNIVARIATE_HEADERS: [&str; 14] = [
    "column",
    "kind",
    "count",
    "missing",
    "mean",
    "std",
    "min",
    "q25",
    "median",
    "q75",
    "max",
    "cardinality",
    "mode",
    "mode_frequency",
];
const BIVARIATE_HEADERS: [&str; 5] = ["column_a", "column_b", "measure", "value", "observations"];
const FREQUENCY_HEADERS: [&str; 4] = ["column", "value", "count", "percent"];

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Flat univariate row; numeric fields are empty for categorical columns
/// and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnivariateRow {
    pub column: String,
    pub kind: ColumnKind,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
    pub cardinality: Option<usize>,
    pub mode: Option<String>,
    pub mode_frequency: Option<usize>,
}

impl From<&UnivariateSummary> for UnivariateRow {
    fn from(summary: &UnivariateSummary) -> Self {
        let mut row = UnivariateRow {
            column: summary.column.clone(),
            kind: summary.kind(),
            count: 0,
            missing: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
            cardinality: None,
            mode: None,
            mode_frequency: None,
        };
        match &summary.stats {
            ColumnStats::Numeric(s) => {
                row.count = s.count;
                row.missing = s.missing;
                row.mean = s.mean;
                row.std = s.std;
                row.min = s.min;
                row.q25 = s.q25;
                row.median = s.median;
                row.q75 = s.q75;
                row.max = s.max;
            }
            ColumnStats::Categorical(s) => {
                row.count = s.count;
                row.missing = s.missing;
                row.cardinality = Some(s.cardinality);
                row.mode = s.mode.clone();
                row.mode_frequency = s.mode_frequency;
            }
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub column: String,
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

/// Describes one run's artifacts; the dashboard reads this first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryManifest {
    /// File name of the summarised dataset (no directory).
    pub dataset: String,
    pub rows: usize,
    pub columns: usize,
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohort: Option<CohortManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortManifest {
    pub flags: Vec<String>,
    pub measures: Vec<String>,
    pub totals: Vec<String>,
}

impl SummaryManifest {
    pub fn has_file(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// What gets persisted for one run.
pub struct ArtifactInput<'a> {
    pub dataset_path: &'a Path,
    pub rows: usize,
    pub columns: usize,
    pub summaries: &'a SummarySet,
    pub cohort: Option<&'a CohortReport>,
    /// Frequency rows kept per column; 0 keeps all.
    pub max_frequency_entries: usize,
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new())
}

fn finish(name: &str, writer: csv::Writer<Vec<u8>>) -> StatsResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| StatsError::io(name, e.into_error()))
}

fn render_rows<T: Serialize>(name: &str, headers: &[&str], rows: &[T]) -> StatsResult<Vec<u8>> {
    let mut writer = csv_writer();
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    finish(name, writer)
}

fn render_combinations(table: &CombinationTable) -> StatsResult<Vec<u8>> {
    let mut writer = csv_writer();
    writer.write_record(table.headers())?;
    for rec in &table.records {
        let mut fields = vec![rec.active_conditions.clone(), rec.member_count.to_string()];
        fields.extend(rec.measure_sums.iter().map(f64::to_string));
        fields.extend(rec.totals.iter().map(f64::to_string));
        fields.push(rec.number_of_conditions.to_string());
        fields.push(rec.total_occurrence.map(|n| n.to_string()).unwrap_or_default());
        fields.push(rec.condition_band.clone());
        writer.write_record(&fields)?;
    }
    finish(COMBINATION_FILE, writer)
}

fn render_distribution(table: &DistributionTable) -> StatsResult<Vec<u8>> {
    let mut writer = csv_writer();
    writer.write_record(table.headers())?;
    for row in &table.rows {
        let mut fields = vec![
            row.group_column.clone(),
            row.cohort.clone(),
            row.population_pct.to_string(),
        ];
        fields.extend(row.flag_shares.iter().map(f64::to_string));
        writer.write_record(&fields)?;
    }
    finish(DISTRIBUTION_FILE, writer)
}

/// Render every artifact of a run, manifest last.
pub fn render(input: &ArtifactInput<'_>) -> StatsResult<(SummaryManifest, Vec<(String, Vec<u8>)>)> {
    let univariate: Vec<UnivariateRow> = input
        .summaries
        .univariate
        .iter()
        .map(UnivariateRow::from)
        .collect();

    let frequencies: Vec<FrequencyRow> = input
        .summaries
        .univariate
        .iter()
        .filter_map(|s| match &s.stats {
            ColumnStats::Categorical(c) => Some((s.column.as_str(), c)),
            ColumnStats::Numeric(_) => None,
        })
        .flat_map(|(column, c)| {
            let keep = match input.max_frequency_entries {
                0 => c.frequencies.len(),
                n => n,
            };
            c.frequencies.iter().take(keep).map(move |f| FrequencyRow {
                column: column.to_string(),
                value: f.value.clone(),
                count: f.count,
                percent: f.percent,
            })
        })
        .collect();

    let mut files = vec![
        (
            UNIVARIATE_FILE.to_string(),
            render_rows(UNIVARIATE_FILE, &UNIVARIATE_HEADERS, &univariate)?,
        ),
        (
            BIVARIATE_FILE.to_string(),
            render_rows(BIVARIATE_FILE, &BIVARIATE_HEADERS, &input.summaries.bivariate)?,
        ),
        (
            FREQUENCY_FILE.to_string(),
            render_rows(FREQUENCY_FILE, &FREQUENCY_HEADERS, &frequencies)?,
        ),
    ];

    let cohort = match input.cohort {
        Some(report) => {
            files.push((
                COMBINATION_FILE.to_string(),
                render_combinations(&report.combinations)?,
            ));
            files.push((
                DISTRIBUTION_FILE.to_string(),
                render_distribution(&report.distribution)?,
            ));
            Some(CohortManifest {
                flags: report.distribution.flag_names.clone(),
                measures: report.combinations.measure_names.clone(),
                totals: report.combinations.total_names.clone(),
            })
        }
        None => None,
    };

    let manifest = SummaryManifest {
        dataset: input
            .dataset_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        rows: input.rows,
        columns: input.columns,
        files: files.iter().map(|(name, _)| name.clone()).collect(),
        cohort,
    };
    let mut json = serde_json::to_vec_pretty(&manifest)?;
    json.push(b'\n');
    files.push((MANIFEST_FILE.to_string(), json));

    Ok((manifest, files))
}

// ---------------------------------------------------------------------------
// All-or-nothing commit
// ---------------------------------------------------------------------------

/// Files of the previous run that this run does not write.
fn stale_files(results_dir: &Path, files: &[(String, Vec<u8>)]) -> Vec<String> {
    let Ok(previous) = read_manifest(results_dir) else {
        return Vec::new();
    };
    previous
        .files
        .into_iter()
        // only bare file names inside the results directory
        .filter(|f| Path::new(f).file_name().and_then(|n| n.to_str()) == Some(f.as_str()))
        .filter(|f| !files.iter().any(|(name, _)| name == f))
        .collect()
}

/// Names moved so far while swapping a run into place.
#[derive(Debug, Default)]
struct Swap {
    backed_up: Vec<String>,
    installed: Vec<String>,
}

impl Swap {
    fn back_up(&mut self, results_dir: &Path, backup: &Path, name: &str) -> StatsResult<()> {
        let target = results_dir.join(name);
        if target.is_file() {
            std::fs::rename(&target, backup.join(name)).map_err(|e| StatsError::io(&target, e))?;
            self.backed_up.push(name.to_string());
        }
        Ok(())
    }

    fn install(
        &mut self,
        results_dir: &Path,
        fresh: &Path,
        backup: &Path,
        files: &[(String, Vec<u8>)],
        stale: &[String],
    ) -> StatsResult<()> {
        for name in stale {
            self.back_up(results_dir, backup, name)?;
            log::debug!("Removed stale {name}");
        }
        for (name, _) in files {
            self.back_up(results_dir, backup, name)?;
            let target = results_dir.join(name);
            std::fs::rename(fresh.join(name), &target).map_err(|e| StatsError::io(&target, e))?;
            self.installed.push(name.clone());
            log::debug!("Wrote {}", target.display());
        }
        Ok(())
    }

    /// Put every moved file back where it was.
    fn roll_back(&self, results_dir: &Path, backup: &Path) {
        for name in self.installed.iter().rev() {
            let target = results_dir.join(name);
            if let Err(e) = std::fs::remove_file(&target) {
                log::error!("Could not remove {}: {e}", target.display());
            }
        }
        for name in self.backed_up.iter().rev() {
            let target = results_dir.join(name);
            if let Err(e) = std::fs::rename(backup.join(name), &target) {
                log::error!("Could not restore {}: {e}", target.display());
            }
        }
    }
}

/// Write `files` into `results_dir` as one unit.
///
/// New files are written into a staging directory first. Previous files,
/// including those of the last run that this run no longer writes, are
/// moved aside before each new file is renamed into place; if any step
/// fails they are moved back, so the directory holds either the old run
/// or the new one.
pub fn commit(results_dir: &Path, files: &[(String, Vec<u8>)]) -> StatsResult<()> {
    std::fs::create_dir_all(results_dir).map_err(|e| StatsError::io(results_dir, e))?;
    let stale = stale_files(results_dir, files);

    // Dropping the staging directory removes the backups and whatever was not moved out.
    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(results_dir)
        .map_err(|e| StatsError::io(results_dir, e))?;
    let fresh = staging.path().join("new");
    let backup = staging.path().join("old");
    for dir in [&fresh, &backup] {
        std::fs::create_dir(dir).map_err(|e| StatsError::io(dir, e))?;
    }

    for (name, bytes) in files {
        let path = fresh.join(name);
        std::fs::write(&path, bytes).map_err(|e| StatsError::io(&path, e))?;
    }

    let mut swap = Swap::default();
    if let Err(e) = swap.install(results_dir, &fresh, &backup, files, &stale) {
        log::error!("Commit failed, restoring previous artifacts: {e}");
        swap.roll_back(results_dir, &backup);
        return Err(e);
    }
    Ok(())
}

/// Render and commit one run's artifacts.
pub fn write_artifacts(results_dir: &Path, input: &ArtifactInput<'_>) -> StatsResult<SummaryManifest> {
    let (manifest, files) = render(input)?;
    commit(results_dir, &files)?;
    log::info!(
        "Exported {} artifacts to {}",
        files.len(),
        results_dir.display()
    );
    Ok(manifest)
}

// ---------------------------------------------------------------------------
// Reading back
// ---------------------------------------------------------------------------

fn read_rows<T: DeserializeOwned>(path: &Path) -> StatsResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

pub fn read_manifest(results_dir: &Path) -> StatsResult<SummaryManifest> {
    let path = results_dir.join(MANIFEST_FILE);
    let text = std::fs::read_to_string(&path).map_err(|e| StatsError::io(&path, e))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn read_univariate(results_dir: &Path) -> StatsResult<Vec<UnivariateRow>> {
    read_rows(&results_dir.join(UNIVARIATE_FILE))
}

pub fn read_bivariate(results_dir: &Path) -> StatsResult<Vec<BivariateRecord>> {
    read_rows(&results_dir.join(BIVARIATE_FILE))
}

pub fn read_frequencies(results_dir: &Path) -> StatsResult<Vec<FrequencyRow>> {
    read_rows(&results_dir.join(FREQUENCY_FILE))
}

/// Header row plus raw records of a wide table.
fn read_wide(path: &Path) -> StatsResult<(Vec<String>, Vec<csv::StringRecord>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(String::from).collect();
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok((headers, records))
}

fn field<'r, 'h>(record: &'r csv::StringRecord, headers: &'h [String], idx: usize) -> (&'r str, &'h str) {
    let name = headers.get(idx).map(String::as_str).unwrap_or("");
    (record.get(idx).unwrap_or(""), name)
}

fn parse_number<T: std::str::FromStr>(
    record: &csv::StringRecord,
    headers: &[String],
    idx: usize,
    row: usize,
) -> StatsResult<T> {
    let (text, column) = field(record, headers, idx);
    text.parse().map_err(|_| StatsError::DataFormat {
        column: column.to_string(),
        row,
        value: text.to_string(),
        expected: "a number",
    })
}

pub fn read_combinations(results_dir: &Path, layout: &CohortManifest) -> StatsResult<CombinationTable> {
    let path = results_dir.join(COMBINATION_FILE);
    let (headers, records) = read_wide(&path)?;
    let m = layout.measures.len();
    let t = layout.totals.len();

    let mut out = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let measure_sums = (0..m)
            .map(|j| parse_number(record, &headers, 2 + j, row))
            .collect::<StatsResult<Vec<f64>>>()?;
        let totals = (0..t)
            .map(|j| parse_number(record, &headers, 2 + m + j, row))
            .collect::<StatsResult<Vec<f64>>>()?;
        let base = 2 + m + t;
        let occurrence = field(record, &headers, base + 1).0;
        out.push(CombinationRecord {
            active_conditions: field(record, &headers, 0).0.to_string(),
            member_count: parse_number(record, &headers, 1, row)?,
            measure_sums,
            totals,
            number_of_conditions: parse_number(record, &headers, base, row)?,
            total_occurrence: if occurrence.is_empty() {
                None
            } else {
                Some(parse_number(record, &headers, base + 1, row)?)
            },
            condition_band: field(record, &headers, base + 2).0.to_string(),
        });
    }

    Ok(CombinationTable {
        measure_names: layout.measures.clone(),
        total_names: layout.totals.clone(),
        records: out,
    })
}

pub fn read_distribution(results_dir: &Path, layout: &CohortManifest) -> StatsResult<DistributionTable> {
    let path = results_dir.join(DISTRIBUTION_FILE);
    let (headers, records) = read_wide(&path)?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let flag_shares = (0..layout.flags.len())
            .map(|j| parse_number(record, &headers, 3 + j, row))
            .collect::<StatsResult<Vec<f64>>>()?;
        rows.push(DistributionRow {
            group_column: field(record, &headers, 0).0.to_string(),
            cohort: field(record, &headers, 1).0.to_string(),
            population_pct: parse_number(record, &headers, 2, row)?,
            flag_shares,
        });
    }

    Ok(DistributionTable {
        flag_names: layout.flags.clone(),
        rows,
    })
}

/// Everything a results directory holds, as listed by its manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedArtifacts {
    pub dir: PathBuf,
    pub manifest: SummaryManifest,
    pub univariate: Vec<UnivariateRow>,
    pub bivariate: Vec<BivariateRecord>,
    pub frequencies: Vec<FrequencyRow>,
    pub cohort: Option<CohortReport>,
}

pub fn load_all(results_dir: &Path) -> StatsResult<LoadedArtifacts> {
    let manifest = read_manifest(results_dir)?;
    let cohort = match &manifest.cohort {
        Some(layout)
            if manifest.has_file(COMBINATION_FILE) && manifest.has_file(DISTRIBUTION_FILE) =>
        {
            Some(CohortReport {
                combinations: read_combinations(results_dir, layout)?,
                distribution: read_distribution(results_dir, layout)?,
            })
        }
        _ => None,
    };

    Ok(LoadedArtifacts {
        dir: results_dir.to_path_buf(),
        univariate: read_univariate(results_dir)?,
        bivariate: read_bivariate(results_dir)?,
        frequencies: read_frequencies(results_dir)?,
        manifest,
        cohort,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::{Column, Dataset};
    use crate::summary::summarize;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0), Some(2.0), Some(3.0)]),
            Column::categorical("c", vec![Some("a".into()), Some("b".into()), Some("a".into())]),
        ])
        .unwrap()
    }

    fn input<'a>(set: &'a SummarySet, max: usize) -> ArtifactInput<'a> {
        ArtifactInput {
            dataset_path: Path::new("data/sample.csv"),
            rows: 3,
            columns: 2,
            summaries: set,
            cohort: None,
            max_frequency_entries: max,
        }
    }

    #[test]
    fn artifacts_round_trip_through_the_reader() {
        let dir = tempfile::tempdir().unwrap();
        let set = summarize(&sample());
        let manifest = write_artifacts(dir.path(), &input(&set, 0)).unwrap();

        assert_eq!(manifest.dataset, "sample.csv");
        assert_eq!(read_manifest(dir.path()).unwrap(), manifest);

        let uni = read_univariate(dir.path()).unwrap();
        assert_eq!(uni.len(), 2);
        assert_eq!(uni[0].kind, ColumnKind::Numeric);
        assert_eq!(uni[0].mean, Some(2.0));
        assert_eq!(uni[0].cardinality, None);
        assert_eq!(uni[1].mode.as_deref(), Some("a"));
        assert_eq!(uni[1].mode_frequency, Some(2));
        assert_eq!(uni[1].mean, None);

        assert_eq!(read_bivariate(dir.path()).unwrap(), set.bivariate);
        assert_eq!(read_frequencies(dir.path()).unwrap().len(), 2);

        // staging directory is gone
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn frequency_rows_are_truncated_per_column() {
        let set = summarize(&sample());
        let (_, files) = render(&input(&set, 1)).unwrap();
        let freq = files
            .iter()
            .find(|(name, _)| name == FREQUENCY_FILE)
            .map(|(_, bytes)| String::from_utf8(bytes.clone()).unwrap())
            .unwrap();
        assert_eq!(freq.lines().count(), 2);
        assert!(freq.starts_with("column,value,count,percent\n"));
    }

    #[test]
    fn empty_summaries_still_have_headers() {
        let set = SummarySet::default();
        let (manifest, files) = render(&input(&set, 0)).unwrap();
        assert_eq!(manifest.files.len(), 3);
        let uni = String::from_utf8(files[0].1.clone()).unwrap();
        assert_eq!(uni.trim_end(), UNIVARIATE_HEADERS.join(","));
    }

    #[test]
    fn rendering_is_deterministic() {
        let set = summarize(&sample());
        let (_, first) = render(&input(&set, 0)).unwrap();
        let (_, second) = render(&input(&set, 0)).unwrap();
        assert_eq!(first, second);
    }

    /// Regular files of `dir` with their bytes.
    fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
        let mut files: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| {
                (
                    e.file_name().to_string_lossy().into_owned(),
                    std::fs::read(e.path()).unwrap(),
                )
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn failed_rename_restores_every_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let one = Dataset::new(vec![Column::numeric("x", vec![Some(1.0), Some(2.0)])]).unwrap();
        let set = summarize(&one);
        write_artifacts(dir.path(), &input(&set, 0)).unwrap();

        // a directory in place of the second table makes its rename fail
        let blocked = dir.path().join(BIVARIATE_FILE);
        std::fs::remove_file(&blocked).unwrap();
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), b"x").unwrap();
        let before = snapshot(dir.path());

        let two = Dataset::new(vec![
            Column::numeric("x", vec![Some(5.0), Some(7.0)]),
            Column::numeric("y", vec![Some(6.0), Some(8.0)]),
        ])
        .unwrap();
        let set = summarize(&two);
        let err = write_artifacts(dir.path(), &input(&set, 0)).unwrap_err();
        assert!(matches!(err, StatsError::Io { .. }));

        assert_eq!(snapshot(dir.path()), before);
        assert!(blocked.join("keep").exists());
        assert_eq!(read_univariate(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn files_of_an_earlier_run_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let set = summarize(&sample());
        let report = CohortReport::default();
        let mut with_cohort = input(&set, 0);
        with_cohort.cohort = Some(&report);
        write_artifacts(dir.path(), &with_cohort).unwrap();
        assert!(dir.path().join(COMBINATION_FILE).exists());
        std::fs::write(dir.path().join("notes.txt"), b"mine").unwrap();

        let manifest = write_artifacts(dir.path(), &input(&set, 0)).unwrap();
        assert!(manifest.cohort.is_none());
        assert!(!dir.path().join(COMBINATION_FILE).exists());
        assert!(!dir.path().join(DISTRIBUTION_FILE).exists());
        // files no manifest listed are left alone
        assert!(dir.path().join("notes.txt").exists());

        let names: Vec<String> = snapshot(dir.path()).into_iter().map(|(n, _)| n).collect();
        // listed tables, the manifest itself and notes.txt
        assert_eq!(names.len(), manifest.files.len() + 2);
        assert!(load_all(dir.path()).unwrap().cohort.is_none());
    }
}
