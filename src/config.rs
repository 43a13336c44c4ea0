use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::data::loader::LoaderOptions;
use crate::data::model::ColumnKind;
use crate::error::{StatsError, StatsResult};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-stats.toml";

/// Prefix of environment overrides, e.g. `RUSTY_STATS_PATHS__RESULTS_DIR`.
pub const ENV_PREFIX: &str = "RUSTY_STATS_";

// ---------------------------------------------------------------------------
// Configuration tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub acquire: AcquireConfig,
    pub summary: SummaryConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohort: Option<CohortConfig>,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Where archives are downloaded and extracted.
    pub data_dir: PathBuf,
    /// Where summary artifacts are written and read back.
    pub results_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("results"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireConfig {
    /// Base URL the archive names are appended to.
    pub base_url: String,
    /// label → archive file name. Each archive is saved as `<label>.zip`.
    pub files: BTreeMap<String, String>,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        let files = [
            ("benefit", "DE1_0_2009_Beneficiary_Summary_File_Sample_20.zip"),
            ("claim", "DE1_0_2008_to_2010_Outpatient_Claims_Sample_20.zip"),
        ]
        .into_iter()
        .map(|(label, file)| (label.to_string(), file.to_string()))
        .collect();

        Self {
            base_url: "https://www.cms.gov/Research-Statistics-Data-and-Systems/Downloadable-Public-Use-Files/SynPUFs/Downloads/".to_string(),
            files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Dataset file; relative paths are resolved against `paths.data_dir`.
    pub dataset: PathBuf,
    /// Declared column kinds. Undeclared columns are inferred.
    pub column_types: BTreeMap<String, ColumnKind>,
    /// Cell texts treated as missing (compared after trimming).
    pub missing_markers: Vec<String>,
    /// Field delimiter for delimited text; defaults by extension.
    pub delimiter: Option<char>,
    /// Frequency-table rows persisted per categorical column (0 = all).
    pub max_frequency_entries: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("DE1_0_2009_Beneficiary_Summary_File_Sample_20.csv"),
            column_types: BTreeMap::new(),
            missing_markers: ["", "NA", "N/A", "NaN", "null"]
                .into_iter()
                .map(String::from)
                .collect(),
            delimiter: None,
            max_frequency_entries: 50,
        }
    }
}

/// Cohort analysis over 0/1 flag columns. Disabled unless configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    /// Substring that marks a flag column.
    pub flag_pattern: String,
    /// Columns matching the pattern that are not flags.
    pub exclude: Vec<String>,
    /// Value meaning "flag set".
    pub active_value: f64,
    /// Label of the group of rows with no active flag.
    pub none_label: String,
    /// Numeric columns summed per active set.
    pub measures: Vec<String>,
    /// Named sums of measures, e.g. `total_ip_cost = [..]`.
    pub totals: BTreeMap<String, Vec<String>>,
    /// Columns the distribution table is broken down by.
    pub group_columns: Vec<String>,
    pub age: Option<AgeBands>,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            flag_pattern: "SP_".to_string(),
            exclude: vec!["SP_STATE_CODE".to_string()],
            active_value: 1.0,
            none_label: "NO CHRONIC CONDITIONS".to_string(),
            measures: Vec::new(),
            totals: BTreeMap::new(),
            group_columns: Vec::new(),
            age: None,
        }
    }
}

/// Derives an `age_bucket` group column from a `YYYYMMDD` birth date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBands {
    pub birth_date_column: String,
    pub reference_year: i32,
    /// Lower bound of each bucket; the last bucket is open-ended.
    pub edges: Vec<f64>,
    /// One label per edge.
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Display names for column codes, e.g. `SP_CHF = "Heart Failure"`.
    pub labels: BTreeMap<String, String>,
}

impl Config {
    /// Resolved location of the dataset file.
    pub fn dataset_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.summary.dataset)
    }

    /// Loader settings from `[summary]`. The delimiter must be a single ASCII character.
    pub fn loader_options(&self) -> StatsResult<LoaderOptions> {
        let delimiter = match self.summary.delimiter {
            Some(c) => Some(u8::try_from(c).ok().filter(u8::is_ascii).ok_or_else(|| {
                StatsError::InvalidConfig(format!("delimiter {c:?} is not an ASCII character"))
            })?),
            None => None,
        };
        Ok(LoaderOptions {
            column_types: self.summary.column_types.clone(),
            missing_markers: self.summary.missing_markers.clone(),
            delimiter,
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `RUSTY_STATS_`, `__` between levels)
/// 2. The explicit config file, or `rusty-stats.toml` in the working directory
/// 3. Built-in defaults
///
/// CLI flags are applied by the binaries on top of the returned value.
pub fn load_config(path: Option<&Path>) -> StatsResult<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(StatsError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                ));
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.exists() {
                figment = figment.merge(Toml::file(local));
            }
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract().map_err(Box::new)?;
    log::debug!("Loaded configuration: {config:?}");
    Ok(config)
}
