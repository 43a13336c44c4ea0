use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the library half of the pipeline.
///
/// Binaries wrap these in `anyhow` with step-specific context.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// A cell is incompatible with the declared type of its column.
    /// `row` is the 1-based data row (header excluded).
    #[error("column '{column}', row {row}: '{value}' is not {expected}")]
    DataFormat {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("column '{column}' has {actual} values, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("zip archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl StatsError {
    /// Attach a path to a bare `std::io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StatsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StatsResult<T> = Result<T, StatsError>;
