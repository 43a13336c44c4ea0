use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, ColumnKind, Dataset, Value};
use crate::error::{StatsError, StatsResult};

/// How raw cells are turned into typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    /// Declared column kinds. Undeclared columns are inferred.
    pub column_types: BTreeMap<String, ColumnKind>,
    /// Cell texts treated as missing (compared after trimming).
    pub missing_markers: Vec<String>,
    /// Field delimiter for delimited text; `None` picks one by extension.
    pub delimiter: Option<u8>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            column_types: BTreeMap::new(),
            missing_markers: ["", "NA", "N/A", "NaN", "null"]
                .into_iter()
                .map(String::from)
                .collect(),
            delimiter: None,
        }
    }
}

/// Raw cells of one column in file order, before type resolution.
type RawColumn = (String, Vec<Value>);

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text with a header row (`.tsv` – tab separated)
/// * `.json`         – `[{ "col": value, ... }, ...]` (records orientation)
/// * `.parquet`      – flat Arrow columns
pub fn load_file(path: &Path, options: &LoaderOptions) -> StatsResult<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" | "txt" => read_delimited(path, options.delimiter.unwrap_or(b','))?,
        "tsv" => read_delimited(path, options.delimiter.unwrap_or(b'\t'))?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(StatsError::UnsupportedFormat(format!(".{other}"))),
    };

    let dataset = resolve_columns(raw, options)?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );
    Ok(dataset)
}

/// Parse delimited text held in memory. Mainly useful for tests and piping.
pub fn load_csv_str(text: &str, options: &LoaderOptions) -> StatsResult<Dataset> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter.unwrap_or(b','))
        .from_reader(text.as_bytes());
    resolve_columns(read_csv_records(reader)?, options)
}

// ---------------------------------------------------------------------------
// Type resolution
// ---------------------------------------------------------------------------

/// Turn raw columns into typed ones, honouring declared kinds.
pub fn resolve_columns(raw: Vec<RawColumn>, options: &LoaderOptions) -> StatsResult<Dataset> {
    for declared in options.column_types.keys() {
        if !raw.iter().any(|(name, _)| name == declared) {
            return Err(StatsError::MissingColumn(declared.clone()));
        }
    }

    let columns = raw
        .into_iter()
        .map(|(name, cells)| {
            let declared = options.column_types.get(&name).copied();
            resolve_column(name, cells, declared, &options.missing_markers)
        })
        .collect::<StatsResult<Vec<_>>>()?;

    Dataset::new(columns)
}

fn resolve_column(
    name: String,
    cells: Vec<Value>,
    declared: Option<ColumnKind>,
    markers: &[String],
) -> StatsResult<Column> {
    let kind = declared.unwrap_or_else(|| infer_kind(&cells, markers));

    match kind {
        ColumnKind::Numeric => {
            let mut values = Vec::with_capacity(cells.len());
            for (i, cell) in cells.iter().enumerate() {
                if is_missing(cell, markers) {
                    values.push(None);
                    continue;
                }
                match numeric_value(cell) {
                    Some(v) if v.is_nan() => values.push(None),
                    Some(v) => values.push(Some(v)),
                    None => {
                        return Err(StatsError::DataFormat {
                            column: name,
                            row: i + 1,
                            value: cell.to_string(),
                            expected: "a finite number",
                        })
                    }
                }
            }
            Ok(Column::numeric(name, values))
        }
        ColumnKind::Categorical => {
            let values = cells
                .iter()
                .map(|cell| (!is_missing(cell, markers)).then(|| cell.to_string()))
                .collect();
            Ok(Column::categorical(name, values))
        }
    }
}

/// Numeric when every present cell reads as a number. Booleans are categorical.
fn infer_kind(cells: &[Value], markers: &[String]) -> ColumnKind {
    let all_numeric = cells
        .iter()
        .filter(|c| !is_missing(c, markers))
        .all(|c| numeric_value(c).is_some());

    if all_numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Numeric reading of a cell. Infinities are not numbers here; NaN is
/// kept so the caller can treat it as missing.
fn numeric_value(cell: &Value) -> Option<f64> {
    match cell {
        Value::Bool(_) | Value::Null => None,
        other => other.as_f64().filter(|v| !v.is_infinite()),
    }
}

fn is_missing(cell: &Value, markers: &[String]) -> bool {
    match cell {
        Value::String(s) => {
            let trimmed = s.trim();
            markers.iter().any(|m| m == trimmed)
        }
        other => other.is_null(),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names; every cell is kept as text and typed later.
fn read_delimited(path: &Path, delimiter: u8) -> StatsResult<Vec<RawColumn>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    read_csv_records(reader)
}

fn read_csv_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> StatsResult<Vec<RawColumn>> {
    let mut columns: Vec<RawColumn> = reader
        .headers()?
        .iter()
        .map(|h| (h.to_string(), Vec::new()))
        .collect();

    for result in reader.records() {
        let record = result?;
        for ((_, cells), field) in columns.iter_mut().zip(record.iter()) {
            cells.push(Value::String(field.to_string()));
        }
    }

    Ok(columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "sex": "F", "age": 71, "flag": 1 },
///   ...
/// ]
/// ```
///
/// Column order is first appearance; keys absent from a record are missing.
fn read_json(path: &Path) -> StatsResult<Vec<RawColumn>> {
    let text = std::fs::read_to_string(path).map_err(|e| StatsError::io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root.as_array().ok_or_else(|| {
        StatsError::UnsupportedFormat("expected a top-level JSON array of records".into())
    })?;

    let mut order: Vec<String> = Vec::new();
    for rec in records {
        let obj = rec.as_object().ok_or_else(|| {
            StatsError::UnsupportedFormat("JSON records must be objects".into())
        })?;
        for key in obj.keys() {
            if !order.contains(key) {
                order.push(key.clone());
            }
        }
    }

    let columns = order
        .into_iter()
        .map(|key| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&key).map(json_to_value).unwrap_or(Value::Null))
                .collect();
            (key, cells)
        })
        .collect();

    Ok(columns)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat columns.
///
/// Strings, integers, floats and booleans map to their [`Value`]
/// counterparts; any other Arrow type is rendered to text. Works with files
/// written by both **Pandas** (`df.to_parquet()`) and **Polars**.
fn read_parquet(path: &Path) -> StatsResult<Vec<RawColumn>> {
    let file = std::fs::File::open(path).map_err(|e| StatsError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let mut columns: Vec<RawColumn> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();

    let reader = builder.build()?;
    for batch_result in reader {
        let batch = batch_result?;
        for (col_idx, (_, cells)) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                cells.push(extract_value(array, row)?);
            }
        }
    }

    Ok(columns)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> StatsResult<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => Value::Float(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        _ => Value::String(arrow::util::display::array_value_to_string(col.as_ref(), row)?),
    };
    Ok(value)
}
