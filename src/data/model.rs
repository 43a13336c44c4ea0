use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

// ---------------------------------------------------------------------------
// Value – a single raw cell as read from the source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
/// Used as a `BTreeMap` key downstream, so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

/// Renders the cell as it would appear in a text file. Categorical columns
/// built from numeric cells use this form, so `2` stays `2`, not `2.0000`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64`.
    ///
    /// Strings are parsed, so a numeric column read from text still works.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// The two column types the summaries distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Typed cells of one column; `None` is a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Numeric cells, or `None` for a categorical column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Categorical(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset, checking column lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> StatsResult<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = BTreeSet::new();

        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(StatsError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != row_count {
                return Err(StatsError::RaggedColumns {
                    column: col.name.clone(),
                    expected: row_count,
                    actual: col.len(),
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_order_by_type_then_content() {
        let mut set = BTreeSet::new();
        set.insert(Value::String("b".into()));
        set.insert(Value::Integer(2));
        set.insert(Value::Null);
        set.insert(Value::String("a".into()));
        set.insert(Value::Integer(-1));

        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![
                Value::Null,
                Value::Integer(-1),
                Value::Integer(2),
                Value::String("a".into()),
                Value::String("b".into()),
            ]
        );
    }

    #[test]
    fn display_keeps_source_text() {
        assert_eq!(Value::Integer(7).to_string(), "7");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
        assert!(Value::Float(f64::NAN).is_null());
    }

    #[test]
    fn dataset_rejects_ragged_columns() {
        let err = Dataset::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::numeric("b", vec![Some(1.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, StatsError::RaggedColumns { actual: 1, .. }));
    }

    #[test]
    fn dataset_rejects_duplicate_names() {
        let err = Dataset::new(vec![
            Column::numeric("a", vec![]),
            Column::categorical("a", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, StatsError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn empty_dataset_has_no_rows() {
        let ds = Dataset::new(Vec::new()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.row_count(), 0);
    }
}
