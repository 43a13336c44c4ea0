/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → raw cells → typed columns (declared or inferred)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  ordered, equally long, uniquely named columns
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
