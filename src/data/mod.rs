/// Data layer: core types, loading, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<SalesRecord>, header row, distinct values
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  criteria → FilteredView (rows + sums + grouped tables)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered rows → CSV / HTML bytes
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
