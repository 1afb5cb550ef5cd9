/// Data layer: core types, loading, caching, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → GameTable (derive week / loc_vi)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  Arc<GameTable> memoized by path
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  season/phase/team/min-sacks → GameTable
///   └──────────┘  then outcome → GameTable
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
