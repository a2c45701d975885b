//! `billetscan-report` — aggregation over classification responses.
//!
//! Pure compute crate: receives a validated response plus the original
//! table, returns derived counts and views. No IO, no network.

pub mod describe;
pub mod summary;

pub use describe::{describe, ColumnStats};
pub use summary::{FeaturePartition, JoinError, LabeledTable, Summary};
