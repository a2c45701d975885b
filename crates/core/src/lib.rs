//! `billetscan-core` — Table model and required-schema validation.
//!
//! Pure types crate: no IO, no network. A [`Table`] is built once from
//! parsed data and never mutated afterwards; every downstream stage
//! (validation, wire encoding, aggregation) reads it through borrowed
//! views.

pub mod schema;
pub mod table;

pub use schema::{validate_schema, SchemaError, REQUIRED_COLUMNS};
pub use table::{Cell, Table, TableError};
