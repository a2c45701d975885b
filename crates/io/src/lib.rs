//! `billetscan-io` — CSV import/export for the screening pipeline.
//!
//! Import side: uploaded bytes → [`billetscan_core::Table`], with
//! delimiter sniffing (comma, semicolon, tab, pipe) and a Windows-1252
//! fallback for Excel-exported files. Export side: the `;`-delimited
//! wire encoding the classification service expects, and the
//! `predictions_billets.csv` download artifact.

pub mod csv_io;

pub use csv_io::{
    import_bytes, predictions_to_csv, to_wire_csv, write_predictions_csv, ExportError,
    ImportError, PREDICTIONS_FILENAME, WIRE_DELIMITER,
};
