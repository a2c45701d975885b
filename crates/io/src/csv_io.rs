// CSV import/export

use std::fmt;
use std::path::Path;

use billetscan_core::{Cell, Table, TableError};
use billetscan_protocol::PredictionRecord;

/// Delimiter of the wire encoding and of exported prediction files.
pub const WIRE_DELIMITER: u8 = b';';

/// Filename of the downloadable prediction artifact.
pub const PREDICTIONS_FILENAME: &str = "predictions_billets.csv";

/// Uploaded bytes could not be parsed into a rectangular table.
#[derive(Debug)]
pub enum ImportError {
    /// Input is empty or whitespace-only.
    Empty,
    /// CSV-level parse failure (unbalanced quotes, ragged rows, ...).
    Csv(String),
    /// Parsed records violate table invariants (duplicate headers).
    Table(TableError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "input is empty"),
            Self::Csv(msg) => write!(f, "CSV parse error: {msg}"),
            Self::Table(err) => write!(f, "CSV parse error: {err}"),
        }
    }
}

impl std::error::Error for ImportError {}

/// Failure writing an export file.
#[derive(Debug)]
pub enum ExportError {
    Encode(String),
    Io(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(msg) => write!(f, "CSV encode error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Parse uploaded bytes into a [`Table`], auto-detecting the delimiter.
///
/// The first record is the header row. Every data row must have the
/// same field count as the header; numeric-looking fields become
/// [`Cell::Number`], everything else [`Cell::Text`].
pub fn import_bytes(raw: &[u8]) -> Result<Table, ImportError> {
    let content = decode_utf8(raw);
    if content.trim().is_empty() {
        return Err(ImportError::Empty);
    }

    let delimiter = sniff_delimiter(&content);
    log::debug!("sniffed delimiter '{}'", delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ImportError::Csv(format!("row {row_no}: {e}")))?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    Table::from_rows(headers, rows).map_err(ImportError::Table)
}

fn parse_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    match trimmed.parse::<f64>() {
        Ok(v) => Cell::Number(v),
        Err(_) => Cell::Text(trimmed.to_string()),
    }
}

/// Decode bytes as UTF-8, falling back to Windows-1252 (common for
/// Excel-exported CSVs).
fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties — more columns = more likely real delimiter
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Re-encode a table as the `;`-delimited wire format: header row, then
/// one row per record. This is the body of the `file` part uploaded to
/// the classification service.
pub fn to_wire_csv(table: &Table) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(WIRE_DELIMITER)
        .from_writer(Vec::new());

    writer
        .write_record(table.column_names())
        .map_err(|e| ExportError::Encode(e.to_string()))?;

    for i in 0..table.n_rows() {
        // row index is in range by construction
        let row = table.row(i).unwrap_or_default();
        let fields: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        writer
            .write_record(&fields)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encode(e.to_string()))
}

/// Encode prediction records as `;`-delimited CSV: the echoed feature
/// columns (first record's order) followed by `label`.
pub fn predictions_to_csv(records: &[PredictionRecord]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(WIRE_DELIMITER)
        .from_writer(Vec::new());

    let feature_names: Vec<&str> = records
        .first()
        .map(|r| r.features.iter().map(|(n, _)| n.as_str()).collect())
        .unwrap_or_default();

    let mut header: Vec<&str> = feature_names.clone();
    header.push("label");
    writer
        .write_record(&header)
        .map_err(|e| ExportError::Encode(e.to_string()))?;

    for record in records {
        let mut fields: Vec<String> = feature_names
            .iter()
            .map(|name| {
                record
                    .feature(name)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        fields.push(record.label.to_string());
        writer
            .write_record(&fields)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encode(e.to_string()))
}

/// Write the downloadable prediction artifact to `path`.
pub fn write_predictions_csv(path: &Path, records: &[PredictionRecord]) -> Result<(), ExportError> {
    let content = predictions_to_csv(records)?;
    std::fs::write(path, content).map_err(|e| ExportError::Io(e.to_string()))?;
    log::info!("wrote {} prediction(s) to {}", records.len(), path.display());
    Ok(())
}
