//! Pipeline orchestration: load → validate → classify → aggregate.
//!
//! Each stage is a pure transformation with a single failure exit;
//! every failure is terminal for the invocation (no automatic retries)
//! and carries a stage-specific exit code.

use std::time::Duration;

use billetscan_client::{ClassifierClient, ClientError};
use billetscan_core::{validate_schema, Table, REQUIRED_COLUMNS};
use billetscan_io::import_bytes;
use billetscan_protocol::PredictionResponse;
use billetscan_report::Summary;

use crate::exit_codes::{
    EXIT_INPUT_MALFORMED, EXIT_SCHEMA_MISSING, EXIT_SERVICE_REJECTED, EXIT_SERVICE_SHAPE,
    EXIT_SERVICE_TRANSPORT,
};
use crate::CliError;

/// Everything the presentation layer needs after a classification run.
#[derive(Debug)]
pub struct Analysis {
    pub response: PredictionResponse,
    pub summary: Summary,
    /// Service-supplied stats contradicted the recount.
    pub stats_disagree: bool,
}

/// Parse uploaded bytes and check the required schema. No network IO;
/// a schema failure halts the pipeline before any request is made.
pub fn load_table(raw: &[u8]) -> Result<Table, CliError> {
    let table = import_bytes(raw).map_err(|e| {
        CliError::new(EXIT_INPUT_MALFORMED, format!("cannot read CSV: {e}"))
            .with_hint("check the file is delimited text with one header row")
    })?;

    validate_schema(&table).map_err(|e| {
        CliError::new(EXIT_SCHEMA_MISSING, e.to_string()).with_hint(format!(
            "the file must contain the columns: {}",
            REQUIRED_COLUMNS.join(", ")
        ))
    })?;

    log::info!(
        "loaded table: {} row(s), {} column(s), {} missing cell(s)",
        table.n_rows(),
        table.n_cols(),
        table.missing_cells()
    );
    Ok(table)
}

/// Send a validated table to the classification service and aggregate
/// the response.
pub fn run_analysis(
    table: &Table,
    endpoint: &str,
    timeout: Duration,
) -> Result<Analysis, CliError> {
    let client = ClassifierClient::new(endpoint, timeout);
    let response = client.classify(table).map_err(classify_error)?;

    let summary = Summary::from_response(&response);
    let stats_disagree = !summary.agrees_with(&response.stats);
    if stats_disagree {
        log::warn!(
            "service stats disagree with recount: service said {:?}, counted {}/{} of {}",
            response.stats,
            summary.n_true,
            summary.n_false,
            summary.total
        );
    }

    Ok(Analysis { response, summary, stats_disagree })
}

fn classify_error(err: ClientError) -> CliError {
    match &err {
        ClientError::Transport(_) => {
            CliError::new(EXIT_SERVICE_TRANSPORT, err.to_string()).with_hint(
                "is the classification service running? try --endpoint or BSCAN_ENDPOINT",
            )
        }
        ClientError::Service { .. } => CliError::new(EXIT_SERVICE_REJECTED, err.to_string()),
        ClientError::ResponseShape(_) => CliError::new(EXIT_SERVICE_SHAPE, err.to_string()),
        ClientError::Encode(_) => CliError::new(crate::exit_codes::EXIT_ERROR, err.to_string()),
    }
}
