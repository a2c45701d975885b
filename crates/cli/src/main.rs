// bscan - banknote screening pipeline, headless

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use billetscan_cli::exit_codes::{EXIT_EXPORT, EXIT_SUCCESS, EXIT_USAGE};
use billetscan_cli::pipeline::{load_table, run_analysis};
use billetscan_cli::CliError;
use billetscan_config::Settings;
use billetscan_core::validate_schema;
use billetscan_io::{import_bytes, write_predictions_csv, PREDICTIONS_FILENAME};
use billetscan_report::{describe, LabeledTable};

#[derive(Parser)]
#[command(name = "bscan")]
#[command(about = "Banknote screening: classify geometric measurements against a remote service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every row of a CSV and print summary statistics
    #[command(after_help = "\
Examples:
  bscan analyze billets.csv
  bscan analyze billets.csv --endpoint http://10.0.0.5:8000
  bscan analyze billets.csv --out predictions_billets.csv
  bscan analyze billets.csv --feature margin_low")]
    Analyze {
        /// Input CSV (delimiter auto-detected)
        input: PathBuf,

        /// Classification service base URL (overrides settings.json)
        #[arg(long, env = "BSCAN_ENDPOINT")]
        endpoint: Option<String>,

        /// Request timeout in seconds (overrides settings.json)
        #[arg(long)]
        timeout: Option<u64>,

        /// Write the prediction records to this CSV file (`;`-delimited)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Also print the label-partitioned distribution of one feature
        #[arg(long, value_name = "COLUMN")]
        feature: Option<String>,
    },

    /// Parse a CSV and check it against the required schema (no network)
    #[command(after_help = "\
Examples:
  bscan check billets.csv")]
    Check {
        /// Input CSV (delimiter auto-detected)
        input: PathBuf,
    },

    /// Print per-column descriptive statistics of a CSV (no network)
    #[command(after_help = "\
Examples:
  bscan describe billets.csv")]
    Describe {
        /// Input CSV (delimiter auto-detected)
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Analyze { input, endpoint, timeout, out, feature } => {
            cmd_analyze(input, endpoint, timeout, out, feature)
        }
        Commands::Check { input } => cmd_check(input),
        Commands::Describe { input } => cmd_describe(input),
    }
}

fn read_input(path: &PathBuf) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot read {}: {e}", path.display()))
    })
}

fn cmd_analyze(
    input: PathBuf,
    endpoint: Option<String>,
    timeout: Option<u64>,
    out: Option<PathBuf>,
    feature: Option<String>,
) -> Result<(), CliError> {
    let settings = Settings::load();
    let endpoint = endpoint.unwrap_or(settings.service.endpoint);
    let timeout = Duration::from_secs(timeout.unwrap_or(settings.service.timeout_secs));

    let raw = read_input(&input)?;
    let table = load_table(&raw)?;
    let analysis = run_analysis(&table, &endpoint, timeout)?;

    let s = &analysis.summary;
    println!("analyzed      {}", s.total);
    println!("authentic     {}", s.n_true);
    println!("counterfeit   {}", s.n_false);
    println!("counterfeit % {:.1}", s.false_percentage);
    if analysis.stats_disagree {
        eprintln!("warning: service-reported stats disagree with the returned labels; using the recount");
    }

    if let Some(name) = feature {
        let joined = LabeledTable::join(&table, &analysis.response)
            .map_err(|e| CliError::new(EXIT_USAGE, e.to_string()))?;
        let part = joined.partition(&name).ok_or_else(|| {
            CliError::new(EXIT_USAGE, format!("no column named '{name}'"))
        })?;
        println!();
        println!("{name} by label:");
        println!("  Vrai: n={} {}", part.vrai.len(), range_of(&part.vrai));
        println!("  Faux: n={} {}", part.faux.len(), range_of(&part.faux));
    }

    if let Some(path) = out {
        // `--out some/dir` writes the conventional filename inside it
        let path = if path.is_dir() { path.join(PREDICTIONS_FILENAME) } else { path };
        write_predictions_csv(&path, &analysis.response.predictions)
            .map_err(|e| CliError::new(EXIT_EXPORT, e.to_string()))?;
        println!();
        println!("predictions written to {}", path.display());
    }

    Ok(())
}

fn range_of(values: &[f64]) -> String {
    match (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) {
        (Some(min), Some(max)) => format!("range {min}..{max}"),
        _ => String::from("(no values)"),
    }
}

fn cmd_check(input: PathBuf) -> Result<(), CliError> {
    let raw = read_input(&input)?;
    let table = load_table(&raw)?;

    println!("rows          {}", table.n_rows());
    println!("columns       {}", table.n_cols());
    println!("missing cells {}", table.missing_cells());
    println!("schema        ok");
    Ok(())
}

fn cmd_describe(input: PathBuf) -> Result<(), CliError> {
    let raw = read_input(&input)?;
    // Describe works on any parseable table; schema is not required here
    let table = import_bytes(&raw).map_err(|e| {
        CliError::new(
            billetscan_cli::exit_codes::EXIT_INPUT_MALFORMED,
            format!("cannot read CSV: {e}"),
        )
    })?;

    let stats = describe(&table);
    if stats.is_empty() {
        println!("no numeric columns");
        return Ok(());
    }

    println!(
        "{:<14} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "mean", "std", "min", "max"
    );
    for col in stats {
        println!(
            "{:<14} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            col.name, col.count, col.mean, col.std, col.min, col.max
        );
    }

    if validate_schema(&table).is_err() {
        eprintln!("note: this file is missing required columns and cannot be analyzed as-is");
    }
    Ok(())
}
