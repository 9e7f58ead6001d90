//! runtab - Entry Point

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use runtab::config::{self, CliOverrides, ColumnSpec, FieldRef, OutputFormat};
use runtab::model::AppError;
use runtab::table::MAX_COLUMN_SIZE;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// runtab - tabulate grouped JSON experiment logs
#[derive(Parser, Debug)]
#[command(name = "runtab")]
#[command(version)]
#[command(about = "Group a JSON array of run records into trials and print them as a table")]
pub struct Args {
    /// JSON file holding an array of records (`-` reads stdin)
    pub file: PathBuf,

    /// Records per trial
    #[arg(short = 'n', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub commands_per_entry: Option<usize>,

    /// Leading records to skip
    #[arg(short, long)]
    pub offset: Option<usize>,

    /// Column as HEADER=INDEX:KEY[:TRANSFORM], transform `basename` or `pattern:<regex>`
    #[arg(short = 'c', long = "column", value_name = "SPEC")]
    pub columns: Vec<ColumnSpec>,

    /// Fallback for a header as HEADER=VALUE (VALUE is JSON, or a plain string)
    #[arg(short = 'd', long = "default", value_name = "HEADER=VALUE", value_parser = config::parse_default)]
    pub defaults: Vec<(String, Value)>,

    /// Sort rows by the column with this header
    #[arg(short, long, value_name = "HEADER")]
    pub sort: Option<String>,

    /// Print CSV instead of the text table
    #[arg(long)]
    pub csv: bool,

    /// CSV separator
    #[arg(long)]
    pub separator: Option<String>,

    /// Quote CSV cells containing the separator, quotes or newlines
    #[arg(long)]
    pub quote: bool,

    /// Print a header line in CSV output
    #[arg(long)]
    pub csv_header: bool,

    /// Width of text columns
    #[arg(short = 'w', long, value_parser = RangedU64ValueParser::<usize>::new().range(..=MAX_COLUMN_SIZE as u64))]
    pub column_size: Option<usize>,

    /// Print the sum of a field over all rows, as INDEX:KEY
    #[arg(long, value_name = "INDEX:KEY")]
    pub sum: Vec<FieldRef>,

    /// Print the number of distinct values of a field, as INDEX:KEY
    #[arg(long, value_name = "INDEX:KEY")]
    pub unique: Vec<FieldRef>,

    /// Path to report file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Flags as config overrides. Boolean flags only override when present.
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            commands_per_entry: self.commands_per_entry,
            offset: self.offset,
            column_size: self.column_size,
            format: self.csv.then_some(OutputFormat::Csv),
            separator: self.separator.clone(),
            quote: self.quote.then_some(true),
            csv_header: self.csv_header.then_some(true),
            sort_by: self.sort.clone(),
            columns: self.columns.clone(),
            defaults: self.defaults.clone(),
            sum: self.sum.clone(),
            unique: self.unique.clone(),
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Report File → Env Vars → CLI Args
    let config = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged)?;
        config::apply_cli_overrides(with_env, args.overrides())
    };

    runtab::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let input_source = runtab::source::detect_input_source(args.file);
    let records = input_source.load()?;
    info!(origin = %input_source.origin(), records = records.len(), "Loaded records");

    let output = runtab::report::run(&config, records)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "runtab failed");
            eprintln!("runtab: {err}");
            ExitCode::FAILURE
        }
    }
}
