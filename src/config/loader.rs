//! Report file loading with precedence handling.

use super::column_spec::{ColumnSpec, FieldRef};
use crate::table::{CsvOptions, Quoting, DEFAULT_COLUMN_SIZE, MAX_COLUMN_SIZE};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable naming the report file.
pub const CONFIG_ENV: &str = "RUNTAB_CONFIG";
/// Environment variable overriding the output format.
pub const FORMAT_ENV: &str = "RUNTAB_FORMAT";
/// Environment variable overriding the text column width.
pub const COLUMN_SIZE_ENV: &str = "RUNTAB_COLUMN_SIZE";

/// Errors that can occur during config loading and resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (permissions, directory, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown fields.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A column specification could not be understood.
    #[error("Invalid column '{spec}': {reason}")]
    InvalidColumnSpec {
        /// The text as given.
        spec: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An aggregate field is not of the form `INDEX:KEY`.
    #[error("Invalid field '{0}': expected INDEX:KEY")]
    InvalidFieldRef(String),

    /// A default is not of the form `HEADER=VALUE`.
    #[error("Invalid default '{0}': expected HEADER=VALUE")]
    InvalidDefault(String),

    /// Output format is neither `text` nor `csv`.
    #[error("Unknown output format '{0}': expected 'text' or 'csv'")]
    UnknownFormat(String),

    /// An environment override holds an unusable value.
    #[error("Invalid value '{value}' in ${var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Its value.
        value: String,
    },

    /// Neither the command line nor the report file set commands_per_entry.
    #[error("commands_per_entry is required: pass --commands-per-entry or set it in the report file")]
    MissingCommandsPerEntry,
}

/// How the table is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned, pipe-bordered text with a header row.
    #[default]
    Text,
    /// Separator-joined lines.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// TOML report file structure.
///
/// All fields are optional. Corresponds to `~/.config/runtab/config.toml`
/// or a file passed with `--config`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Records per trial.
    #[serde(default)]
    pub commands_per_entry: Option<usize>,

    /// Leading records to skip.
    #[serde(default)]
    pub offset: Option<usize>,

    /// Width of text columns.
    #[serde(default)]
    pub column_size: Option<usize>,

    /// `text` or `csv`.
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// CSV separator.
    #[serde(default)]
    pub separator: Option<String>,

    /// Quote CSV cells that contain the separator, quotes or newlines.
    #[serde(default)]
    pub quote: Option<bool>,

    /// Emit a header line in CSV output.
    #[serde(default)]
    pub csv_header: Option<bool>,

    /// Header of the column to sort rows by.
    #[serde(default)]
    pub sort_by: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Column definitions, in display order.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,

    /// Header defaults.
    #[serde(default)]
    pub defaults: BTreeMap<String, Value>,

    /// Fields to sum after the table.
    #[serde(default)]
    pub sum: Vec<FieldRef>,

    /// Fields to count distinct values of after the table.
    #[serde(default)]
    pub unique: Vec<FieldRef>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, report file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Records per trial; required before a table can be built.
    pub commands_per_entry: Option<usize>,
    /// Leading records to skip.
    pub offset: usize,
    /// Width of text columns.
    pub column_size: usize,
    /// Output format.
    pub format: OutputFormat,
    /// CSV settings, used when `format` is CSV.
    pub csv: CsvOptions,
    /// Header of the sort column.
    pub sort_by: Option<String>,
    /// Columns: report file entries first, then CLI entries.
    pub columns: Vec<ColumnSpec>,
    /// Header defaults; CLI entries overwrite file entries.
    pub defaults: BTreeMap<String, Value>,
    /// Fields to sum.
    pub sum: Vec<FieldRef>,
    /// Fields to count distinct values of.
    pub unique: Vec<FieldRef>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            commands_per_entry: None,
            offset: 0,
            column_size: DEFAULT_COLUMN_SIZE,
            format: OutputFormat::Text,
            csv: CsvOptions::default(),
            sort_by: None,
            columns: Vec::new(),
            defaults: BTreeMap::new(),
            sum: Vec::new(),
            unique: Vec::new(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// `commands_per_entry`, which has no default.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingCommandsPerEntry` if no source set it.
    pub fn require_commands_per_entry(&self) -> Result<usize, ConfigError> {
        self.commands_per_entry
            .ok_or(ConfigError::MissingCommandsPerEntry)
    }
}

/// Values taken from command-line flags.
///
/// `None` / empty means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--commands-per-entry`
    pub commands_per_entry: Option<usize>,
    /// `--offset`
    pub offset: Option<usize>,
    /// `--column-size`
    pub column_size: Option<usize>,
    /// `Some(Csv)` when `--csv` is given.
    pub format: Option<OutputFormat>,
    /// `--separator`
    pub separator: Option<String>,
    /// `Some(true)` when `--quote` is given.
    pub quote: Option<bool>,
    /// `Some(true)` when `--csv-header` is given.
    pub csv_header: Option<bool>,
    /// `--sort`
    pub sort_by: Option<String>,
    /// Repeated `--column`, appended after report file columns.
    pub columns: Vec<ColumnSpec>,
    /// Repeated `--default`, overwriting report file defaults by header.
    pub defaults: Vec<(String, Value)>,
    /// Repeated `--sum`.
    pub sum: Vec<FieldRef>,
    /// Repeated `--unique`.
    pub unique: Vec<FieldRef>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/runtab/runtab.log` on Unix-like systems, or the
/// platform equivalent. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("runtab").join("runtab.log")
    } else {
        PathBuf::from("runtab.log")
    }
}

/// Load a report file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if the file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/runtab/config.toml` on Unix, appropriate path on other
/// platforms. Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("runtab").join("config.toml"))
}

/// Load the report file with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `RUNTAB_CONFIG` environment variable
/// 3. Default path `~/.config/runtab/config.toml`
///
/// Missing files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge a report file into defaults to create a resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use
/// the default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let csv = CsvOptions {
        separator: config.separator.unwrap_or(defaults.csv.separator),
        quoting: quoting(config.quote).unwrap_or(defaults.csv.quoting),
        include_header: config.csv_header.unwrap_or(defaults.csv.include_header),
    };

    ResolvedConfig {
        commands_per_entry: config.commands_per_entry.or(defaults.commands_per_entry),
        offset: config.offset.unwrap_or(defaults.offset),
        column_size: config.column_size.unwrap_or(defaults.column_size),
        format: config.format.unwrap_or(defaults.format),
        csv,
        sort_by: config.sort_by.or(defaults.sort_by),
        columns: config.columns,
        defaults: config.defaults,
        sum: config.sum,
        unique: config.unique,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

fn quoting(quote: Option<bool>) -> Option<Quoting> {
    quote.map(|q| if q { Quoting::Minimal } else { Quoting::Never })
}

/// Apply environment variable overrides to a resolved config.
///
/// Checks for:
/// - `RUNTAB_FORMAT`: `text` or `csv`
/// - `RUNTAB_COLUMN_SIZE`: text column width, at most [`MAX_COLUMN_SIZE`]
///
/// # Errors
///
/// `ConfigError::InvalidEnv` if a variable is set to an unusable value.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(format) = std::env::var(FORMAT_ENV) {
        config.format = format.parse().map_err(|_| ConfigError::InvalidEnv {
            var: FORMAT_ENV,
            value: format.clone(),
        })?;
    }

    if let Ok(size) = std::env::var(COLUMN_SIZE_ENV) {
        config.column_size = size
            .parse()
            .ok()
            .filter(|width| *width <= MAX_COLUMN_SIZE)
            .ok_or_else(|| ConfigError::InvalidEnv {
                var: COLUMN_SIZE_ENV,
                value: size.clone(),
            })?;
    }

    Ok(config)
}

/// Apply CLI argument overrides to a resolved config.
///
/// Scalar flags replace earlier values; columns and aggregate fields are
/// appended after those from the report file; defaults overwrite by header.
///
/// Precedence chain: Defaults → Report File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(n) = cli.commands_per_entry {
        config.commands_per_entry = Some(n);
    }
    if let Some(offset) = cli.offset {
        config.offset = offset;
    }
    if let Some(size) = cli.column_size {
        config.column_size = size;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(separator) = cli.separator {
        config.csv.separator = separator;
    }
    if let Some(quoting) = quoting(cli.quote) {
        config.csv.quoting = quoting;
    }
    if let Some(header) = cli.csv_header {
        config.csv.include_header = header;
    }
    if let Some(sort_by) = cli.sort_by {
        config.sort_by = Some(sort_by);
    }

    config.columns.extend(cli.columns);
    config.defaults.extend(cli.defaults);
    config.sum.extend(cli.sum);
    config.unique.extend(cli.unique);

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
