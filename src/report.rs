//! Turns a resolved configuration and a record sequence into printed output.

use crate::config::{FieldRef, OutputFormat, ResolvedConfig};
use crate::model::{AppError, Record, TableError};
use crate::table::LogTable;
use tracing::info;

/// Build a table with the configured columns, defaults, width and order.
///
/// # Errors
///
/// Missing `commands_per_entry`, a column whose transform does not build,
/// or a sort that cannot resolve its column.
pub fn build_table(config: &ResolvedConfig, records: Vec<Record>) -> Result<LogTable, AppError> {
    let commands_per_entry = config.require_commands_per_entry()?;
    let mut table = LogTable::from_records(records, commands_per_entry, config.offset)?;
    table.set_column_size(config.column_size);

    for (index, spec) in config.columns.iter().enumerate() {
        table.set_column(spec.header.clone(), spec.to_column()?);
        if let Some(default) = &spec.default {
            table.set_column_default(index, default.clone());
        }
    }
    for (header, value) in &config.defaults {
        table.set_default(header.clone(), value.clone());
    }

    if let Some(header) = &config.sort_by {
        table.sort_by_header(header)?;
    }

    info!(
        rows = table.len(),
        columns = table.headers().len(),
        "Built table"
    );
    Ok(table)
}

/// The table in the configured output format.
///
/// # Errors
///
/// The first cell that fails to resolve.
pub fn render_table(config: &ResolvedConfig, table: &LogTable) -> Result<String, TableError> {
    match config.format {
        OutputFormat::Text => table.render(),
        OutputFormat::Csv => table.to_csv(&config.csv),
    }
}

/// `sum(INDEX, KEY) = VALUE` lines followed by `unique(INDEX, KEY) = N` lines.
///
/// # Errors
///
/// A row lacking an aggregated field, or a non-numeric summand.
pub fn aggregate_lines(
    config: &ResolvedConfig,
    table: &LogTable,
) -> Result<Vec<String>, TableError> {
    let mut lines = Vec::with_capacity(config.sum.len() + config.unique.len());
    for FieldRef { record, key } in &config.sum {
        let total = table.sum(*record, key)?;
        lines.push(format!("sum({}, {}) = {}", record, key, total));
    }
    for FieldRef { record, key } in &config.unique {
        let count = table.unique_count(*record, key)?;
        lines.push(format!("unique({}, {}) = {}", record, key, count));
    }
    Ok(lines)
}

/// Full report text: the table, then one line per aggregate.
///
/// Nothing is produced unless every cell and aggregate resolves.
///
/// # Errors
///
/// Any error of [`build_table`], [`render_table`] or [`aggregate_lines`].
pub fn run(config: &ResolvedConfig, records: Vec<Record>) -> Result<String, AppError> {
    let table = build_table(config, records)?;
    let mut out = render_table(config, &table)?;
    for line in aggregate_lines(config, &table)? {
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}
