//! Text and CSV output for [`LogTable`].
//!
//! Text rows look like `| value | value |`, each cell right-aligned to the
//! table's column size. Cells are never truncated, so an over-wide value
//! pushes the rest of its row to the right.

use super::LogTable;
use crate::model::error::TableError;
use serde_json::Value;
use std::cmp::Ordering;
use std::io::Write;
use unicode_width::UnicodeWidthStr;

/// Natural string form of a cell: strings unquoted, everything else as
/// compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Total order over JSON values used for sorting rows.
///
/// Types rank `null < bool < number < string < array < object`. Numbers
/// compare numerically, strings lexically, arrays element-wise, objects by
/// their serialized form.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare_values(x, y))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Whether CSV cells are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quoting {
    /// Cells are written verbatim. A cell containing the separator or a
    /// newline corrupts the line structure.
    #[default]
    Never,
    /// Cells containing the separator, `"`, `\n` or `\r` are wrapped in
    /// double quotes with inner quotes doubled.
    Minimal,
}

/// CSV export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Placed between cells; may be more than one character.
    pub separator: String,
    /// Escaping applied to each cell.
    pub quoting: Quoting,
    /// Emit the header labels as the first line.
    pub include_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            quoting: Quoting::Never,
            include_header: false,
        }
    }
}

impl CsvOptions {
    /// Default options with another separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..Self::default()
        }
    }

    fn field(&self, cell: &str) -> String {
        match self.quoting {
            Quoting::Never => cell.to_string(),
            Quoting::Minimal => {
                let needs_quotes = (!self.separator.is_empty() && cell.contains(&self.separator))
                    || cell.contains(['"', '\n', '\r']);
                if needs_quotes {
                    format!("\"{}\"", cell.replace('"', "\"\""))
                } else {
                    cell.to_string()
                }
            }
        }
    }

    fn line(&self, cells: &[String]) -> String {
        let fields: Vec<String> = cells.iter().map(|cell| self.field(cell)).collect();
        fields.join(&self.separator)
    }
}

fn pad_left(text: &str, width: usize) -> String {
    let shown = UnicodeWidthStr::width(text);
    if shown >= width {
        text.to_string()
    } else {
        format!("{}{}", " ".repeat(width - shown), text)
    }
}

fn push_row(out: &mut String, cells: &[String], width: usize) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&pad_left(cell, width));
        out.push_str(" |");
    }
    out.push('\n');
}

impl LogTable {
    /// Cell strings of every row, in current row order.
    fn text_rows(&self) -> Result<Vec<Vec<String>>, TableError> {
        self.slices
            .iter()
            .map(|slice| -> Result<Vec<String>, TableError> {
                Ok(self.row(slice)?.iter().map(cell_text).collect())
            })
            .collect()
    }

    /// Aligned text table: a header row, then one row per slice.
    ///
    /// # Errors
    ///
    /// The first cell that fails to resolve.
    pub fn render(&self) -> Result<String, TableError> {
        let rows = self.text_rows()?;
        let mut out = String::new();
        push_row(&mut out, &self.headers, self.column_size);
        for row in &rows {
            push_row(&mut out, row, self.column_size);
        }
        Ok(out)
    }

    /// CSV text, one newline-terminated line per slice.
    ///
    /// # Errors
    ///
    /// The first cell that fails to resolve. Nothing is returned in that case.
    pub fn to_csv(&self, options: &CsvOptions) -> Result<String, TableError> {
        let rows = self.text_rows()?;
        let mut out = String::new();
        if options.include_header {
            out.push_str(&options.line(&self.headers));
            out.push('\n');
        }
        for row in &rows {
            out.push_str(&options.line(row));
            out.push('\n');
        }
        Ok(out)
    }

    /// Write [`to_csv`](Self::to_csv) output to `writer`.
    ///
    /// All cells are resolved before the first byte is written.
    ///
    /// # Errors
    ///
    /// `AppError::Table` for resolution failures, `AppError::Output` for
    /// write failures.
    pub fn write_csv<W: Write>(
        &self,
        writer: &mut W,
        options: &CsvOptions,
    ) -> Result<(), crate::model::AppError> {
        let csv = self.to_csv(options)?;
        writer.write_all(csv.as_bytes())?;
        Ok(())
    }
}
