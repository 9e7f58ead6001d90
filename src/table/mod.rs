//! Table builder over grouped log records.
//!
//! A [`LogTable`] partitions a record sequence into fixed-size slices (one
//! per trial), holds the column definitions and defaults that turn a slice
//! into a row, and renders the result as aligned text or CSV.
//!
//! # Slicing
//!
//! After dropping `offset` leading records, a sequence of length `L` yields
//! `floor((L - 1) / G)` slices of `G = commands_per_entry` records each, or
//! zero slices when `L == 0`. Records past the last full slice are dropped.
//! Note the `- 1`: when `L` is a multiple of `G`, the final group is dropped
//! as well. Report scripts written against this count depend on it.

use crate::model::error::TableError;
use crate::model::{Record, Slice};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

pub mod column;
pub mod format;
pub mod render;

pub use column::{Column, ComputeFn, Transform, TransformSpec};
pub use format::{basename, pattern_extract, PatternExtract};
pub use render::{cell_text, compare_values, CsvOptions, Quoting};

use column::describe_field;

/// Default width of every rendered text column.
pub const DEFAULT_COLUMN_SIZE: usize = 12;

/// Widest text column accepted; larger sizes are clamped to it.
pub const MAX_COLUMN_SIZE: usize = 1024;

/// Partition `records` into slices of `commands_per_entry` after skipping
/// `offset` records.
///
/// `commands_per_entry` must be non-zero; [`LogTable`] validates it before
/// calling this.
pub fn chunked(records: Vec<Record>, commands_per_entry: usize, offset: usize) -> Vec<Slice> {
    let total = records.len();
    let remaining = total.saturating_sub(offset);
    let count = remaining.saturating_sub(1) / commands_per_entry;

    let mut records = records.into_iter().skip(offset);
    let slices: Vec<Slice> = (0..count)
        .map(|_| records.by_ref().take(commands_per_entry).collect())
        .collect();

    debug!(
        total,
        offset,
        commands_per_entry,
        slices = count,
        dropped = remaining - count * commands_per_entry,
        "Partitioned records into slices"
    );
    slices
}

/// Result of [`LogTable::sum`].
///
/// Integer fields sum exactly; a single float (or an `i64` overflow) turns
/// the total into a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Total {
    /// Every summand was an `i64` and the sum fits.
    Integer(i64),
    /// At least one float summand, or the integer sum overflowed.
    Float(f64),
}

impl Total {
    fn add(self, number: &Number) -> Total {
        match (self, number.as_i64()) {
            (Total::Integer(acc), Some(n)) => match acc.checked_add(n) {
                Some(sum) => Total::Integer(sum),
                None => Total::Float(acc as f64 + n as f64),
            },
            (acc, _) => Total::Float(acc.as_f64() + number.as_f64().unwrap_or(f64::NAN)),
        }
    }

    /// The total as a float, whichever variant it is.
    pub fn as_f64(self) -> f64 {
        match self {
            Total::Integer(n) => n as f64,
            Total::Float(f) => f,
        }
    }
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Total::Integer(n) => write!(f, "{}", n),
            Total::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Total::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Grouped records plus the column layout that turns them into a table.
///
/// Lifecycle: construct once, register columns and defaults, optionally sort,
/// then render. Headers and columns are always co-indexed.
#[derive(Debug)]
pub struct LogTable {
    headers: Vec<String>,
    columns: Vec<Column>,
    /// Defaults keyed by header label; shared by every column with that label.
    defaults: HashMap<String, Value>,
    /// Defaults keyed by column position; consulted before `defaults`.
    column_defaults: HashMap<usize, Value>,
    column_size: usize,
    commands_per_entry: usize,
    slices: Vec<Slice>,
}

impl LogTable {
    /// Load `path` and partition its records.
    ///
    /// # Errors
    ///
    /// `TableError::InvalidCommandsPerEntry` if `commands_per_entry` is zero.
    /// The load itself fails with [`DataFormatError`](crate::model::DataFormatError),
    /// which is why the outer error is [`AppError`](crate::model::AppError).
    pub fn open(
        path: impl AsRef<Path>,
        commands_per_entry: usize,
        offset: usize,
    ) -> Result<Self, crate::model::AppError> {
        if commands_per_entry == 0 {
            return Err(TableError::InvalidCommandsPerEntry(commands_per_entry).into());
        }
        let records = crate::source::file::load_records(path)?;
        Ok(Self::from_records(records, commands_per_entry, offset)?)
    }

    /// Partition an in-memory record sequence.
    ///
    /// An `offset` beyond the sequence yields an empty table, not an error.
    ///
    /// # Errors
    ///
    /// `TableError::InvalidCommandsPerEntry` if `commands_per_entry` is zero.
    pub fn from_records(
        records: Vec<Record>,
        commands_per_entry: usize,
        offset: usize,
    ) -> Result<Self, TableError> {
        if commands_per_entry == 0 {
            return Err(TableError::InvalidCommandsPerEntry(commands_per_entry));
        }
        Ok(Self {
            headers: Vec::new(),
            columns: Vec::new(),
            defaults: HashMap::new(),
            column_defaults: HashMap::new(),
            column_size: DEFAULT_COLUMN_SIZE,
            commands_per_entry,
            slices: chunked(records, commands_per_entry, offset),
        })
    }

    /// Append a column. Duplicate headers are allowed.
    ///
    /// Nothing is validated here; an unresolvable column fails when rendered.
    pub fn set_column(&mut self, header: impl Into<String>, column: Column) {
        self.headers.push(header.into());
        self.columns.push(column);
    }

    /// Fallback for every reference column labelled `header` whose key is
    /// absent. Overwrites an earlier default for the same header.
    pub fn set_default(&mut self, header: impl Into<String>, value: Value) {
        self.defaults.insert(header.into(), value);
    }

    /// Fallback for the column at `column_index` only.
    ///
    /// Takes precedence over a header default and is unaffected by other
    /// columns sharing the same header.
    pub fn set_column_default(&mut self, column_index: usize, value: Value) {
        self.column_defaults.insert(column_index, value);
    }

    /// Width of every text column, at most [`MAX_COLUMN_SIZE`]. Wider cells
    /// are not truncated.
    pub fn set_column_size(&mut self, column_size: usize) {
        self.column_size = column_size.min(MAX_COLUMN_SIZE);
    }

    /// Stable in-place reorder of the rows by a caller-supplied key.
    pub fn sort_by_key<K, F>(&mut self, mut key: F)
    where
        K: Ord,
        F: FnMut(&[Record]) -> K,
    {
        self.slices.sort_by_key(|slice| key(slice.as_slice()));
    }

    /// Stable in-place reorder of the rows by a comparator.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&[Record], &[Record]) -> Ordering,
    {
        self.slices.sort_by(|a, b| compare(a.as_slice(), b.as_slice()));
    }

    /// Stable sort by the resolved value of a column, ordered by
    /// [`compare_values`].
    ///
    /// Every row is resolved before anything moves, so a failure leaves the
    /// order unchanged.
    ///
    /// # Errors
    ///
    /// Any resolution error of the column.
    pub fn sort_by_column(&mut self, column_index: usize) -> Result<(), TableError> {
        let keys = self
            .slices
            .iter()
            .map(|slice| self.resolve(slice, column_index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut keyed: Vec<(Value, Slice)> = keys
            .into_iter()
            .zip(std::mem::take(&mut self.slices))
            .collect();
        keyed.sort_by(|a, b| compare_values(&a.0, &b.0));
        self.slices = keyed.into_iter().map(|(_, slice)| slice).collect();
        Ok(())
    }

    /// [`sort_by_column`](Self::sort_by_column) on the first column labelled
    /// `header`.
    ///
    /// # Errors
    ///
    /// `TableError::UnknownHeader` if no column carries `header`.
    pub fn sort_by_header(&mut self, header: &str) -> Result<(), TableError> {
        let index = self
            .headers
            .iter()
            .position(|h| h == header)
            .ok_or_else(|| TableError::UnknownHeader(header.to_string()))?;
        self.sort_by_column(index)
    }

    /// Resolve the cell of column `column_index` for `slice`.
    ///
    /// For a reference column: the raw value if the key is present, else the
    /// positional default, else the header default, else
    /// `TableError::MissingField`. An out-of-range record index counts as a
    /// missing key. The transform, if any, runs on whichever value was found.
    ///
    /// # Errors
    ///
    /// `NoSuchColumn`, `MissingField`, `Transform`, or whatever a computed
    /// column returns.
    pub fn resolve(&self, slice: &[Record], column_index: usize) -> Result<Value, TableError> {
        let column = self
            .columns
            .get(column_index)
            .ok_or(TableError::NoSuchColumn {
                index: column_index,
                count: self.columns.len(),
            })?;

        match column {
            Column::Reference {
                record_index,
                key,
                transform,
            } => {
                let value = match lookup(slice, *record_index, key) {
                    Some(raw) => raw.clone(),
                    None => self
                        .default_for(column_index)
                        .cloned()
                        .ok_or_else(|| TableError::MissingField {
                            column: column.describe(),
                            slice: slice_json(slice),
                        })?,
                };
                match transform {
                    Some(transform) => {
                        transform
                            .apply(&value)
                            .map_err(|source| TableError::Transform {
                                column: column.describe(),
                                source,
                            })
                    }
                    None => Ok(value),
                }
            }
            Column::Computed { compute, .. } => compute(slice),
        }
    }

    fn default_for(&self, column_index: usize) -> Option<&Value> {
        self.column_defaults.get(&column_index).or_else(|| {
            self.headers
                .get(column_index)
                .and_then(|header| self.defaults.get(header))
        })
    }

    /// Resolve every column of one row, in column order.
    pub fn row(&self, slice: &[Record]) -> Result<Vec<Value>, TableError> {
        (0..self.columns.len())
            .map(|index| self.resolve(slice, index))
            .collect()
    }

    /// Arithmetic sum of `slice[record_index][key]` over all rows.
    ///
    /// Defaults are not consulted. An empty table sums to `Integer(0)`.
    ///
    /// # Errors
    ///
    /// `MissingField` for any row lacking the field, `NotNumeric` for any
    /// value that is not a JSON number.
    pub fn sum(&self, record_index: usize, key: &str) -> Result<Total, TableError> {
        self.slices
            .iter()
            .try_fold(Total::Integer(0), |total, slice| {
                match field(slice, record_index, key)? {
                    Value::Number(n) => Ok(total.add(n)),
                    other => Err(TableError::NotNumeric {
                        column: describe_field(record_index, key),
                        value: other.to_string(),
                    }),
                }
            })
    }

    /// Number of distinct values of `slice[record_index][key]` over all rows.
    ///
    /// Values are equal when [`compare_values`] orders them equal: numbers
    /// compare by numeric value (`1` and `1.0` are one value), everything
    /// else by content. Booleans never equal numbers.
    ///
    /// # Errors
    ///
    /// `MissingField` for any row lacking the field.
    pub fn unique_count(&self, record_index: usize, key: &str) -> Result<usize, TableError> {
        let mut seen: Vec<&Value> = Vec::new();
        for slice in &self.slices {
            let value = field(slice, record_index, key)?;
            if !seen
                .iter()
                .any(|known| compare_values(known, value) == Ordering::Equal)
            {
                seen.push(value);
            }
        }
        Ok(seen.len())
    }

    /// Rows in current order, one slice per row.
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Header labels, co-indexed with [`columns`](Self::columns).
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Column definitions, co-indexed with [`headers`](Self::headers).
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Records per slice.
    pub fn commands_per_entry(&self) -> usize {
        self.commands_per_entry
    }

    /// Width of each text column.
    pub fn column_size(&self) -> usize {
        self.column_size
    }
}

fn lookup<'a>(slice: &'a [Record], record_index: usize, key: &str) -> Option<&'a Value> {
    slice.get(record_index).and_then(|record| record.get(key))
}

fn field<'a>(slice: &'a [Record], record_index: usize, key: &str) -> Result<&'a Value, TableError> {
    lookup(slice, record_index, key).ok_or_else(|| TableError::MissingField {
        column: describe_field(record_index, key),
        slice: slice_json(slice),
    })
}

fn slice_json(slice: &[Record]) -> String {
    Value::Array(slice.to_vec()).to_string()
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
