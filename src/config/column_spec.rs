//! Textual column, field and default specifications.
//!
//! These are the forms accepted on the command line and in report files:
//!
//! - column: `HEADER=INDEX:KEY[:TRANSFORM]`, e.g. `file=0:cmd:basename`
//! - field:  `INDEX:KEY`, e.g. `1:runtime`
//! - default: `HEADER=JSON`, e.g. `gates=0` (non-JSON text becomes a string)

use super::loader::ConfigError;
use crate::table::{Column, TransformSpec};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A reference column as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    /// Display label.
    pub header: String,
    /// Record position within the slice.
    pub record: usize,
    /// Key looked up in that record.
    pub key: String,
    /// Optional built-in transform.
    #[serde(default)]
    pub transform: Option<TransformSpec>,
    /// Positional default for this column only.
    #[serde(default)]
    pub default: Option<Value>,
}

impl ColumnSpec {
    /// Build the runnable column.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidColumnSpec` if the transform pattern does not
    /// compile.
    pub fn to_column(&self) -> Result<Column, ConfigError> {
        let column = Column::reference(self.record, self.key.clone());
        match &self.transform {
            None => Ok(column),
            Some(spec) => {
                let transform = spec.build().map_err(|e| ConfigError::InvalidColumnSpec {
                    spec: self.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(column.with_transform(transform))
            }
        }
    }
}

impl FromStr for ColumnSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidColumnSpec {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        let (header, rest) = s
            .split_once('=')
            .ok_or_else(|| invalid("expected HEADER=INDEX:KEY[:TRANSFORM]"))?;
        if header.is_empty() {
            return Err(invalid("header is empty"));
        }

        let mut parts = rest.splitn(3, ':');
        let record = parts
            .next()
            .and_then(|index| index.parse::<usize>().ok())
            .ok_or_else(|| invalid("record index must be a non-negative integer"))?;
        let key = parts
            .next()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| invalid("key is missing"))?;
        let transform = parts
            .next()
            .map(|name| name.parse::<TransformSpec>())
            .transpose()
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(ColumnSpec {
            header: header.to_string(),
            record,
            key: key.to_string(),
            transform,
            default: None,
        })
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}:{}", self.header, self.record, self.key)?;
        if let Some(transform) = &self.transform {
            write!(f, ":{}", transform)?;
        }
        Ok(())
    }
}

/// A `(record_index, key)` pair for the aggregate queries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct FieldRef {
    /// Record position within the slice.
    pub record: usize,
    /// Key looked up in that record.
    pub key: String,
}

impl FromStr for FieldRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidFieldRef(s.to_string());
        let (index, key) = s.split_once(':').ok_or_else(invalid)?;
        let record = index.parse::<usize>().map_err(|_| invalid())?;
        if key.is_empty() {
            return Err(invalid());
        }
        Ok(FieldRef {
            record,
            key: key.to_string(),
        })
    }
}

impl TryFrom<String> for FieldRef {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.record, self.key)
    }
}

/// Parse `HEADER=VALUE` into a header default.
///
/// `VALUE` is read as JSON when it parses (`0`, `true`, `"x"`, `[1]`),
/// otherwise it is kept as a plain string.
///
/// # Errors
///
/// `ConfigError::InvalidDefault` if there is no `=` or the header is empty.
pub fn parse_default(s: &str) -> Result<(String, Value), ConfigError> {
    let (header, raw) = s
        .split_once('=')
        .filter(|(header, _)| !header.is_empty())
        .ok_or_else(|| ConfigError::InvalidDefault(s.to_string()))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((header.to_string(), value))
}
