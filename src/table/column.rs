//! Column definitions and value transforms.
//!
//! A column is a tagged variant: a reference to `slice[record_index][key]`
//! with an optional transform, or a function computed from the whole slice.

use super::format::{self, PatternExtract};
use crate::model::error::{TableError, TransformError};
use crate::model::Record;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

type TransformFn = Box<dyn Fn(&Value) -> Result<Value, TransformError>>;

/// Function computing a cell from the whole slice.
pub type ComputeFn = Box<dyn Fn(&[Record]) -> Result<Value, TableError>>;

/// A named, fallible value-to-value function applied after lookup.
///
/// The name is display metadata only; it appears in column descriptions and
/// error messages.
pub struct Transform {
    name: String,
    func: TransformFn,
}

impl Transform {
    /// Wrap an arbitrary function.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&Value) -> Result<Value, TransformError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// [`format::basename`] over string values.
    pub fn basename() -> Self {
        Self::new("basename", |value| {
            format::basename(expect_str(value)?).map(Value::String)
        })
    }

    /// [`format::pattern_extract`] over string values.
    ///
    /// # Errors
    ///
    /// `TransformError::InvalidPattern` if `expression` does not compile.
    pub fn pattern(expression: &str) -> Result<Self, TransformError> {
        let extract = format::pattern_extract(expression)?;
        Ok(Self::from_extract(extract))
    }

    fn from_extract(extract: PatternExtract) -> Self {
        let name = format!("pattern:{}", extract.pattern());
        Self::new(name, move |value| {
            extract.extract(expect_str(value)?).map(Value::String)
        })
    }

    /// Name shown in column descriptions, e.g. `basename`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the transform to a resolved value.
    pub fn apply(&self, value: &Value) -> Result<Value, TransformError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").field("name", &self.name).finish()
    }
}

fn expect_str(value: &Value) -> Result<&str, TransformError> {
    value
        .as_str()
        .ok_or_else(|| TransformError::NotAString(value.to_string()))
}

/// Textual name of a built-in transform, as used on the command line and in
/// report files: `basename` or `pattern:<regex>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TransformSpec {
    /// Last token, directory and extension stripped.
    Basename,
    /// First capture group of the regular expression.
    Pattern(String),
}

impl TransformSpec {
    /// Build the runnable transform.
    ///
    /// # Errors
    ///
    /// `TransformError::InvalidPattern` if a pattern does not compile.
    pub fn build(&self) -> Result<Transform, TransformError> {
        match self {
            TransformSpec::Basename => Ok(Transform::basename()),
            TransformSpec::Pattern(expression) => Transform::pattern(expression),
        }
    }
}

impl FromStr for TransformSpec {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "basename" {
            return Ok(TransformSpec::Basename);
        }
        match s.strip_prefix("pattern:") {
            Some(expression) if !expression.is_empty() => {
                Ok(TransformSpec::Pattern(expression.to_string()))
            }
            _ => Err(TransformError::UnknownTransform(s.to_string())),
        }
    }
}

impl TryFrom<String> for TransformSpec {
    type Error = TransformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformSpec::Basename => write!(f, "basename"),
            TransformSpec::Pattern(expression) => write!(f, "pattern:{}", expression),
        }
    }
}

/// How one table cell is obtained from a slice.
pub enum Column {
    /// `slice[record_index][key]`, optionally transformed.
    ///
    /// Defaults registered for the column apply when the key is absent.
    Reference {
        /// Position of the record within the slice.
        record_index: usize,
        /// Key looked up in that record.
        key: String,
        /// Applied to the raw or default value.
        transform: Option<Transform>,
    },
    /// Computed from the whole slice. Defaults never apply.
    Computed {
        /// Name shown in error messages.
        label: String,
        /// Produces the cell value.
        compute: ComputeFn,
    },
}

impl Column {
    /// Reference column without a transform.
    pub fn reference(record_index: usize, key: impl Into<String>) -> Self {
        Column::Reference {
            record_index,
            key: key.into(),
            transform: None,
        }
    }

    /// Column computed from the whole slice.
    pub fn computed(
        label: impl Into<String>,
        compute: impl Fn(&[Record]) -> Result<Value, TableError> + 'static,
    ) -> Self {
        Column::Computed {
            label: label.into(),
            compute: Box::new(compute),
        }
    }

    /// Attach a transform.
    ///
    /// On a reference column this replaces any previous transform. On a
    /// computed column the transform runs on the computed value.
    pub fn with_transform(self, transform: Transform) -> Self {
        match self {
            Column::Reference {
                record_index, key, ..
            } => Column::Reference {
                record_index,
                key,
                transform: Some(transform),
            },
            Column::Computed { label, compute } => {
                let column = format!("<{}>", label);
                Column::Computed {
                    label,
                    compute: Box::new(move |slice: &[Record]| {
                        let value = compute(slice)?;
                        transform
                            .apply(&value)
                            .map_err(|source| TableError::Transform {
                                column: column.clone(),
                                source,
                            })
                    }),
                }
            }
        }
    }

    /// Short description used in error messages: `(0, "t")`,
    /// `(0, "cmd", basename)` or `<label>`.
    pub fn describe(&self) -> String {
        match self {
            Column::Reference {
                record_index,
                key,
                transform: None,
            } => describe_field(*record_index, key),
            Column::Reference {
                record_index,
                key,
                transform: Some(t),
            } => format!("({}, {:?}, {})", record_index, key, t.name()),
            Column::Computed { label, .. } => format!("<{}>", label),
        }
    }
}

/// Description of a bare `(record_index, key)` lookup.
pub(crate) fn describe_field(record_index: usize, key: &str) -> String {
    format!("({}, {:?})", record_index, key)
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Reference {
                record_index,
                key,
                transform,
            } => f
                .debug_struct("Reference")
                .field("record_index", record_index)
                .field("key", key)
                .field("transform", transform)
                .finish(),
            Column::Computed { label, .. } => {
                f.debug_struct("Computed").field("label", label).finish()
            }
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_reference_without_transform() {
        assert_eq!(Column::reference(0, "t").describe(), r#"(0, "t")"#);
    }

    #[test]
    fn describe_reference_with_transform() {
        let column = Column::reference(2, "cmd").with_transform(Transform::basename());
        assert_eq!(column.describe(), r#"(2, "cmd", basename)"#);
    }

    #[test]
    fn describe_computed() {
        let column = Column::computed("records", |slice| Ok(json!(slice.len())));
        assert_eq!(column.to_string(), "<records>");
    }

    #[test]
    fn basename_transform_rejects_non_strings() {
        let result = Transform::basename().apply(&json!(3));
        assert_eq!(result, Err(TransformError::NotAString("3".to_string())));
    }

    #[test]
    fn pattern_transform_extracts_group() {
        let transform = Transform::pattern(r"id=(\d+)").unwrap();
        assert_eq!(transform.name(), r"pattern:id=(\d+)");
        assert_eq!(transform.apply(&json!("id=42 other")), Ok(json!("42")));
    }

    #[test]
    fn transform_on_computed_column_runs_after_compute() {
        let column = Column::computed("first", |slice| Ok(slice[0]["cmd"].clone()))
            .with_transform(Transform::basename());
        let Column::Computed { compute, .. } = column else {
            panic!("Expected computed column");
        };
        let slice = vec![json!({"cmd": "run dir/a.txt"})];
        assert_eq!(compute(&slice[..]).unwrap(), json!("a"));
    }

    #[test]
    fn transform_spec_parses_known_names() {
        assert_eq!("basename".parse::<TransformSpec>(), Ok(TransformSpec::Basename));
        assert_eq!(
            r"pattern:id=(\d+)".parse::<TransformSpec>(),
            Ok(TransformSpec::Pattern(r"id=(\d+)".to_string()))
        );
    }

    #[test]
    fn transform_spec_rejects_unknown_names() {
        assert_eq!(
            "upper".parse::<TransformSpec>(),
            Err(TransformError::UnknownTransform("upper".to_string()))
        );
        assert!("pattern:".parse::<TransformSpec>().is_err());
    }

    #[test]
    fn transform_spec_display_round_trips() {
        let spec = TransformSpec::Pattern("(a)".to_string());
        assert_eq!(spec.to_string().parse::<TransformSpec>(), Ok(spec));
    }

    #[test]
    fn transform_spec_build_reports_invalid_pattern() {
        let spec = TransformSpec::Pattern("(unclosed".to_string());
        assert!(matches!(
            spec.build(),
            Err(TransformError::InvalidPattern { .. })
        ));
    }
}
