//! Formatter helpers usable as column transforms.
//!
//! Both are pure and independent of any table state.

use crate::model::error::TransformError;
use regex::Regex;

/// Short name of the file a command line operates on.
///
/// Takes the last whitespace-separated token, strips the directory part and
/// then the extension. A name made only of leading dots plus an extension
/// (`.bashrc`) keeps its dot.
///
/// # Errors
///
/// `TransformError::EmptyValue` if `value` has no tokens.
///
/// # Examples
///
/// ```
/// use runtab::table::format::basename;
///
/// assert_eq!(basename("run a/b/c.txt").unwrap(), "c");
/// assert_eq!(basename("read_aiger ../bench/adder.tar.gz").unwrap(), "adder.tar");
/// ```
pub fn basename(value: &str) -> Result<String, TransformError> {
    let token = value
        .split_whitespace()
        .last()
        .ok_or(TransformError::EmptyValue)?;
    let file_name = token.rsplit('/').next().unwrap_or(token);
    Ok(strip_extension(file_name).to_string())
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => &name[..dot],
        _ => name,
    }
}

/// Compiled regular expression returning its first capture group.
#[derive(Debug, Clone)]
pub struct PatternExtract {
    regex: Regex,
}

impl PatternExtract {
    /// Source text of the expression.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Search `input` and return the text of capture group 1.
    ///
    /// # Errors
    ///
    /// `TransformError::NoMatch` when the expression does not match, has no
    /// group 1, or group 1 did not participate in the match.
    pub fn extract(&self, input: &str) -> Result<String, TransformError> {
        self.regex
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| TransformError::NoMatch {
                pattern: self.pattern().to_string(),
                input: input.to_string(),
            })
    }
}

/// Build an extractor for the first capture group of `expression`.
///
/// The expression is compiled up front, so a malformed pattern fails here
/// rather than on the first cell.
///
/// # Errors
///
/// `TransformError::InvalidPattern` if the expression does not compile.
///
/// # Examples
///
/// ```
/// use runtab::table::format::pattern_extract;
///
/// let id = pattern_extract(r"id=(\d+)").unwrap();
/// assert_eq!(id.extract("id=42 other").unwrap(), "42");
/// assert!(id.extract("no match").is_err());
/// ```
pub fn pattern_extract(expression: &str) -> Result<PatternExtract, TransformError> {
    let regex = Regex::new(expression).map_err(|e| TransformError::InvalidPattern {
        pattern: expression.to_string(),
        message: e.to_string(),
    })?;
    Ok(PatternExtract { regex })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_takes_last_token_stem() {
        assert_eq!(basename("run a/b/c.txt").unwrap(), "c");
    }

    #[test]
    fn basename_of_single_token() {
        assert_eq!(basename("adder.v").unwrap(), "adder");
    }

    #[test]
    fn basename_strips_only_last_extension() {
        assert_eq!(basename("cat x/y.tar.gz").unwrap(), "y.tar");
    }

    #[test]
    fn basename_without_extension() {
        assert_eq!(basename("tool /usr/bin/abc").unwrap(), "abc");
    }

    #[test]
    fn basename_keeps_leading_dot_names() {
        assert_eq!(basename("source ~/.bashrc").unwrap(), ".bashrc");
        assert_eq!(basename("ls ..").unwrap(), "..");
    }

    #[test]
    fn basename_of_trailing_slash_is_empty() {
        assert_eq!(basename("cd dir/").unwrap(), "");
    }

    #[test]
    fn basename_ignores_surrounding_whitespace() {
        assert_eq!(basename("  run\ta.txt \n").unwrap(), "a");
    }

    #[test]
    fn basename_rejects_blank_input() {
        assert_eq!(basename(""), Err(TransformError::EmptyValue));
        assert_eq!(basename("   "), Err(TransformError::EmptyValue));
    }

    #[test]
    fn pattern_extract_returns_first_group() {
        let extract = pattern_extract(r"id=(\d+)").unwrap();
        assert_eq!(extract.extract("id=42 other").unwrap(), "42");
    }

    #[test]
    fn pattern_extract_searches_anywhere() {
        let extract = pattern_extract(r"gates: (\d+)").unwrap();
        assert_eq!(extract.extract("[i] gates: 17, depth: 4").unwrap(), "17");
    }

    #[test]
    fn pattern_extract_fails_without_match() {
        let extract = pattern_extract(r"id=(\d+)").unwrap();
        assert_eq!(
            extract.extract("no match"),
            Err(TransformError::NoMatch {
                pattern: r"id=(\d+)".to_string(),
                input: "no match".to_string(),
            })
        );
    }

    #[test]
    fn pattern_extract_fails_without_group() {
        let extract = pattern_extract(r"id=\d+").unwrap();
        assert!(extract.extract("id=42").is_err());
    }

    #[test]
    fn pattern_extract_fails_when_group_does_not_participate() {
        let extract = pattern_extract(r"x(\d)?").unwrap();
        assert!(extract.extract("x").is_err());
    }

    #[test]
    fn pattern_extract_rejects_malformed_expression() {
        let result = pattern_extract("(unclosed");
        match result {
            Err(TransformError::InvalidPattern { pattern, message }) => {
                assert_eq!(pattern, "(unclosed");
                assert!(!message.is_empty());
            }
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }
}
