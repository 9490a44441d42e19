//! Regex-based exclusion rules.
//!
//! Rules are plain regular expressions searched anywhere inside a relative
//! path (`Regex::is_match`), not glob patterns and not anchored to the whole
//! path. `f2` therefore excludes `f2.txt`, `dir/f2.txt` and `af2b/x`.

use regex::Regex;

use crate::error::PatternError;

/// Separator between rules in an `ignore` value.
pub const RULE_DELIMITER: char = ';';

/// A compiled set of exclusion rules.
///
/// An empty set matches nothing.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    rules: Vec<Regex>,
}

impl ExclusionRules {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a `;`-separated rule string.
    ///
    /// Segments are trimmed and empty segments are dropped. Each remaining
    /// segment is compiled verbatim; the first one that fails aborts the whole
    /// set.
    pub fn compile(rule_string: &str) -> Result<Self, PatternError> {
        Self::from_patterns(
            rule_string
                .split(RULE_DELIMITER)
                .map(str::trim)
                .filter(|segment| !segment.is_empty()),
        )
    }

    /// Compile each pattern as-is.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| PatternError {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Check whether any rule occurs within `relative_path`.
    pub fn matches(&self, relative_path: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(relative_path))
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Source text of each rule, in order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Regex::as_str)
    }
}
