//! A single configured comparison between two roots.

use std::path::PathBuf;

use crate::error::JobError;
use crate::filter::ExclusionRules;

/// One configured pair of roots, consumed by a single comparison.
#[derive(Debug, Clone)]
pub struct ComparisonJob {
    /// Section name the job came from.
    pub label: String,
    /// Root of tree A.
    pub root_a: PathBuf,
    /// Root of tree B.
    pub root_b: PathBuf,
    /// Display name of tree A.
    pub name_a: String,
    /// Display name of tree B.
    pub name_b: String,
    /// Rules applied to both trees.
    pub rules: ExclusionRules,
}

impl ComparisonJob {
    /// Create a job without rules; display names default to `A` and `B`.
    pub fn new(label: impl Into<String>, root_a: impl Into<PathBuf>, root_b: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            root_a: root_a.into(),
            root_b: root_b.into(),
            name_a: "A".to_string(),
            name_b: "B".to_string(),
            rules: ExclusionRules::new(),
        }
    }

    /// Set both display names.
    pub fn with_names(mut self, name_a: impl Into<String>, name_b: impl Into<String>) -> Self {
        self.name_a = name_a.into();
        self.name_b = name_b.into();
        self
    }

    /// Set the exclusion rules.
    pub fn with_rules(mut self, rules: ExclusionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Fail with `DirectoryNotFound` unless both roots exist.
    pub fn ensure_roots_exist(&self) -> Result<(), JobError> {
        for root in [&self.root_a, &self.root_b] {
            if !root.exists() {
                return Err(JobError::DirectoryNotFound {
                    section: self.label.clone(),
                    path: root.clone(),
                });
            }
        }
        Ok(())
    }
}
