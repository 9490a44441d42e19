//! Job configuration document.
//!
//! A TOML file where every top-level table is one comparison job:
//!
//! ```toml
//! [documents]
//! ignore = "\\.DS_Store;^cache"
//! folder_Laptop = "/Users/me/Documents"
//! folder_NAS = "/Volumes/backup/Documents"
//! ```
//!
//! A section names its two roots with `folder_`-prefixed keys; the suffix is
//! the display name. Key order is preserved, so the first root key is side A.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use toml::{Table, Value};

use crate::error::{ConfigError, JobError};
use crate::filter::ExclusionRules;
use crate::job::ComparisonJob;

/// Prefix marking a root directory key.
pub const ROOT_KEY_PREFIX: &str = "folder_";

/// Key holding the exclusion rules.
pub const IGNORE_KEY: &str = "ignore";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_NAME: &str = "foldercmp.toml";

/// A parsed job configuration document.
#[derive(Debug, Clone)]
pub struct JobFile {
    /// Where the document was loaded from.
    pub path: PathBuf,
    sections: IndexMap<String, Table>,
}

impl JobFile {
    /// Default candidate locations, in priority order.
    pub fn default_candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(".").join(LOCAL_CONFIG_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("foldercmp").join("config.toml"));
        }
        candidates
    }

    /// First candidate that exists.
    pub fn locate(candidates: &[PathBuf]) -> Result<PathBuf, ConfigError> {
        candidates
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| ConfigError::NotFound {
                candidates: candidates.to_vec(),
            })
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse a document. `path` is only used for error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let document: Table = text.parse().map_err(|err: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        })?;

        let mut sections = IndexMap::new();
        for (name, value) in document {
            match value {
                Value::Table(table) => {
                    sections.insert(name, table);
                }
                other => {
                    tracing::warn!(key = %name, kind = other.type_str(), "ignoring top-level value outside any section");
                }
            }
        }

        if sections.is_empty() {
            return Err(ConfigError::NoSections {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Build the job for one section, without touching the filesystem.
    pub fn job(&self, section: &str) -> Option<Result<ComparisonJob, JobError>> {
        self.sections
            .get(section)
            .map(|table| build_job(section, table))
    }

    /// Build one section's job and check that both roots exist.
    pub fn checked_job(&self, section: &str) -> Option<Result<ComparisonJob, JobError>> {
        self.job(section).map(|job| {
            let job = job?;
            job.ensure_roots_exist()?;
            Ok(job)
        })
    }

    /// Build every section's job in document order, checking that both roots
    /// exist. Each section succeeds or fails on its own.
    pub fn jobs(&self) -> impl Iterator<Item = Result<ComparisonJob, JobError>> {
        self.sections
            .keys()
            .filter_map(|name| self.checked_job(name))
    }
}

fn build_job(section: &str, table: &Table) -> Result<ComparisonJob, JobError> {
    let ignore = match table.get(IGNORE_KEY) {
        Some(value) => string_value(section, IGNORE_KEY, value)?,
        None => "",
    };
    let rules = ExclusionRules::compile(ignore).map_err(|source| JobError::Pattern {
        section: section.to_string(),
        source,
    })?;

    let roots: Vec<(&String, &Value)> = table
        .iter()
        .filter(|(key, _)| key.starts_with(ROOT_KEY_PREFIX))
        .collect();

    let [(key_a, value_a), (key_b, value_b)] = roots.as_slice() else {
        return Err(JobError::RootKeyCount {
            section: section.to_string(),
            found: roots.len(),
        });
    };

    let root_a = string_value(section, key_a, value_a)?;
    let root_b = string_value(section, key_b, value_b)?;

    Ok(ComparisonJob::new(section, root_a, root_b)
        .with_names(display_name(key_a), display_name(key_b))
        .with_rules(rules))
}

fn string_value<'a>(section: &str, key: &str, value: &'a Value) -> Result<&'a str, JobError> {
    value.as_str().ok_or_else(|| JobError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn display_name(key: &str) -> &str {
    key.strip_prefix(ROOT_KEY_PREFIX).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> JobFile {
        JobFile::parse(Path::new("test.toml"), text).unwrap()
    }

    #[test]
    fn test_parse_section() {
        let file = parse(
            r#"
            [docs]
            ignore = "tmp; \\.bak$"
            folder_Laptop = "/a"
            folder_NAS = "/b"
            "#,
        );

        let job = file.job("docs").unwrap().unwrap();
        assert_eq!(job.label, "docs");
        assert_eq!(job.name_a, "Laptop");
        assert_eq!(job.name_b, "NAS");
        assert_eq!(job.root_a, PathBuf::from("/a"));
        assert_eq!(job.root_b, PathBuf::from("/b"));
        assert_eq!(job.rules.len(), 2);
    }

    #[test]
    fn test_key_order_decides_sides() {
        let file = parse(
            r#"
            [s]
            folder_Zeta = "/z"
            folder_Alpha = "/a"
            "#,
        );

        let job = file.job("s").unwrap().unwrap();
        assert_eq!(job.name_a, "Zeta");
        assert_eq!(job.name_b, "Alpha");
    }

    #[test]
    fn test_wrong_root_count() {
        let file = parse(
            r#"
            [one]
            folder_A = "/a"

            [three]
            folder_A = "/a"
            folder_B = "/b"
            folder_C = "/c"
            "#,
        );

        assert!(matches!(
            file.job("one").unwrap(),
            Err(JobError::RootKeyCount { found: 1, .. })
        ));
        assert!(matches!(
            file.job("three").unwrap(),
            Err(JobError::RootKeyCount { found: 3, .. })
        ));
    }

    #[test]
    fn test_bad_pattern_rejects_section() {
        let file = parse(
            r#"
            [s]
            ignore = "(unclosed"
            folder_A = "/a"
            folder_B = "/b"
            "#,
        );

        let err = file.job("s").unwrap().unwrap_err();
        assert!(matches!(err, JobError::Pattern { .. }));
        assert_eq!(err.section(), "s");
    }

    #[test]
    fn test_non_string_value() {
        let file = parse(
            r#"
            [s]
            folder_A = 1
            folder_B = "/b"
            "#,
        );

        assert!(matches!(
            file.job("s").unwrap(),
            Err(JobError::InvalidValue { ref key, .. }) if key == "folder_A"
        ));
    }

    #[test]
    fn test_no_sections() {
        let err = JobFile::parse(Path::new("empty.toml"), "stray = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoSections { .. }));

        let err = JobFile::parse(Path::new("empty.toml"), "").unwrap_err();
        assert!(matches!(err, ConfigError::NoSections { .. }));
    }

    #[test]
    fn test_invalid_document() {
        let err = JobFile::parse(Path::new("bad.toml"), "[unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_locate_first_existing() {
        let temp = tempfile::TempDir::new().unwrap();
        let second = temp.path().join("second.toml");
        let third = temp.path().join("third.toml");
        std::fs::write(&second, "").unwrap();
        std::fs::write(&third, "").unwrap();

        let candidates = vec![temp.path().join("first.toml"), second.clone(), third];
        assert_eq!(JobFile::locate(&candidates).unwrap(), second);

        let err = JobFile::locate(&[temp.path().join("nope.toml")]).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
