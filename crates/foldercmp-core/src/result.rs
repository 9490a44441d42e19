//! Comparison result types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, Timelike};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Format used when rendering modification times.
pub const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lowercase hex digest of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Encode raw digest bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size and modification time of a file.
///
/// Both fields are `None` when the file could not be stat'ed. A platform
/// without modification times leaves only `modified` empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Size in bytes.
    pub size: Option<u64>,
    /// Last modification time, truncated to whole seconds.
    pub modified: Option<DateTime<Local>>,
}

impl FileMetadata {
    /// Stat `path`, degrading to empty metadata on failure.
    pub fn read(path: &Path) -> Self {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "metadata unavailable");
                return Self::default();
            }
        };

        Self::from_parts(path, metadata.len(), metadata.modified())
    }

    /// Combine a known size with a modification time that may be missing.
    fn from_parts(path: &Path, size: u64, modified: std::io::Result<SystemTime>) -> Self {
        let modified = match modified {
            Ok(time) => Some(truncate_to_seconds(DateTime::<Local>::from(time))),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "modification time unavailable");
                None
            }
        };

        Self {
            size: Some(size),
            modified,
        }
    }

    /// Check whether the stat call failed.
    pub fn is_unknown(&self) -> bool {
        self.size.is_none() && self.modified.is_none()
    }

    /// Modification time as `YYYY-MM-DD HH:MM:SS`.
    pub fn modified_display(&self) -> Option<String> {
        self.modified.map(|m| m.format(MODIFIED_FORMAT).to_string())
    }
}

fn truncate_to_seconds(time: DateTime<Local>) -> DateTime<Local> {
    time.with_nanosecond(0).unwrap_or(time)
}

/// Which of the two compared trees a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// Classification tag of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Classification {
    Identical,
    Differing,
    OnlyInA,
    OnlyInB,
    HashError,
}

/// Everything known about one side of a differing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetail {
    /// Resolved path inside the tree's root.
    pub resolved: PathBuf,
    /// Content digest.
    pub digest: ContentHash,
    /// Size and modification time.
    pub metadata: FileMetadata,
}

/// Outcome for one relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "classification")]
pub enum Outcome {
    /// Same content on both sides.
    Identical,
    /// Content differs.
    Differing { a: FileDetail, b: FileDetail },
    /// Present only in tree A.
    OnlyInA { resolved: PathBuf },
    /// Present only in tree B.
    OnlyInB { resolved: PathBuf },
    /// One side could not be hashed.
    HashError {
        side: Side,
        resolved: PathBuf,
        cause: String,
    },
}

/// Result for one relative path in the union of both trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Relative path, the join key between both trees.
    pub path: CompactString,
    /// Classification and its payload.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ComparisonResult {
    /// Create a new result.
    pub fn new(path: impl Into<CompactString>, outcome: Outcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }

    /// Get the classification tag.
    pub fn classification(&self) -> Classification {
        match self.outcome {
            Outcome::Identical => Classification::Identical,
            Outcome::Differing { .. } => Classification::Differing,
            Outcome::OnlyInA { .. } => Classification::OnlyInA,
            Outcome::OnlyInB { .. } => Classification::OnlyInB,
            Outcome::HashError { .. } => Classification::HashError,
        }
    }
}

/// Running counts per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareSummary {
    pub identical: u64,
    pub differing: u64,
    pub only_in_a: u64,
    pub only_in_b: u64,
    pub hash_errors: u64,
}

impl CompareSummary {
    /// Count one more result.
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Identical => self.identical += 1,
            Classification::Differing => self.differing += 1,
            Classification::OnlyInA => self.only_in_a += 1,
            Classification::OnlyInB => self.only_in_b += 1,
            Classification::HashError => self.hash_errors += 1,
        }
    }

    /// Total number of results.
    pub fn total(&self) -> u64 {
        self.identical + self.differing + self.only_in_a + self.only_in_b + self.hash_errors
    }

    /// Check whether both trees matched exactly.
    pub fn is_clean(&self) -> bool {
        self.total() == self.identical
    }
}
