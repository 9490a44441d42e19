//! Collected tree index and statistics.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;

/// Summary statistics for a collected tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectStats {
    /// Files recorded in the index.
    pub files: u64,
    /// Files skipped because an exclusion rule matched.
    pub excluded_files: u64,
    /// Directories whose contents were listed (root included).
    pub dirs_read: u64,
    /// Directories skipped together with their whole subtree.
    pub pruned_dirs: u64,
    /// Directory symlinks that were not followed.
    pub skipped_symlinks: u64,
}

impl CollectStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Relative path to resolved path mapping for one root.
///
/// Keys are the raw relative paths with the platform separator, so names
/// that are not valid UTF-8 stay distinct. Iteration is in byte order of the
/// keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeIndex {
    /// Resolved root directory.
    pub root: PathBuf,

    /// Relative path to resolved path.
    entries: BTreeMap<OsString, PathBuf>,

    /// Collection statistics.
    pub stats: CollectStats,

    /// Duration of the walk.
    pub collect_duration: Duration,

    /// Warnings encountered during the walk.
    pub warnings: Vec<ScanWarning>,
}

impl TreeIndex {
    /// Create an empty index for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: BTreeMap::new(),
            stats: CollectStats::new(),
            collect_duration: Duration::ZERO,
            warnings: Vec::new(),
        }
    }

    /// Record a file. Returns false if the relative path was already present.
    pub fn insert(&mut self, relative: impl Into<OsString>, resolved: PathBuf) -> bool {
        let inserted = self.entries.insert(relative.into(), resolved).is_none();
        if inserted {
            self.stats.files += 1;
        }
        inserted
    }

    /// Look up the resolved path for a relative path.
    pub fn get(&self, relative: impl AsRef<OsStr>) -> Option<&Path> {
        self.entries.get(relative.as_ref()).map(PathBuf::as_path)
    }

    /// Check whether a relative path is present.
    pub fn contains(&self, relative: impl AsRef<OsStr>) -> bool {
        self.entries.contains_key(relative.as_ref())
    }

    /// Number of recorded files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no files were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in relative path order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_os_str(), v.as_path()))
    }

    /// Relative paths in order.
    pub fn relative_paths(&self) -> impl Iterator<Item = &OsStr> {
        self.entries.keys().map(OsString::as_os_str)
    }

    /// Check if there were any warnings during collection.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl IntoIterator for TreeIndex {
    type Item = (OsString, PathBuf);
    type IntoIter = std::collections::btree_map::IntoIter<OsString, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
