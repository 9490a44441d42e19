//! JWalk-based tree collector.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use jwalk::{Parallelism, WalkDir};
use tokio_util::sync::CancellationToken;

use foldercmp_core::{CompareConfig, CompareError, ExclusionRules, ScanWarning, TreeIndex, WarningKind};

/// Walks a root directory and records every non-excluded file by its
/// relative path.
#[derive(Debug, Clone)]
pub struct TreeCollector {
    follow_symlinks: bool,
    threads: usize,
    cancel: CancellationToken,
}

impl TreeCollector {
    /// Create a new collector.
    pub fn new() -> Self {
        Self {
            follow_symlinks: false,
            threads: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a collector using the walk settings of `config`.
    pub fn with_config(config: &CompareConfig) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            threads: config.threads,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort collection once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collect the files under `root`.
    ///
    /// Subdirectories whose relative path matches `rules` are pruned: they are
    /// never listed, so nothing beneath them is visited. Files whose relative
    /// path matches are left out of the index.
    pub fn collect(&self, root: &Path, rules: &ExclusionRules) -> Result<TreeIndex, CompareError> {
        let start = Instant::now();
        let root_path = root.canonicalize().map_err(|e| CompareError::io(root, e))?;

        if !root_path.is_dir() {
            return Err(CompareError::NotADirectory { path: root_path });
        }

        let mut index = TreeIndex::new(&root_path);
        let dirs_read = Arc::new(AtomicU64::new(0));
        let pruned_dirs = Arc::new(AtomicU64::new(0));

        // A private pool keeps the walk independent of hashing work queued on
        // the global rayon pool. Zero threads lets rayon pick the count.
        let parallelism = Parallelism::RayonNewPool(self.threads);

        let walker = {
            let root_path = root_path.clone();
            let rules = rules.clone();
            let dirs_read = Arc::clone(&dirs_read);
            let pruned_dirs = Arc::clone(&pruned_dirs);

            WalkDir::new(&root_path)
                .parallelism(parallelism)
                .skip_hidden(false)
                .follow_links(self.follow_symlinks)
                .process_read_dir(move |depth, dir_path, _state, children| {
                    // Called once with no depth for the root entry itself
                    if depth.is_none() {
                        return;
                    }
                    dirs_read.fetch_add(1, Ordering::Relaxed);

                    children.retain(|child| {
                        let Ok(entry) = child else {
                            return true;
                        };
                        if !entry.file_type().is_dir() {
                            return true;
                        }
                        let relative = relative_key(&root_path, &dir_path.join(entry.file_name()));
                        let shown = relative.to_string_lossy();
                        if rules.matches(&shown) {
                            tracing::debug!(dir = %shown, "pruning excluded directory");
                            pruned_dirs.fetch_add(1, Ordering::Relaxed);
                            return false;
                        }
                        true
                    });
                })
        };

        for entry_result in walker {
            if self.cancel.is_cancelled() {
                return Err(CompareError::Interrupted);
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let warning = match err.io_error() {
                        Some(io) => ScanWarning::from_io(path, io),
                        None => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
                    };
                    tracing::warn!(path = %warning.path.display(), "{}", warning.message);
                    index.warnings.push(warning);
                    continue;
                }
            };

            if entry.depth() == 0 {
                // Nothing under an unlistable root can be compared
                if let Some(err) = &entry.read_children_error {
                    let source = match err.io_error() {
                        Some(io) => std::io::Error::new(io.kind(), io.to_string()),
                        None => std::io::Error::other(err.to_string()),
                    };
                    return Err(CompareError::Io {
                        path: root_path,
                        source,
                    });
                }
                continue;
            }

            // A listed directory whose children could not be read
            if let Some(err) = &entry.read_children_error {
                let path = entry.path();
                let warning = match err.io_error() {
                    Some(io) => ScanWarning::from_io(&path, io),
                    None => ScanWarning::new(&path, err.to_string(), WarningKind::ReadError),
                };
                tracing::warn!(path = %path.display(), "{}", warning.message);
                index.warnings.push(warning);
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            let path = entry.path();
            if file_type.is_symlink() && points_to_dir(&path) {
                index.stats.skipped_symlinks += 1;
                continue;
            }

            let relative = relative_key(&root_path, &path);
            if rules.matches(&relative.to_string_lossy()) {
                index.stats.excluded_files += 1;
                continue;
            }

            if !index.insert(relative, path.clone()) {
                let warning = ScanWarning::new(&path, "path listed twice", WarningKind::ReadError);
                tracing::warn!(path = %path.display(), "{}", warning.message);
                index.warnings.push(warning);
            }
        }

        index.stats.dirs_read = dirs_read.load(Ordering::Relaxed);
        index.stats.pruned_dirs = pruned_dirs.load(Ordering::Relaxed);
        index.collect_duration = start.elapsed();

        tracing::debug!(
            root = %root_path.display(),
            files = index.stats.files,
            excluded = index.stats.excluded_files,
            pruned = index.stats.pruned_dirs,
            "collected tree"
        );

        Ok(index)
    }
}

impl Default for TreeCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Relative path of `path` under `root`, using the platform separator.
///
/// The raw name is kept; rules see a lossy rendering of it.
fn relative_key(root: &Path, path: &Path) -> OsString {
    path.strip_prefix(root)
        .unwrap_or(path)
        .as_os_str()
        .to_os_string()
}

/// Whether a symlink resolves to a directory. Broken links do not.
fn points_to_dir(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}
