//! Three-way comparison of two collected trees.
//!
//! Both roots are collected, their relative paths are merged in sorted order
//! and each path is classified:
//!
//! 1. Present on one side only: `OnlyInA` / `OnlyInB` (no I/O)
//! 2. Present on both: both files are hashed concurrently; equal digests give
//!    `Identical`, otherwise `Differing` with size and mtime of each side
//! 3. A side that cannot be read gives `HashError` for that path only
//!
//! Paths are processed in batches on a rayon pool. Batches are collected in
//! order, so the emitted sequence stays sorted by relative path.

use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use itertools::{EitherOrBoth, Itertools};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use foldercmp_core::{
    CollectStats, CompareConfig, CompareError, CompareSummary, ComparisonJob, ComparisonResult,
    FileDetail, FileMetadata, Outcome, ScanWarning, Side,
};
use foldercmp_scan::TreeCollector;

use crate::hasher::ContentHasher;

/// Compares the two trees of a [`ComparisonJob`].
pub struct ComparisonEngine {
    config: CompareConfig,
    collector: TreeCollector,
    hasher: ContentHasher,
    pool: Option<Arc<rayon::ThreadPool>>,
    cancel: CancellationToken,
}

impl ComparisonEngine {
    /// Create an engine with default config.
    pub fn new() -> Self {
        Self::with_config(CompareConfig::default())
    }

    /// Create an engine with custom config.
    pub fn with_config(config: CompareConfig) -> Self {
        let pool = match config.threads {
            0 => None,
            n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => Some(Arc::new(pool)),
                Err(err) => {
                    tracing::warn!(threads = n, error = %err, "falling back to the global thread pool");
                    None
                }
            },
        };

        Self {
            collector: TreeCollector::with_config(&config),
            hasher: ContentHasher::with_config(&config),
            config,
            pool,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop issuing new work once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.collector = self.collector.with_cancellation(cancel.clone());
        self.cancel = cancel;
        self
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Collect both trees of `job` and return the lazy result sequence.
    ///
    /// Tree collection happens here, so a missing root surfaces as an error
    /// before any result is produced. Hashing happens while iterating.
    pub fn compare(&self, job: &ComparisonJob) -> Result<Comparison<'_>, CompareError> {
        tracing::info!(job = %job.label, a = %job.root_a.display(), b = %job.root_b.display(), "starting comparison");

        let (tree_a, tree_b) = std::thread::scope(|scope| {
            let handle_a = scope.spawn(|| self.collector.collect(&job.root_a, &job.rules));
            let tree_b = self.collector.collect(&job.root_b, &job.rules);
            let tree_a = handle_a
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (tree_a, tree_b)
        });
        let (tree_a, tree_b) = (tree_a?, tree_b?);

        let stats_a = tree_a.stats.clone();
        let stats_b = tree_b.stats.clone();
        let mut warnings = tree_a.warnings.clone();
        warnings.extend(tree_b.warnings.iter().cloned());

        let pending: Vec<PendingPath> = tree_a
            .into_iter()
            .merge_join_by(tree_b, |(a, _), (b, _)| a.cmp(b))
            .map(|pair| match pair {
                EitherOrBoth::Both((path, a), (_, b)) => PendingPath::Both { path, a, b },
                EitherOrBoth::Left((path, a)) => PendingPath::OnlyA { path, a },
                EitherOrBoth::Right((path, b)) => PendingPath::OnlyB { path, b },
            })
            .collect();

        tracing::debug!(job = %job.label, paths = pending.len(), "merged relative paths");

        Ok(Comparison {
            engine: self,
            pending: pending.into_iter(),
            ready: VecDeque::new(),
            summary: CompareSummary::default(),
            stats_a,
            stats_b,
            warnings,
            cancelled: false,
            label: job.label.clone(),
            finished: false,
        })
    }

    /// Classify one path.
    fn resolve(&self, pending: PendingPath) -> ComparisonResult {
        match pending {
            PendingPath::OnlyA { path, a } => {
                ComparisonResult::new(display_path(&path), Outcome::OnlyInA { resolved: a })
            }
            PendingPath::OnlyB { path, b } => {
                ComparisonResult::new(display_path(&path), Outcome::OnlyInB { resolved: b })
            }
            PendingPath::Both { path, a, b } => {
                let outcome = self.compare_files(&a, &b);
                ComparisonResult::new(display_path(&path), outcome)
            }
        }
    }

    fn compare_files(&self, a: &Path, b: &Path) -> Outcome {
        let (digest_a, digest_b) = rayon::join(|| self.hasher.digest(a), || self.hasher.digest(b));

        let (digest_a, digest_b) = match (digest_a, digest_b) {
            (Ok(da), Ok(db)) => (da, db),
            (Err(err), _) => return hash_error(Side::A, err),
            (_, Err(err)) => return hash_error(Side::B, err),
        };

        if digest_a == digest_b {
            return Outcome::Identical;
        }

        Outcome::Differing {
            a: FileDetail {
                resolved: a.to_path_buf(),
                digest: digest_a,
                metadata: FileMetadata::read(a),
            },
            b: FileDetail {
                resolved: b.to_path_buf(),
                digest: digest_b,
                metadata: FileMetadata::read(b),
            },
        }
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Printable form of a relative path. Undecodable bytes become U+FFFD; the
/// join between both trees already happened on the raw path.
fn display_path(path: &OsStr) -> CompactString {
    CompactString::new(path.to_string_lossy())
}

fn hash_error(side: Side, err: foldercmp_core::ReadError) -> Outcome {
    tracing::warn!(path = %err.path.display(), error = %err.source, "failed to hash file");
    Outcome::HashError {
        side,
        resolved: err.path,
        cause: err.source.to_string(),
    }
}

/// A relative path awaiting classification.
enum PendingPath {
    Both { path: OsString, a: PathBuf, b: PathBuf },
    OnlyA { path: OsString, a: PathBuf },
    OnlyB { path: OsString, b: PathBuf },
}

/// Lazy, sorted sequence of results for one job.
///
/// Not restartable: comparing again rebuilds both trees.
pub struct Comparison<'a> {
    engine: &'a ComparisonEngine,
    pending: std::vec::IntoIter<PendingPath>,
    ready: VecDeque<ComparisonResult>,
    summary: CompareSummary,
    stats_a: CollectStats,
    stats_b: CollectStats,
    warnings: Vec<ScanWarning>,
    cancelled: bool,
    label: String,
    finished: bool,
}

impl Comparison<'_> {
    /// Counts of the results emitted so far.
    pub fn summary(&self) -> &CompareSummary {
        &self.summary
    }

    /// Collection statistics of tree A.
    pub fn stats_a(&self) -> &CollectStats {
        &self.stats_a
    }

    /// Collection statistics of tree B.
    pub fn stats_b(&self) -> &CollectStats {
        &self.stats_b
    }

    /// Warnings from collecting both trees.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Paths not yet classified.
    pub fn remaining(&self) -> usize {
        self.pending.len() + self.ready.len()
    }

    /// Whether the sequence ended early because of cancellation.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    fn fill(&mut self) {
        if self.pending.len() == 0 {
            return;
        }
        if self.engine.cancel.is_cancelled() {
            tracing::info!(skipped = self.pending.len(), "comparison cancelled");
            self.cancelled = true;
            self.pending = Vec::new().into_iter();
            return;
        }

        let batch: Vec<PendingPath> = self
            .pending
            .by_ref()
            .take(self.engine.config.batch_size.max(1))
            .collect();

        let engine = self.engine;
        let results: Vec<ComparisonResult> =
            engine.install(|| batch.into_par_iter().map(|p| engine.resolve(p)).collect());

        self.ready.extend(results);
    }
}

impl Iterator for Comparison<'_> {
    type Item = ComparisonResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ready.is_empty() {
            self.fill();
        }
        let Some(result) = self.ready.pop_front() else {
            if !self.finished {
                self.finished = true;
                tracing::info!(
                    job = %self.label,
                    identical = self.summary.identical,
                    differing = self.summary.differing,
                    only_in_a = self.summary.only_in_a,
                    only_in_b = self.summary.only_in_b,
                    hash_errors = self.summary.hash_errors,
                    "comparison finished"
                );
            }
            return None;
        };
        self.summary.record(result.classification());
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let ready = self.ready.len();
        (ready, Some(ready + self.pending.len()))
    }
}
