//! Directory tree collection for foldercmp.
//!
//! This crate walks a root directory with jwalk and builds a [`TreeIndex`]
//! mapping each file's relative path to its resolved path.
//!
//! - **Pruning**: a subdirectory whose relative path matches an exclusion
//!   rule is dropped before it is listed, so its subtree is never visited
//! - **File exclusion**: files whose relative path matches are left out
//! - **Soft failures**: unreadable subdirectories become warnings on the
//!   index instead of errors; only an unlistable root fails the walk
//!
//! # Example
//!
//! ```rust,no_run
//! use foldercmp_scan::{ExclusionRules, TreeCollector};
//!
//! let rules = ExclusionRules::compile(r"\.git;node_modules").unwrap();
//! let index = TreeCollector::new()
//!     .collect(std::path::Path::new("/path/to/tree"), &rules)
//!     .unwrap();
//!
//! for (relative, resolved) in index.iter() {
//!     println!("{} -> {}", relative.to_string_lossy(), resolved.display());
//! }
//! ```

mod collector;

pub use collector::TreeCollector;

// Re-export core types for convenience
pub use foldercmp_core::{
    CollectStats, CompareError, ExclusionRules, ScanWarning, TreeIndex, WarningKind,
};
