//! Content hashing and tree comparison for foldercmp.
//!
//! - **Content hashing** - streaming MD5 or BLAKE3 digests in fixed-size chunks
//! - **Comparison** - classify every relative path of two trees as
//!   identical, differing, or present on one side only
//!
//! Metadata (size and modification time) is only gathered for files whose
//! digests differ.
//!
//! ```rust,no_run
//! use foldercmp_analyze::{ComparisonEngine, ComparisonJob, Outcome};
//!
//! let job = ComparisonJob::new("photos", "/mnt/laptop/photos", "/mnt/nas/photos")
//!     .with_names("Laptop", "NAS");
//!
//! let engine = ComparisonEngine::new();
//! for result in engine.compare(&job).unwrap() {
//!     if let Outcome::Differing { a, b } = &result.outcome {
//!         println!("{}: {} vs {}", result.path, a.digest, b.digest);
//!     }
//! }
//! ```

mod compare;
mod hasher;

pub use compare::{Comparison, ComparisonEngine};
pub use hasher::ContentHasher;

// Re-export core types
pub use foldercmp_core::{
    Classification, CompareConfig, CompareSummary, ComparisonJob, ComparisonResult, ContentHash,
    FileDetail, FileMetadata, HashAlgorithm, Outcome, Side,
};
