//! Core types for foldercmp.
//!
//! This crate provides the data structures shared by the collector, the
//! comparison engine and the command line front end: exclusion rules, tree
//! indexes, comparison results, job configuration and error types.

mod config;
mod error;
mod filter;
mod job;
mod jobfile;
mod result;
mod tree;

pub use config::{
    CompareConfig, CompareConfigBuilder, DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_SIZE, HashAlgorithm,
};
pub use error::{CompareError, ConfigError, JobError, PatternError, ReadError, ScanWarning, WarningKind};
pub use filter::{ExclusionRules, RULE_DELIMITER};
pub use job::ComparisonJob;
pub use jobfile::{IGNORE_KEY, JobFile, LOCAL_CONFIG_NAME, ROOT_KEY_PREFIX};
pub use result::{
    Classification, CompareSummary, ComparisonResult, ContentHash, FileDetail, FileMetadata,
    MODIFIED_FORMAT, Outcome, Side,
};
pub use tree::{CollectStats, TreeIndex};
