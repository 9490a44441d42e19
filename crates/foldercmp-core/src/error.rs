//! Error and warning types for configuration, collection and hashing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that prevent a run from starting at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// None of the candidate configuration paths exist.
    #[error("No configuration file found (looked in: {})", display_paths(.candidates))]
    NotFound { candidates: Vec<PathBuf> },

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not a valid document.
    #[error("Failed to parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The configuration file has no sections.
    #[error("Configuration {path} has no sections")]
    NoSections { path: PathBuf },
}

/// An exclusion pattern that failed to compile.
#[derive(Debug, Error)]
#[error("Invalid exclusion pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Errors that cause a single configuration section to be skipped.
#[derive(Debug, Error)]
pub enum JobError {
    /// A section must name exactly two roots.
    #[error("Section '{section}' must have exactly two `folder_` keys, found {found}")]
    RootKeyCount { section: String, found: usize },

    /// A value that must be a string is something else.
    #[error("Section '{section}': value of `{key}` must be a string")]
    InvalidValue { section: String, key: String },

    /// The section's `ignore` rules do not compile.
    #[error("Section '{section}': {source}")]
    Pattern {
        section: String,
        #[source]
        source: PatternError,
    },

    /// A configured root does not exist.
    #[error("Section '{section}': directory {path} does not exist")]
    DirectoryNotFound { section: String, path: PathBuf },
}

impl JobError {
    /// Name of the section this error belongs to.
    pub fn section(&self) -> &str {
        match self {
            Self::RootKeyCount { section, .. }
            | Self::InvalidValue { section, .. }
            | Self::Pattern { section, .. }
            | Self::DirectoryNotFound { section, .. } => section,
        }
    }
}

/// Errors that abort a single comparison job.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Root directory does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Root path exists but is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation was cancelled.
    #[error("Comparison interrupted")]
    Interrupted,
}

impl CompareError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::DirectoryNotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// A file could not be read while computing its digest.
#[derive(Debug, Error)]
#[error("Failed to read {path}: {source}")]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Kind of collection warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory or entry.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// Non-fatal warning encountered while collecting a tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from an I/O error, classifying permission problems.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            _ => WarningKind::ReadError,
        };
        Self {
            message: format!("{error}"),
            path,
            kind,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
