//! Comparison engine configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default read chunk for streaming digests.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default number of paths hashed per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Digest algorithm used to decide content identity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5, 128-bit.
    #[default]
    Md5,
    /// BLAKE3, 256-bit.
    Blake3,
}

impl HashAlgorithm {
    /// Length of the hex-encoded digest.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Blake3 => 64,
        }
    }
}

/// Configuration for comparison runs.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CompareConfig {
    /// Digest algorithm.
    #[builder(default)]
    #[serde(default)]
    pub algorithm: HashAlgorithm,

    /// Bytes read per chunk while hashing.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Number of hashing threads (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Paths hashed per parallel batch.
    #[builder(default = "DEFAULT_BATCH_SIZE")]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Descend into symlinked directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl CompareConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == Some(0) {
            return Err("Chunk size must be greater than zero".to_string());
        }
        if self.batch_size == Some(0) {
            return Err("Batch size must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl CompareConfig {
    /// Create a new config builder.
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder::default()
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            follow_symlinks: false,
        }
    }
}
