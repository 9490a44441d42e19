//! Streaming content digests.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use md5::{Digest, Md5};

use foldercmp_core::{CompareConfig, ContentHash, DEFAULT_CHUNK_SIZE, HashAlgorithm, ReadError};

/// Computes file digests by reading fixed-size chunks.
#[derive(Debug, Clone, Copy)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl ContentHasher {
    /// Create a hasher with the default algorithm and chunk size.
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create a hasher from a comparison config.
    pub fn with_config(config: &CompareConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Algorithm in use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Digest the file at `path`.
    pub fn digest(&self, path: &Path) -> Result<ContentHash, ReadError> {
        let to_error = |source| ReadError {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(to_error)?;
        self.digest_reader(file).map_err(to_error)
    }

    /// Digest everything `reader` yields, one chunk at a time.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> std::io::Result<ContentHash> {
        let mut state = StreamState::new(self.algorithm);
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            state.update(&buffer[..bytes_read]);
        }

        Ok(state.finalize())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Running hash accumulator for one algorithm.
enum StreamState {
    Md5(Md5),
    Blake3(Box<blake3::Hasher>),
}

impl StreamState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(Md5::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(hasher) => hasher.update(chunk),
            Self::Blake3(hasher) => {
                hasher.update(chunk);
            }
        }
    }

    fn finalize(self) -> ContentHash {
        match self {
            Self::Md5(hasher) => ContentHash::from_bytes(&hasher.finalize()),
            Self::Blake3(hasher) => ContentHash::from_bytes(hasher.finalize().as_bytes()),
        }
    }
}
