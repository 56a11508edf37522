//! Model payload loading.

use memmap2::Mmap;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::engine::{Classifier, LogisticRegression};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns payload bytes into a classifier.
pub trait ModelLoader: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn Classifier>, LoadError>;
}

/// Decodes `postcard`-encoded [`LogisticRegression`] payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostcardModelLoader;

impl PostcardModelLoader {
    /// Encode a model in the format [`decode`](ModelLoader::decode) accepts.
    pub fn encode(model: &LogisticRegression) -> Result<Vec<u8>, LoadError> {
        postcard::to_allocvec(model).map_err(|e| LoadError::InvalidFormat(e.to_string()))
    }
}

impl ModelLoader for PostcardModelLoader {
    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn Classifier>, LoadError> {
        let model: LogisticRegression =
            postcard::from_bytes(bytes).map_err(|e| LoadError::InvalidFormat(e.to_string()))?;
        model.validate().map_err(LoadError::InvalidFormat)?;
        Ok(Arc::new(model))
    }
}

/// A decoded payload plus what we learned about the file.
#[derive(Debug)]
pub struct LoadedPayload {
    pub classifier: Arc<dyn Classifier>,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Map `path`, digest it, and decode it with `loader`.
pub fn load_payload(loader: &dyn ModelLoader, path: &Path) -> Result<LoadedPayload, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let mapped = MappedPayload::open(path)?;
    let bytes = mapped.as_bytes();

    let sha256 = hex::encode(Sha256::digest(bytes));
    let classifier = loader.decode(bytes)?;

    Ok(LoadedPayload { classifier, sha256, size_bytes: bytes.len() as u64 })
}

/// Memory-mapped payload for zero-copy decoding.
struct MappedPayload {
    mmap: Option<Mmap>,
}

impl MappedPayload {
    fn open(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        // Zero-length files cannot be mapped on every platform.
        if file.metadata()?.len() == 0 {
            return Ok(Self { mmap: None });
        }
        // SAFETY: opened read-only; staging files are only rewritten while the
        // swap lock is held, and the mapping is dropped before that lock is released.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap: Some(mmap) })
    }

    fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}
