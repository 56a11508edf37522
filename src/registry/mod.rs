//! Artifact registry access: version resolution and bundle fetching.
//!
//! The registry itself sits behind [`ArtifactRegistry`] so the swap path can
//! run against a filesystem registry in production and a scripted one in
//! tests.

mod fetcher;
mod local;
mod resolver;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use fetcher::{find_payload, ArtifactFetcher, FetchError};
pub use local::LocalRegistry;
pub use resolver::resolve_latest;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No collection found for model '{0}'")]
    CollectionNotFound(String),

    #[error("No versions found for model '{0}'")]
    NoVersions(String),

    #[error("Version '{version}' not found for model '{name}'")]
    VersionNotFound { name: String, version: String },

    #[error("Registry transport error: {0}")]
    Transport(String),
}

impl RegistryError {
    /// True when the registry answered but had nothing matching.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(e: std::io::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// One published version of an artifact collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactVersion {
    /// Numeric version index; `v10` has index 10.
    pub index: u64,
    /// Identifier passed back to [`ArtifactRegistry::download`].
    pub identifier: String,
}

impl ArtifactVersion {
    pub fn new(index: u64) -> Self {
        Self { index, identifier: format!("v{}", index) }
    }

    /// Parse a `v<digits>` identifier.
    pub fn parse(identifier: &str) -> Option<Self> {
        let digits = identifier.strip_prefix('v')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = digits.parse().ok()?;
        Some(Self { index, identifier: identifier.to_string() })
    }
}

/// Remote store of versioned model artifacts.
///
/// Calls are blocking; callers run them off the async executor.
pub trait ArtifactRegistry: Send + Sync {
    /// All versions of the collection `name`, or `None` if no such
    /// collection exists.
    fn list_versions(&self, name: &str) -> Result<Option<Vec<ArtifactVersion>>, RegistryError>;

    /// Download version `identifier` of `name` into `dest`, returning the
    /// directory holding the bundle.
    fn download(&self, name: &str, identifier: &str, dest: &Path) -> Result<PathBuf, RegistryError>;
}
