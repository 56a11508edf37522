//! Artifact fetching and payload location.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{ArtifactRegistry, RegistryError};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("No .{suffix} files in downloaded artifact path {}", .dir.display())]
    NoPayloadFound { dir: PathBuf, suffix: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads artifact bundles into a staging directory and locates the
/// serialized model inside them.
pub struct ArtifactFetcher {
    registry: Arc<dyn ArtifactRegistry>,
    staging_root: PathBuf,
    suffix: String,
}

impl ArtifactFetcher {
    /// `suffix` is the payload file extension, without the leading dot.
    pub fn new(registry: Arc<dyn ArtifactRegistry>, staging_root: PathBuf, suffix: &str) -> Self {
        Self {
            registry,
            staging_root,
            suffix: suffix.trim_start_matches('.').to_string(),
        }
    }

    /// Download `name` at `version` and return the path of its model file.
    ///
    /// Each reference stages into its own `<root>/<name>/<version>` directory.
    pub fn fetch(&self, name: &str, version: &str) -> Result<PathBuf, FetchError> {
        let dest = self.staging_root.join(name).join(version);
        std::fs::create_dir_all(&dest)?;

        let bundle = self.registry.download(name, version, &dest)?;
        let payload = find_payload(&bundle, name, &self.suffix)?;

        info!(model = name, version, payload = %payload.display(), "located model payload");
        Ok(payload)
    }
}

struct Candidate {
    path: PathBuf,
    size: u64,
}

/// Locate the model payload inside a downloaded bundle.
///
/// Scans recursively for `*.{suffix}` files. A file whose name starts with
/// `model_name` is preferred; otherwise the largest candidate wins. Ties
/// go to the first candidate in file-name order.
pub fn find_payload(bundle: &Path, model_name: &str, suffix: &str) -> Result<PathBuf, FetchError> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(bundle).sort_by_file_name() {
        let entry = entry.map_err(|e| FetchError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !has_suffix(entry.path(), suffix) {
            continue;
        }
        let size = entry.metadata().map_err(|e| FetchError::Io(e.into()))?.len();
        candidates.push(Candidate { path: entry.into_path(), size });
    }
    debug!(bundle = %bundle.display(), candidates = candidates.len(), "scanned artifact bundle");

    let named: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| {
            c.path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(model_name))
        })
        .collect();

    let pool: Vec<&Candidate> = if named.is_empty() { candidates.iter().collect() } else { named };

    largest(&pool)
        .map(|c| c.path.clone())
        .ok_or_else(|| FetchError::NoPayloadFound {
            dir: bundle.to_path_buf(),
            suffix: suffix.to_string(),
        })
}

/// Case-insensitive match on the full dotted suffix, so `pkl.gz` matches
/// `model.PKL.GZ`. A bare `.bin` with no stem does not count.
fn has_suffix(path: &Path, suffix: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let wanted = format!(".{}", suffix.trim_start_matches('.')).to_lowercase();
    let name = name.to_lowercase();
    name.len() > wanted.len() && name.ends_with(&wanted)
}

fn largest<'a>(pool: &[&'a Candidate]) -> Option<&'a Candidate> {
    let mut best: Option<&Candidate> = None;
    for &candidate in pool {
        if best.map_or(true, |b| candidate.size > b.size) {
            best = Some(candidate);
        }
    }
    best
}
