//! Latest-version resolution.

use tracing::debug;

use super::{ArtifactRegistry, RegistryError};

/// Identifier of the newest version of `name`.
///
/// Versions are compared by numeric index, so `v10` beats `v9`.
pub fn resolve_latest(registry: &dyn ArtifactRegistry, name: &str) -> Result<String, RegistryError> {
    let versions = registry
        .list_versions(name)?
        .ok_or_else(|| RegistryError::CollectionNotFound(name.to_string()))?;

    let latest = versions
        .into_iter()
        .max_by_key(|v| v.index)
        .ok_or_else(|| RegistryError::NoVersions(name.to_string()))?;

    debug!(model = name, version = %latest.identifier, "resolved latest version");
    Ok(latest.identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ArtifactVersion;
    use std::path::{Path, PathBuf};

    struct Listing(Option<Vec<ArtifactVersion>>);

    impl ArtifactRegistry for Listing {
        fn list_versions(&self, _name: &str) -> Result<Option<Vec<ArtifactVersion>>, RegistryError> {
            Ok(self.0.clone())
        }

        fn download(&self, _: &str, _: &str, dest: &Path) -> Result<PathBuf, RegistryError> {
            Ok(dest.to_path_buf())
        }
    }

    #[test]
    fn test_numeric_not_lexical_order() {
        let registry = Listing(Some(vec![
            ArtifactVersion::new(9),
            ArtifactVersion::new(10),
            ArtifactVersion::new(2),
        ]));
        assert_eq!(resolve_latest(&registry, "logreg_angle").unwrap(), "v10");
    }

    #[test]
    fn test_missing_collection() {
        let err = resolve_latest(&Listing(None), "logreg_angle").unwrap_err();
        assert!(matches!(err, RegistryError::CollectionNotFound(_)));
    }

    #[test]
    fn test_empty_collection() {
        let err = resolve_latest(&Listing(Some(vec![])), "logreg_angle").unwrap_err();
        assert!(matches!(err, RegistryError::NoVersions(_)));
    }
}
