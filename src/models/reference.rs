//! Model references as requested by callers.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("model and version fields are required")]
    Missing,

    #[error("invalid {field} '{value}': use letters, digits, '.', '_' or '-'")]
    InvalidChars { field: &'static str, value: String },
}

/// Requested version of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    /// Newest version in the registry, resolved at swap time.
    Latest,
    /// A registry identifier such as `v3`, used verbatim.
    Exact(String),
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Exact(v) => write!(f, "{}", v),
        }
    }
}

/// Immutable `name:version` reference to a registry artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelReference {
    name: String,
    version: VersionSpec,
}

impl ModelReference {
    /// Build a reference; `version` of `"latest"` (any case) resolves at swap time.
    ///
    /// Both parts end up in staging paths, so only path-safe names are accepted.
    pub fn new(name: &str, version: &str) -> Result<Self, ReferenceError> {
        let name = name.trim();
        let version = version.trim();
        if name.is_empty() || version.is_empty() {
            return Err(ReferenceError::Missing);
        }
        check_segment("model", name)?;

        let version = if version.eq_ignore_ascii_case("latest") {
            VersionSpec::Latest
        } else {
            check_segment("version", version)?;
            VersionSpec::Exact(version.to_string())
        };

        Ok(Self { name: name.to_string(), version })
    }

    pub fn latest(name: &str) -> Result<Self, ReferenceError> {
        Self::new(name, "latest")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &VersionSpec {
        &self.version
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

fn check_segment(field: &'static str, value: &str) -> Result<(), ReferenceError> {
    let valid = !value.starts_with('.')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ReferenceError::InvalidChars { field, value: value.to_string() })
    }
}
