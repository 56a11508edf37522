//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables
//! without contacting a running server.

use crate::config::{self, ServiceConfig};

/// Print effective config as key-value pairs to stdout.
pub fn run_show() {
    print_config(&config::load());
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    print_config(&ServiceConfig::default());
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = collect_warnings(&config::load());
    for w in &warnings {
        eprintln!("WARNING: {}", w);
    }

    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

fn collect_warnings(cfg: &ServiceConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !cfg.registry_root.is_dir() {
        warnings.push(format!(
            "XG_SERVING_REGISTRY_ROOT ({}) is not a directory; every swap will fail",
            cfg.registry_root.display()
        ));
    }

    if cfg.staging_dir.is_file() {
        warnings.push(format!(
            "XG_SERVING_STAGING_DIR ({}) is a file; downloads cannot be staged",
            cfg.staging_dir.display()
        ));
    }

    if let Some(path) = &cfg.log.output_path {
        if path.is_dir() {
            warnings.push(format!("XG_SERVING_LOG_FILE ({}) is a directory", path.display()));
        }
    }

    warnings
}

fn print_config(cfg: &ServiceConfig) {
    for (key, value) in cfg.summary() {
        println!("{}={}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_registry_root_warns() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ServiceConfig {
            registry_root: dir.path().join("absent"),
            staging_dir: dir.path().join("staging"),
            ..ServiceConfig::default()
        };
        let warnings = collect_warnings(&cfg);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("XG_SERVING_REGISTRY_ROOT"));
    }

    #[test]
    fn test_existing_dirs_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = ServiceConfig {
            registry_root: dir.path().to_path_buf(),
            staging_dir: dir.path().join("staging"),
            ..ServiceConfig::default()
        };
        cfg.log.output_path = Some(dir.path().join("serving.log"));
        assert!(collect_warnings(&cfg).is_empty());
    }

    #[test]
    fn test_log_path_directory_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = ServiceConfig {
            registry_root: dir.path().to_path_buf(),
            staging_dir: dir.path().join("staging"),
            ..ServiceConfig::default()
        };
        cfg.log.output_path = Some(dir.path().to_path_buf());
        let warnings = collect_warnings(&cfg);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("XG_SERVING_LOG_FILE"));
    }

    #[test]
    fn test_print_config_smoke() {
        // Smoke-test: just call without panicking.
        print_config(&ServiceConfig::default());
    }
}
