//! Run configuration.
//!
//! Input and output directories are explicit values handed to each run.
//! Resolution order: CLI flag, then environment (`.env` is loaded first),
//! then the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable for the raw input directory.
pub const RAW_DIR_ENV: &str = "STATCLEAN_RAW_DIR";

/// Environment variable for the processed output directory.
pub const PROCESSED_DIR_ENV: &str = "STATCLEAN_PROCESSED_DIR";

const DEFAULT_RAW_DIR: &str = "data/raw";
const DEFAULT_PROCESSED_DIR: &str = "data/processed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
        }
    }
}

impl RunConfig {
    /// Resolve from explicit overrides and the process environment.
    pub fn resolve(raw_dir: Option<&Path>, processed_dir: Option<&Path>) -> Self {
        dotenvy::dotenv().ok();
        Self::resolve_with(raw_dir, processed_dir, |key| std::env::var(key).ok())
    }

    /// Resolve with a custom environment lookup.
    pub fn resolve_with(
        raw_dir: Option<&Path>,
        processed_dir: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |flag: Option<&Path>, key: &str, default: &str| {
            flag.map(Path::to_path_buf)
                .or_else(|| env(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            raw_dir: pick(raw_dir, RAW_DIR_ENV, DEFAULT_RAW_DIR),
            processed_dir: pick(processed_dir, PROCESSED_DIR_ENV, DEFAULT_PROCESSED_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RunConfig::resolve_with(None, None, |_| None);
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_env_overrides_default() {
        let env: HashMap<&str, &str> = [(RAW_DIR_ENV, "/srv/raw"), (PROCESSED_DIR_ENV, "")].into();
        let config = RunConfig::resolve_with(None, None, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.raw_dir, PathBuf::from("/srv/raw"));
        // Blank values fall back to the default
        assert_eq!(config.processed_dir, PathBuf::from("data/processed"));
    }

    #[test]
    fn test_flag_overrides_env() {
        let config =
            RunConfig::resolve_with(Some(Path::new("in")), None, |_| Some("env".to_string()));
        assert_eq!(config.raw_dir, PathBuf::from("in"));
        assert_eq!(config.processed_dir, PathBuf::from("env"));
    }
}
