//! Layered configuration: compiled-in defaults, then `.smart-index.toml` at
//! the workspace root, then `SMART_INDEXER_`-prefixed environment
//! variables. Only a value out of its documented bound is a hard
//! `IndexError::ConfigInvalid` at startup; a malformed or missing config
//! file degrades to defaults with a `tracing::warn!`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};

use crate::{IndexError, Result};

/// Default glob exclusions, matched against a file's path regardless of
/// workspace root.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/out/**",
    "**/build/**",
    "**/.git/**",
    "**/.angular/**",
    "**/.nx/**",
    "**/coverage/**",
    "**/*.min.js",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub cache_directory: String,
    pub enable_background_index: bool,
    pub max_concurrent_index_jobs: u32,
    pub exclude_patterns: Vec<String>,
    pub max_indexed_file_size: u64,
    pub enable_git_integration: bool,
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_directory: ".smart-index".to_string(),
            enable_background_index: true,
            max_concurrent_index_jobs: 4,
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_indexed_file_size: 1024 * 1024,
            enable_git_integration: true,
            debounce_ms: 600,
        }
    }
}

impl Config {
    /// Load layered configuration rooted at `workspace_root`. Never fails on
    /// a missing or malformed `.smart-index.toml` (falls back to defaults
    /// with a warning); fails with `IndexError::ConfigInvalid` only when a
    /// loaded value is out of its documented bound.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let config_path = workspace_root.join(".smart-index.toml");
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("SMART_INDEXER_"));

        let config: Config = match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to load {:?}, using defaults: {e}", config_path);
                Config::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.max_concurrent_index_jobs) {
            return Err(IndexError::ConfigInvalid(format!(
                "maxConcurrentIndexJobs must be in 1..=16, got {}",
                self.max_concurrent_index_jobs
            )));
        }
        if self.cache_directory.trim().is_empty() {
            return Err(IndexError::ConfigInvalid(
                "cacheDirectory must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute path to the cache root (`<workspaceRoot>/<cacheDirectory>`).
    pub fn cache_root(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.cache_directory)
    }

    /// Build the compiled exclusion matcher, hard-excluding the cache
    /// directory itself regardless of `exclude_patterns`.
    pub fn build_exclusion(&self, workspace_root: &Path) -> Exclusion {
        let mut builder = GitignoreBuilder::new(workspace_root);
        for pattern in &self.exclude_patterns {
            // Errors here (an unparsable glob) are a config authoring
            // mistake, not a runtime fault; log and skip the one pattern.
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!("ignoring invalid excludePattern {pattern:?}: {e}");
            }
        }
        let cache_pattern = format!("{}/**", self.cache_directory.trim_matches('/'));
        if let Err(e) = builder.add_line(None, &cache_pattern) {
            tracing::warn!("failed to compile cache-directory exclusion: {e}");
        }
        let matcher = builder.build().unwrap_or_else(|e| {
            tracing::error!("failed to build exclusion matcher: {e}, excluding nothing");
            GitignoreBuilder::new(workspace_root).build().unwrap()
        });
        Exclusion { matcher }
    }
}

/// Compiled exclusion matcher. Cheap to clone (an `Arc` internally via
/// `ignore::gitignore::Gitignore`) so it can be shared across worker tasks.
#[derive(Clone)]
pub struct Exclusion {
    matcher: Gitignore,
}

impl Exclusion {
    /// True if `path` matches any configured exclusion glob (including the
    /// hard-excluded cache directory). Directories are matched with
    /// `is_dir = true` so a trailing-slash-only pattern still excludes the
    /// directory itself, not just its contents.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.matcher.matched_path_or_any_parents(path, path.is_dir()).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = Config::default();
        assert_eq!(config.cache_directory, ".smart-index");
        assert!(config.enable_background_index);
        assert_eq!(config.max_concurrent_index_jobs, 4);
        assert_eq!(config.max_indexed_file_size, 1024 * 1024);
        assert!(config.enable_git_integration);
        assert_eq!(config.debounce_ms, 600);
        assert!(config.exclude_patterns.contains(&"**/node_modules/**".to_string()));
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.cache_directory, ".smart-index");
    }

    #[test]
    fn load_reads_toml_overrides() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".smart-index.toml"),
            "maxConcurrentIndexJobs = 8\ndebounceMs = 1200\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.max_concurrent_index_jobs, 8);
        assert_eq!(config.debounce_ms, 1200);
    }

    #[test]
    fn out_of_bound_concurrency_is_config_invalid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".smart-index.toml"), "maxConcurrentIndexJobs = 0\n")
            .unwrap();
        let result = Config::load(dir.path());
        assert!(matches!(result, Err(IndexError::ConfigInvalid(_))));
    }

    #[test]
    fn malformed_toml_degrades_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".smart-index.toml"), "not valid toml :::").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.max_concurrent_index_jobs, 4);
    }

    #[test]
    fn exclusion_matches_node_modules_by_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let exclusion = config.build_exclusion(dir.path());
        assert!(exclusion.is_excluded(&dir.path().join("node_modules/lodash/index.js")));
        assert!(!exclusion.is_excluded(&dir.path().join("src/index.ts")));
    }

    #[test]
    fn exclusion_always_covers_cache_directory() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.exclude_patterns.clear();
        let exclusion = config.build_exclusion(dir.path());
        assert!(exclusion.is_excluded(&dir.path().join(".smart-index/metadata.json")));
    }
}
