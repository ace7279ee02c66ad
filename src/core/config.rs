//! Tool configuration with layered hierarchy
//!
//! This is the configuration of the `fdb` tool itself (output format, logging,
//! database lock handling). The application settings graph lives in
//! [`crate::core::settings`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::db::LockRetry;
use crate::core::Project;

/// Rows shown by a flight search that gives no explicit row range
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// fdb configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format
    pub default_format: Option<String>,

    /// Log level used when RUST_LOG is unset
    pub log_level: Option<String>,

    /// How long a locked database is retried before giving up
    pub lock_timeout_ms: Option<u64>,

    /// Pause between retries of a locked database
    pub lock_retry_interval_ms: Option<u64>,

    /// Default page size for flight searches
    pub page_size: Option<i64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// `start` is where project discovery begins; `None` means the current
    /// directory.
    pub fn load(start: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/fdb/config.yaml)
        if let Some(global) = Self::global_config_path().and_then(|p| Self::read_file(&p)) {
            config.merge(global);
        }

        // 3. Project config (.fdb/config.yaml)
        let project = match start {
            Some(dir) => Project::discover_from(dir),
            None => Project::discover(),
        };
        if let Some(project_config) = project.ok().and_then(|p| Self::read_file(&p.config_path())) {
            config.merge(project_config);
        }

        // 4. Environment variables
        config.merge(Self::from_env(|key| std::env::var(key).ok()));

        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "fdb")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Parse a config file; unreadable or malformed files are skipped
    fn read_file(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&contents).ok()
    }

    fn from_env(var: impl Fn(&str) -> Option<String>) -> Config {
        Config {
            default_format: var("FDB_FORMAT"),
            log_level: var("FDB_LOG_LEVEL"),
            lock_timeout_ms: var("FDB_LOCK_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()),
            lock_retry_interval_ms: var("FDB_LOCK_RETRY_INTERVAL_MS")
                .and_then(|v| v.trim().parse().ok()),
            page_size: var("FDB_PAGE_SIZE").and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.lock_timeout_ms.is_some() {
            self.lock_timeout_ms = other.lock_timeout_ms;
        }
        if other.lock_retry_interval_ms.is_some() {
            self.lock_retry_interval_ms = other.lock_retry_interval_ms;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
    }

    /// Log level, `warn` when unset
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }

    /// Lock-retry policy for opening the flight database
    pub fn lock_retry(&self) -> LockRetry {
        let defaults = LockRetry::default();
        let timeout = self
            .lock_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        let interval = self
            .lock_retry_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);
        LockRetry::new(timeout).with_interval(interval)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.lock_retry(), LockRetry::default());
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            default_format: Some("tsv".into()),
            page_size: Some(10),
            ..Config::default()
        };
        base.merge(Config {
            default_format: Some("json".into()),
            ..Config::default()
        });
        assert_eq!(base.default_format.as_deref(), Some("json"));
        assert_eq!(base.page_size, Some(10));
    }

    #[test]
    fn test_env_values_are_parsed() {
        let vars: HashMap<&str, &str> = [
            ("FDB_LOCK_TIMEOUT_MS", "250"),
            ("FDB_PAGE_SIZE", "not a number"),
            ("FDB_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.lock_timeout_ms, Some(250));
        assert_eq!(config.page_size, None);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.lock_retry().timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_project_config_is_read() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            project.config_path(),
            "page_size: 5\nlock_retry_interval_ms: 10\n",
        )
        .unwrap();

        let config = Config::load(Some(tmp.path()));
        assert_eq!(config.page_size(), 5);
        assert_eq!(config.lock_retry().interval, Duration::from_millis(10));
    }

    #[test]
    fn test_non_positive_page_size_falls_back() {
        let config = Config {
            page_size: Some(0),
            ..Config::default()
        };
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
    }
}
