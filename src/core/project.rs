//! Project discovery and structure
//!
//! A project is any directory holding a `.fdb/` folder. The folder keeps the
//! tool config (`config.yaml`) and the application settings (`settings.yaml`);
//! the flight database lives wherever the settings point, by default next to
//! `.fdb/` in the project root.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::settings::{Configuration, SettingsError};

/// Represents an fdb project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .fdb/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(".fdb").is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(".fdb").exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_skeleton(root)
    }

    /// Initialize even if .fdb/ exists, resetting config and settings
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_skeleton(root)
    }

    fn write_skeleton(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.fdb_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Configuration::default().save(&project.settings_path())?;

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# fdb project configuration
# Values here override ~/.config/fdb/config.yaml; FDB_* variables override both.

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Log level when RUST_LOG is unset (error, warn, info, debug, trace)
# log_level: warn

# How long to keep retrying a locked database, and how often
# lock_timeout_ms: 10000
# lock_retry_interval_ms: 50

# Rows per page when a flight search gives no --to-row
# page_size: 50
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .fdb configuration directory
    pub fn fdb_dir(&self) -> PathBuf {
        self.root.join(".fdb")
    }

    pub fn config_path(&self) -> PathBuf {
        self.fdb_dir().join("config.yaml")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.fdb_dir().join("settings.yaml")
    }

    /// Load the project's application settings
    pub fn settings(&self) -> Result<Configuration, ProjectError> {
        Ok(Configuration::load(&self.settings_path())?)
    }

    pub fn save_settings(&self, settings: &Configuration) -> Result<(), ProjectError> {
        Ok(settings.save(&self.settings_path())?)
    }

    /// Where the flight database lives for the given settings
    pub fn database_path(&self, settings: &Configuration) -> PathBuf {
        settings.database_path(&self.root)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    #[error("not an fdb project (searched from {searched_from:?})")]
    #[diagnostic(code(fdb::project::not_found), help("run 'fdb init' to create one"))]
    NotFound { searched_from: PathBuf },

    #[error("fdb project already exists at {0:?}")]
    #[diagnostic(code(fdb::project::exists), help("use 'fdb init --force' to reset it"))]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(fdb::project::io))]
    IoError(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Settings(#[from] SettingsError),
}
