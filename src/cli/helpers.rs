//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use clap::ValueEnum;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Configuration, FlightDatabase, Project};

/// Find the project, honoring `--project`
pub fn discover_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(root) => Project::discover_from(root)?,
        None => Project::discover()?,
    };
    Ok(project)
}

/// Load the layered tool config for the active project
pub fn load_config(global: &GlobalOpts) -> Config {
    Config::load(global.project.as_deref())
}

/// The `--format` flag, falling back to the configured default
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|name| OutputFormat::from_str(name, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Open the project's flight database with the configured lock policy
pub fn open_database(
    project: &Project,
    settings: &Configuration,
    config: &Config,
) -> Result<FlightDatabase> {
    let path = project.database_path(settings);
    Ok(FlightDatabase::open(&path, config.lock_retry())?)
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: false,
            project: None,
        }
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Zürich Flughafen", 9), "Zürich...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_effective_format() {
        let config = Config {
            default_format: Some("JSON".into()),
            ..Config::default()
        };
        assert_eq!(effective_format(&global(OutputFormat::Auto), &config), OutputFormat::Json);
        assert_eq!(effective_format(&global(OutputFormat::Csv), &config), OutputFormat::Csv);

        let config = Config {
            default_format: Some("nonsense".into()),
            ..Config::default()
        };
        assert_eq!(effective_format(&global(OutputFormat::Auto), &config), OutputFormat::Auto);
    }
}
