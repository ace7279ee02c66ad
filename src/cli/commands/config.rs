//! `fdb config` command - Tool configuration management
//!
//! Provides commands to view and modify the fdb tool configuration. The
//! application settings graph is edited with `fdb settings` instead.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_yml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{discover_project, load_config};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Show only project-level config
    #[arg(long = "project-only", conflicts_with = "global_only")]
    pub project_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., page_size, log_level)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only project config path
    #[arg(long = "project-only", conflicts_with = "global_only")]
    pub project_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    (
        "default_format",
        "Default output format (yaml, json, tsv, csv, md, id)",
    ),
    ("log_level", "Log level when RUST_LOG is unset (default: warn)"),
    (
        "lock_timeout_ms",
        "How long a locked database is retried (default: 10000)",
    ),
    (
        "lock_retry_interval_ms",
        "Pause between lock retries (default: 50)",
    ),
    ("page_size", "Rows per flight search page (default: 50)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path(args) => run_path(args, global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        check_key(key)?;
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    if args.project_only {
        show_config_file("Project config:", &project_config_path(global)?)?;
    } else if args.global_only {
        show_config_file("Global config:", &global_config_path()?)?;
    } else {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();

        for (key, _) in VALID_KEYS {
            print_config_value(key, get_config_value(&config, key).as_deref());
        }

        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Environment variables (FDB_FORMAT, FDB_LOG_LEVEL, FDB_LOCK_TIMEOUT_MS,");
        println!("     FDB_LOCK_RETRY_INTERVAL_MS, FDB_PAGE_SIZE)");
        println!("  2. Project config (.fdb/config.yaml)");
        println!("  3. Global config (~/.config/fdb/config.yaml)");
    }

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let config_path = if args.global {
        global_config_path()?
    } else {
        project_config_path(global)?
    };

    let mut config_map = read_mapping(&config_path)?;
    config_map.insert(Value::String(args.key.clone()), parse_scalar(&args.value));

    // The file must still deserialize, so "page_size: lots" is refused
    serde_yml::from_value::<Config>(Value::Mapping(config_map.clone())).map_err(|e| {
        miette::miette!("Invalid value '{}' for {}: {}", args.value, args.key, e)
    })?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "project" };
        println!(
            "{} Set {} {} {} in {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            style("→").dim(),
            style(&args.value).yellow(),
            scope
        );
    }
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let config_path = if args.global {
        global_config_path()?
    } else {
        project_config_path(global)?
    };

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    if config_map.remove(args.key.as_str()).is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "project" };
        println!(
            "{} Removed {} from {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            scope
        );
    }
    Ok(())
}

fn run_path(args: PathArgs, global: &GlobalOpts) -> Result<()> {
    if args.project_only {
        println!("{}", project_config_path(global)?.display());
    } else if args.global_only {
        println!("{}", global_config_path()?.display());
    } else {
        let global_path = global_config_path()?;

        println!("{}", style("Configuration file paths:").bold());
        println!();
        println!("  {} {}", style("Global:").cyan(), global_path.display());
        print_exists(&global_path, 9);

        println!();
        match project_config_path(global) {
            Ok(path) => {
                println!("  {} {}", style("Project:").cyan(), path.display());
                print_exists(&path, 10);
            }
            Err(_) => println!(
                "  {} {}",
                style("Project:").cyan(),
                style("(not in an fdb project)").dim()
            ),
        }
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<24} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'fdb config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

// Helper functions

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "run 'fdb config keys' to list them",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn project_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    Ok(discover_project(global)?.config_path())
}

/// Read a config file as a mapping; missing, empty or comment-only files are empty
fn read_mapping(path: &Path) -> Result<Mapping> {
    if !path.exists() {
        return Ok(Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<Value>(&content) {
        Ok(Value::Mapping(map)) => Ok(map),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(miette::miette!(
            "Config file {} is not a YAML mapping",
            path.display()
        )),
        Err(e) => Err(miette::miette!(
            "Config file {} is not valid YAML: {}",
            path.display(),
            e
        )),
    }
}

/// Numbers and booleans keep their type; everything else is a string
fn parse_scalar(raw: &str) -> Value {
    match serde_yml::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(raw.to_string()),
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "default_format" => config.default_format.clone(),
        "log_level" => config.log_level.clone(),
        "lock_timeout_ms" => config.lock_timeout_ms.map(|v| v.to_string()),
        "lock_retry_interval_ms" => config.lock_retry_interval_ms.map(|v| v.to_string()),
        "page_size" => config.page_size.map(|v| v.to_string()),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

fn print_exists(path: &Path, indent: usize) {
    let label = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("{:indent$}{}", "", label, indent = indent);
}

fn show_config_file(title: &str, path: &Path) -> Result<()> {
    println!("{} {}", style(title).bold(), style(path.display()).dim());
    println!();

    if path.exists() {
        let content = fs::read_to_string(path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_keeps_numbers() {
        assert!(matches!(parse_scalar("250"), Value::Number(n) if n.as_u64() == Some(250)));
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("json"), Value::String("json".into()));
        assert_eq!(parse_scalar("[1]"), Value::String("[1]".into()));
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("page_size").is_ok());
        assert!(check_key("author").is_err());
    }

    #[test]
    fn test_read_mapping_treats_comments_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "# page_size: 100\n").unwrap();
        assert!(read_mapping(&path).unwrap().is_empty());
        assert!(read_mapping(&tmp.path().join("missing.yaml")).unwrap().is_empty());
    }

    #[test]
    fn test_get_config_value() {
        let config = Config {
            lock_timeout_ms: Some(250),
            ..Config::default()
        };
        assert_eq!(get_config_value(&config, "lock_timeout_ms").as_deref(), Some("250"));
        assert_eq!(get_config_value(&config, "page_size"), None);
    }
}
