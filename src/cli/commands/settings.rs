//! `fdb settings` command - View and edit the settings graph
//!
//! Values are addressed by dotted paths such as `web_server.port` or
//! `receivers.0.name`; `fdb settings keys` lists every settable path.

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{discover_project, effective_format, load_config};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::settings::{Configuration, ValidationResults};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the whole settings graph or one value
    Show(ShowArgs),

    /// Set one value by dotted path
    Set(SetArgs),

    /// List every settable path
    Keys,

    /// Check the settings for errors and warnings
    Validate(ValidateArgs),

    /// Add a named receiver, merged feed, rebroadcast server or location
    Add(AddArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Dotted path (e.g. "web_server.port"); omit for everything
    pub path: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Dotted path (e.g. "receivers.0.port")
    pub path: String,

    /// New value, parsed as YAML ("8080", "true", "[1, 2]")
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Kind of record to add
    #[arg(value_enum)]
    pub kind: RecordKind,

    /// Display name, unique within its kind
    pub name: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Receiver,
    MergedFeed,
    Rebroadcast,
    Location,
}

pub fn run(cmd: SettingsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SettingsCommands::Show(args) => run_show(args, global),
        SettingsCommands::Set(args) => run_set(args, global),
        SettingsCommands::Keys => run_keys(global),
        SettingsCommands::Validate(args) => run_validate(args, global),
        SettingsCommands::Add(args) => run_add(args, global),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = load_config(global);
    let settings = project.settings()?;

    let mut value = match &args.path {
        Some(path) => settings.get_path(path)?,
        None => serde_yml::to_value(&settings).into_diagnostic()?,
    };
    let leaf = args.path.as_deref().and_then(|p| p.rsplit('.').next());
    if leaf == Some(SECRET_KEY) {
        redact(&mut value);
    } else {
        redact_secrets(&mut value);
    }

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        }
        _ => match &value {
            serde_yml::Value::String(s) => println!("{}", s),
            serde_yml::Value::Number(n) => println!("{}", n),
            serde_yml::Value::Bool(b) => println!("{}", b),
            serde_yml::Value::Null => println!("~"),
            other => print!("{}", serde_yml::to_string(other).into_diagnostic()?),
        },
    }
    Ok(())
}

const SECRET_KEY: &str = "password_hash";
const REDACTED: &str = "<redacted>";

fn redact(value: &mut serde_yml::Value) {
    if matches!(value, serde_yml::Value::String(s) if !s.is_empty()) {
        *value = serde_yml::Value::String(REDACTED.to_string());
    }
}

/// Blank out every password hash below `value`
fn redact_secrets(value: &mut serde_yml::Value) {
    match value {
        serde_yml::Value::Mapping(map) => {
            for (key, child) in map.iter_mut() {
                if key.as_str() == Some(SECRET_KEY) {
                    redact(child);
                } else {
                    redact_secrets(child);
                }
            }
        }
        serde_yml::Value::Sequence(items) => items.iter_mut().for_each(redact_secrets),
        _ => {}
    }
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let mut settings = project.settings()?;

    settings.set_path(&args.path, &args.value)?;
    project.save_settings(&settings)?;

    if !global.quiet {
        println!(
            "{} Set {} {} {}",
            style("✓").green(),
            style(&args.path).cyan(),
            style("→").dim(),
            style(&args.value).yellow()
        );
        let results = settings.validate_in(project.root());
        if results.has_errors() {
            println!(
                "{} Settings now have {} error(s); run {}",
                style("!").yellow(),
                results.errors().count(),
                style("fdb settings validate").yellow()
            );
        }
    }
    Ok(())
}

fn run_keys(global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let settings = project.settings()?;
    for key in settings.keys()? {
        println!("{}", key);
    }
    Ok(())
}

fn run_validate(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = load_config(global);
    let settings = project.settings()?;
    let results = settings.validate_in(project.root());

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&results).into_diagnostic()?);
        }
        _ => print_results(&results, global.quiet),
    }

    let errors = results.errors().count();
    let warnings = results.warnings().count();
    if errors > 0 {
        return Err(miette::miette!("Settings have {} error(s)", errors));
    }
    if args.strict && warnings > 0 {
        return Err(miette::miette!(
            "Settings have {} warning(s) (--strict)",
            warnings
        ));
    }
    Ok(())
}

fn print_results(results: &ValidationResults, quiet: bool) {
    for message in results.errors() {
        println!(
            "{} {} {}",
            style("✗").red(),
            style(format!("[{:?}]", message.field)).dim(),
            message
        );
    }
    for message in results.warnings() {
        println!(
            "{} {} {}",
            style("!").yellow(),
            style(format!("[{:?}]", message.field)).dim(),
            message
        );
    }

    if quiet {
        return;
    }
    if results.is_empty() {
        println!("{} Settings are valid", style("✓").green());
    } else {
        println!();
        println!(
            "{} error(s), {} warning(s)",
            style(results.errors().count()).red(),
            style(results.warnings().count()).yellow()
        );
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let mut settings = project.settings()?;

    let (label, id) = add_record(&mut settings, args.kind, &args.name)?;
    project.save_settings(&settings)?;

    if !global.quiet {
        println!(
            "{} Added {} {} (id {})",
            style("✓").green(),
            label,
            style(&args.name).cyan(),
            id
        );
    }
    Ok(())
}

/// Add a record of `kind`; returns its label and unique id
fn add_record(
    settings: &mut Configuration,
    kind: RecordKind,
    name: &str,
) -> Result<(&'static str, i32)> {
    let added = match kind {
        RecordKind::Receiver => ("receiver", settings.add_receiver(name)?.unique_id),
        RecordKind::MergedFeed => ("merged feed", settings.add_merged_feed(name)?.unique_id),
        RecordKind::Rebroadcast => (
            "rebroadcast server",
            settings.add_rebroadcast_server(name)?.unique_id,
        ),
        RecordKind::Location => (
            "receiver location",
            settings.add_receiver_location(name)?.unique_id,
        ),
    };
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_record_shares_feed_ids() {
        let mut settings = Configuration::default();
        let (label, receiver_id) =
            add_record(&mut settings, RecordKind::Receiver, "Roof").unwrap();
        assert_eq!(label, "receiver");
        let (_, feed_id) = add_record(&mut settings, RecordKind::MergedFeed, "All").unwrap();
        assert_eq!(feed_id, receiver_id + 1);
    }

    #[test]
    fn test_add_record_rejects_duplicates() {
        let mut settings = Configuration::default();
        add_record(&mut settings, RecordKind::Location, "Home").unwrap();
        assert!(add_record(&mut settings, RecordKind::Location, " home ").is_err());
    }

    #[test]
    fn test_redact_secrets_hides_password_hashes() {
        let mut settings = Configuration::default();
        settings.add_user("pilot").unwrap().set_password("hunter2");
        settings.add_user("guest").unwrap();
        let mut value = serde_yml::to_value(&settings).unwrap();
        redact_secrets(&mut value);

        let yaml = serde_yml::to_string(&value).unwrap();
        assert!(!yaml.contains("sha256$"));
        assert_eq!(value["users"][0][SECRET_KEY].as_str(), Some(REDACTED));
        assert_eq!(value["users"][0]["login_name"].as_str(), Some("pilot"));
        assert_eq!(value["users"][1][SECRET_KEY].as_str(), Some(""));
    }
}
