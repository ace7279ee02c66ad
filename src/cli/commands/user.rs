//! `fdb user` command - Web site users

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{discover_project, effective_format, load_config};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::settings::{SettingsError, User};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a user
    Add(AddArgs),

    /// Change a user's password
    Passwd(PasswdArgs),

    /// Enable or disable a user
    Enable(EnableArgs),

    /// List users (password hashes are never shown)
    List,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Login name, unique ignoring case
    pub login: String,

    /// Display name (default: the login name)
    #[arg(long)]
    pub name: Option<String>,

    /// Initial password; without one the user cannot log in
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PasswdArgs {
    pub login: String,

    /// New password
    pub password: String,
}

#[derive(clap::Args, Debug)]
pub struct EnableArgs {
    pub login: String,

    /// Disable instead of enable
    #[arg(long)]
    pub off: bool,
}

/// A user as shown by `user list`
#[derive(Debug, Serialize)]
struct UserSummary<'a> {
    login_name: &'a str,
    name: &'a str,
    enabled: bool,
    has_password: bool,
    can_log_in: bool,
}

impl<'a> From<&'a User> for UserSummary<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            login_name: &user.login_name,
            name: &user.name,
            enabled: user.enabled,
            has_password: user.has_password(),
            can_log_in: user.can_log_in(),
        }
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("login", "LOGIN", 20),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("enabled", "ENABLED", 8),
    ColumnDef::new("password", "PASSWORD", 9),
    ColumnDef::new("login_ok", "CAN LOG IN", 11),
];

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        UserCommands::Add(args) => run_add(args, global),
        UserCommands::Passwd(args) => run_passwd(args, global),
        UserCommands::Enable(args) => run_enable(args, global),
        UserCommands::List => run_list(global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let mut settings = project.settings()?;

    let user = settings.add_user(&args.login)?;
    if let Some(name) = &args.name {
        user.name = name.clone();
    }
    if let Some(password) = &args.password {
        user.set_password(password);
    }
    let can_log_in = user.can_log_in();
    project.save_settings(&settings)?;

    if !global.quiet {
        println!(
            "{} Added user {}",
            style("✓").green(),
            style(&args.login).cyan()
        );
        if !can_log_in {
            println!(
                "{} No password set; use {} before this user can log in",
                style("!").yellow(),
                style(format!("fdb user passwd {} <password>", args.login)).yellow()
            );
        }
    }
    Ok(())
}

fn run_passwd(args: PasswdArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let mut settings = project.settings()?;

    settings
        .user_mut(&args.login)
        .ok_or_else(|| user_not_found(&args.login))?
        .set_password(&args.password);
    project.save_settings(&settings)?;

    if !global.quiet {
        println!(
            "{} Password changed for {}",
            style("✓").green(),
            style(&args.login).cyan()
        );
    }
    Ok(())
}

fn run_enable(args: EnableArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let mut settings = project.settings()?;

    settings
        .user_mut(&args.login)
        .ok_or_else(|| user_not_found(&args.login))?
        .enabled = !args.off;
    project.save_settings(&settings)?;

    if !global.quiet {
        println!(
            "{} {} user {}",
            style("✓").green(),
            if args.off { "Disabled" } else { "Enabled" },
            style(&args.login).cyan()
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = load_config(global);
    let settings = project.settings()?;
    let users: Vec<UserSummary> = settings.users.iter().map(UserSummary::from).collect();

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&users).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&users).into_diagnostic()?);
        }
        format => {
            let rows: Vec<TableRow> = users
                .iter()
                .map(|u| {
                    TableRow::new(u.login_name)
                        .cell("login", CellValue::Id(u.login_name.to_string()))
                        .cell("name", CellValue::opt_text(Some(u.name)))
                        .cell("enabled", CellValue::Flag(u.enabled))
                        .cell("password", CellValue::Flag(u.has_password))
                        .cell("login_ok", CellValue::Flag(u.can_log_in))
                })
                .collect();
            let mut formatter = TableFormatter::new(COLUMNS, "user");
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(&rows, format);
        }
    }
    Ok(())
}

fn user_not_found(login: &str) -> SettingsError {
    SettingsError::NotFound {
        kind: "user",
        name: login.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_hides_hash() {
        let mut user = User::new("alice");
        user.set_password("secret");
        let summary = UserSummary::from(&user);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"has_password\":true"));
        assert!(!json.contains("sha256"));
        assert!(summary.can_log_in);
    }
}
