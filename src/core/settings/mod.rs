//! Application settings: the configuration object graph
//!
//! The graph is loaded once, edited in place (directly or through dotted
//! property paths, see [`Configuration::set_path`]) and saved back as YAML.

mod binding;
mod model;
mod user;
mod validation;

pub use model::*;
pub use user::User;
pub use validation::{Severity, ValidationField, ValidationMessage, ValidationResults};

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from loading, saving or editing settings
#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("cannot access settings file {path:?}: {source}")]
    #[diagnostic(code(fdb::settings::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("settings file {path:?} is not valid: {message}")]
    #[diagnostic(code(fdb::settings::parse))]
    Parse { path: PathBuf, message: String },

    #[error("cannot serialize settings: {0}")]
    #[diagnostic(code(fdb::settings::serialize))]
    Serialize(String),

    #[error("unknown settings path '{0}'")]
    #[diagnostic(
        code(fdb::settings::unknown_path),
        help("run 'fdb settings keys' to list the available paths")
    )]
    UnknownPath(String),

    #[error("cannot set '{path}': {message}")]
    #[diagnostic(code(fdb::settings::type_mismatch))]
    TypeMismatch { path: String, message: String },

    #[error("a {kind} named '{name}' already exists")]
    #[diagnostic(code(fdb::settings::duplicate))]
    Duplicate { kind: &'static str, name: String },

    #[error("no {kind} named '{name}'")]
    #[diagnostic(code(fdb::settings::not_found))]
    NotFound { kind: &'static str, name: String },
}

impl Configuration {
    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            debug!(?path, "settings file missing, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(&contents).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write settings to `path` via a temporary file and rename
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let yaml = serde_yml::to_string(self).map_err(|e| SettingsError::Serialize(e.to_string()))?;
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        info!(?path, "saved settings");
        Ok(())
    }

    /// Next free id shared by receivers and merged feeds
    pub fn next_feed_id(&self) -> i32 {
        self.receivers
            .iter()
            .map(|r| r.unique_id)
            .chain(self.merged_feeds.iter().map(|m| m.unique_id))
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn receiver(&self, id: i32) -> Option<&Receiver> {
        self.receivers.iter().find(|r| r.unique_id == id)
    }

    pub fn merged_feed(&self, id: i32) -> Option<&MergedFeed> {
        self.merged_feeds.iter().find(|m| m.unique_id == id)
    }

    pub fn receiver_location(&self, id: i32) -> Option<&ReceiverLocation> {
        self.receiver_locations.iter().find(|l| l.unique_id == id)
    }

    /// Find a user by login name (case-insensitive)
    pub fn user_mut(&mut self, login_name: &str) -> Option<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.login_name.eq_ignore_ascii_case(login_name))
    }

    pub fn add_receiver(&mut self, name: &str) -> Result<&mut Receiver, SettingsError> {
        check_unique("receiver", name, self.receivers.iter().map(|r| r.name.as_str()))?;
        let unique_id = self.next_feed_id();
        self.receivers.push(Receiver {
            unique_id,
            name: name.to_string(),
            ..Receiver::default()
        });
        Ok(last(&mut self.receivers))
    }

    pub fn add_merged_feed(&mut self, name: &str) -> Result<&mut MergedFeed, SettingsError> {
        check_unique("merged feed", name, self.merged_feeds.iter().map(|m| m.name.as_str()))?;
        let unique_id = self.next_feed_id();
        self.merged_feeds.push(MergedFeed {
            unique_id,
            name: name.to_string(),
            ..MergedFeed::default()
        });
        Ok(last(&mut self.merged_feeds))
    }

    pub fn add_rebroadcast_server(
        &mut self,
        name: &str,
    ) -> Result<&mut RebroadcastSettings, SettingsError> {
        check_unique(
            "rebroadcast server",
            name,
            self.rebroadcast_servers.iter().map(|r| r.name.as_str()),
        )?;
        let unique_id = self
            .rebroadcast_servers
            .iter()
            .map(|r| r.unique_id)
            .max()
            .unwrap_or(0)
            + 1;
        let receiver_id = self.receivers.first().map(|r| r.unique_id).unwrap_or(0);
        self.rebroadcast_servers.push(RebroadcastSettings {
            unique_id,
            name: name.to_string(),
            receiver_id,
            ..RebroadcastSettings::default()
        });
        Ok(last(&mut self.rebroadcast_servers))
    }

    pub fn add_receiver_location(
        &mut self,
        name: &str,
    ) -> Result<&mut ReceiverLocation, SettingsError> {
        check_unique(
            "receiver location",
            name,
            self.receiver_locations.iter().map(|l| l.name.as_str()),
        )?;
        let unique_id = self
            .receiver_locations
            .iter()
            .map(|l| l.unique_id)
            .max()
            .unwrap_or(0)
            + 1;
        self.receiver_locations.push(ReceiverLocation {
            unique_id,
            name: name.to_string(),
            ..ReceiverLocation::default()
        });
        Ok(last(&mut self.receiver_locations))
    }

    pub fn add_user(&mut self, login_name: &str) -> Result<&mut User, SettingsError> {
        check_unique("user", login_name, self.users.iter().map(|u| u.login_name.as_str()))?;
        self.users.push(User::new(login_name));
        Ok(last(&mut self.users))
    }
}

fn check_unique<'a>(
    kind: &'static str,
    name: &str,
    mut existing: impl Iterator<Item = &'a str>,
) -> Result<(), SettingsError> {
    if existing.any(|n| n.trim().eq_ignore_ascii_case(name.trim())) {
        return Err(SettingsError::Duplicate {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn last<T>(items: &mut [T]) -> &mut T {
    let index = items.len() - 1;
    &mut items[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempdir().unwrap();
        let config = Configuration::load(&tmp.path().join("nope.yaml")).unwrap();
        assert_eq!(config, Configuration::default());
        assert_eq!(config.receivers.len(), 1);
    }

    #[test]
    fn test_save_then_load_preserves_graph() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(".fdb/settings.yaml");

        let mut config = Configuration::default();
        config.add_receiver("Roof").unwrap().port = 30005;
        config.add_user("admin").unwrap().set_password("pw");
        config.save(&path).unwrap();

        let loaded = Configuration::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.yaml");
        fs::write(&path, "web_server:\n  port: 9090\n").unwrap();

        let config = Configuration::load(&path).unwrap();
        assert_eq!(config.web_server.port, 9090);
        assert_eq!(config.base_station.database_file_name, "BaseStation.sqb");
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.yaml");
        fs::write(&path, "receivers: [ {").unwrap();
        assert!(matches!(
            Configuration::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_feed_ids_are_shared_between_receivers_and_merged_feeds() {
        let mut config = Configuration::default();
        let r = config.add_receiver("Second").unwrap().unique_id;
        let m = config.add_merged_feed("All").unwrap().unique_id;
        assert_eq!(r, 2);
        assert_eq!(m, 3);
        assert_eq!(config.next_feed_id(), 4);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut config = Configuration::default();
        let err = config.add_receiver("receiver").unwrap_err();
        assert!(matches!(err, SettingsError::Duplicate { .. }));

        config.add_user("Bob").unwrap();
        assert!(config.add_user("bob").is_err());
        assert!(config.user_mut("BOB").is_some());
    }

    #[test]
    fn test_rebroadcast_defaults_to_first_receiver() {
        let mut config = Configuration::default();
        let server = config.add_rebroadcast_server("Out").unwrap();
        assert_eq!(server.receiver_id, 1);
        assert_eq!(server.unique_id, 1);
    }
}
