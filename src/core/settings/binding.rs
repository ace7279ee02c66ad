//! Dotted property-path access to the settings graph
//!
//! Paths look like `web_server.port` or `receivers.0.access.default_access`;
//! numeric segments index sequences.

use serde_yml::Value;
use tracing::debug;

use super::{Configuration, SettingsError};

impl Configuration {
    /// Read the value at `path`
    pub fn get_path(&self, path: &str) -> Result<Value, SettingsError> {
        let mut tree = self.to_tree()?;
        let node = navigate(&mut tree, path)?;
        Ok(node.clone())
    }

    /// Write `raw` (YAML scalar text) to `path`
    ///
    /// The edited graph is re-typed before it replaces `self`, so a value of
    /// the wrong type is rejected and leaves the settings untouched. Text that
    /// YAML reads as a number or boolean is retried as a plain string, which
    /// lets names like `1090` through.
    pub fn set_path(&mut self, path: &str, raw: &str) -> Result<(), SettingsError> {
        let parsed =
            serde_yml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        let updated = match self.with_value(path, parsed.clone()) {
            Ok(config) => config,
            Err(SettingsError::TypeMismatch { .. }) if !parsed.is_string() => {
                self.with_value(path, Value::String(raw.to_string()))?
            }
            Err(e) => return Err(e),
        };

        debug!(path, value = raw, "updated setting");
        *self = updated;
        Ok(())
    }

    /// Every settable leaf path, in document order
    pub fn keys(&self) -> Result<Vec<String>, SettingsError> {
        let tree = self.to_tree()?;
        let mut keys = Vec::new();
        collect_keys(&tree, String::new(), &mut keys);
        Ok(keys)
    }

    fn to_tree(&self) -> Result<Value, SettingsError> {
        serde_yml::to_value(self).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    fn with_value(&self, path: &str, value: Value) -> Result<Configuration, SettingsError> {
        let mut tree = self.to_tree()?;
        *navigate(&mut tree, path)? = value;
        serde_yml::from_value(tree).map_err(|e| SettingsError::TypeMismatch {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

fn navigate<'a>(tree: &'a mut Value, path: &str) -> Result<&'a mut Value, SettingsError> {
    let unknown = || SettingsError::UnknownPath(path.to_string());
    if path.trim().is_empty() {
        return Err(unknown());
    }

    let mut node = tree;
    for segment in path.split('.') {
        node = match node {
            Value::Sequence(items) => {
                let index: usize = segment.parse().map_err(|_| unknown())?;
                items.get_mut(index).ok_or_else(unknown)?
            }
            Value::Mapping(map) => map.get_mut(segment).ok_or_else(unknown)?,
            _ => return Err(unknown()),
        };
    }
    Ok(node)
}

fn collect_keys(node: &Value, prefix: String, keys: &mut Vec<String>) {
    let join = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", prefix, segment)
        }
    };

    match node {
        Value::Mapping(map) => {
            for (key, child) in map {
                if let Some(key) = key.as_str() {
                    collect_keys(child, join(key), keys);
                }
            }
        }
        Value::Sequence(items) if items.iter().any(|i| i.is_mapping()) => {
            for (index, child) in items.iter().enumerate() {
                collect_keys(child, join(&index.to_string()), keys);
            }
        }
        _ => keys.push(prefix),
    }
}

#[cfg(test)]
mod tests {
    use crate::core::settings::{Configuration, DataSource, SettingsError};

    #[test]
    fn test_get_path_reads_nested_values() {
        let config = Configuration::default();
        assert_eq!(config.get_path("web_server.port").unwrap().as_i64(), Some(8080));
        assert_eq!(
            config.get_path("receivers.0.name").unwrap().as_str(),
            Some("Receiver")
        );
    }

    #[test]
    fn test_set_path_retypes_scalars() {
        let mut config = Configuration::default();
        config.set_path("receivers.0.port", "30005").unwrap();
        config.set_path("receivers.0.data_source", "beast").unwrap();
        config.set_path("google_map.initial_latitude", "-33.9").unwrap();
        config.set_path("base_station.auto_save_flights", "false").unwrap();

        assert_eq!(config.receivers[0].port, 30005);
        assert_eq!(config.receivers[0].data_source, DataSource::Beast);
        assert_eq!(config.google_map.initial_latitude, -33.9);
        assert!(!config.base_station.auto_save_flights);
    }

    #[test]
    fn test_numeric_text_into_string_field() {
        let mut config = Configuration::default();
        config.set_path("receivers.0.name", "1090").unwrap();
        assert_eq!(config.receivers[0].name, "1090");
    }

    #[test]
    fn test_optional_fields_accept_null() {
        let mut config = Configuration::default();
        config.set_path("receivers.0.com_port", "COM3").unwrap();
        assert_eq!(config.receivers[0].com_port.as_deref(), Some("COM3"));
        config.set_path("receivers.0.com_port", "~").unwrap();
        assert_eq!(config.receivers[0].com_port, None);
    }

    #[test]
    fn test_type_mismatch_leaves_settings_unchanged() {
        let mut config = Configuration::default();
        let before = config.clone();

        let err = config.set_path("web_server.port", "eighty").unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));
        let err = config.set_path("receivers.0.data_source", "carrier_pigeon").unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));

        assert_eq!(config, before);
    }

    #[test]
    fn test_unknown_paths() {
        let mut config = Configuration::default();
        for path in ["nope", "web_server.nope", "receivers.7.port", "receivers.x.port", ""] {
            assert!(
                matches!(config.set_path(path, "1"), Err(SettingsError::UnknownPath(_))),
                "{path}"
            );
        }
        assert!(config.get_path("web_server.port.deeper").is_err());
    }

    #[test]
    fn test_sequence_values_can_be_replaced() {
        let mut config = Configuration::default();
        config.add_merged_feed("All").unwrap();
        config.set_path("merged_feeds.0.receiver_ids", "[1]").unwrap();
        assert_eq!(config.merged_feeds[0].receiver_ids, vec![1]);
    }

    #[test]
    fn test_keys_lists_leaves() {
        let config = Configuration::default();
        let keys = config.keys().unwrap();
        assert!(keys.contains(&"web_server.port".to_string()));
        assert!(keys.contains(&"receivers.0.access.default_access".to_string()));
        assert!(keys.contains(&"receivers.0.access.addresses".to_string()));
        assert!(!keys.iter().any(|k| k == "receivers" || k == "web_server"));

        let mut config = config;
        for key in keys {
            let current = config.get_path(&key).unwrap();
            if let Some(s) = current.as_str() {
                config.set_path(&key, s).unwrap();
            }
        }
    }
}
