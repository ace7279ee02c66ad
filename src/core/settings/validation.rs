//! Settings validation
//!
//! [`Configuration::validate`] checks the whole graph and reports every
//! problem it finds rather than stopping at the first one.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::path::Path;

use serde::Serialize;

use super::{Access, Configuration, ConnectionType, DefaultAccess, ReceiverUsage};

/// Serial baud rates a receiver may use
pub const STANDARD_BAUD_RATES: &[i32] = &[
    110, 300, 1200, 2400, 4800, 9600, 14400, 19200, 38400, 57600, 115200, 230400, 460800, 921600,
    3000000,
];

/// The setting a validation message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationField {
    ReceiverName,
    ReceiverAddress,
    ReceiverPort,
    ComPort,
    BaudRate,
    DataBits,
    ReceiverLocation,
    IdleTimeout,
    AccessAddress,
    AccessList,
    FeedsRequired,
    MergedFeedName,
    MergedFeedReceivers,
    MlatReceivers,
    IcePeriod,
    RebroadcastName,
    RebroadcastReceiver,
    RebroadcastPort,
    TransmitAddress,
    StaleSeconds,
    LocationName,
    Latitude,
    Longitude,
    BaseStationLocation,
    LoginName,
    WebServerPort,
    UpnpPort,
    BasicAuthentication,
    InitialZoom,
    InitialLatitude,
    InitialLongitude,
    RefreshSeconds,
    DatabaseFileName,
    DatabaseFile,
    VoiceRate,
    ReceiverRange,
    PositionLimit,
    InternetClientTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationMessage {
    pub field: ValidationField,
    /// Name of the receiver, feed, user... the message refers to
    pub record: Option<String>,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => write!(f, "{}: {}", record, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResults {
    pub messages: Vec<ValidationMessage>,
}

impl ValidationResults {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter().filter(|m| m.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter().filter(|m| m.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages about `field`
    pub fn for_field(&self, field: ValidationField) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter().filter(move |m| m.field == field)
    }

    fn error(&mut self, field: ValidationField, record: Option<&str>, message: impl Into<String>) {
        self.push(field, record, Severity::Error, message.into());
    }

    fn warning(&mut self, field: ValidationField, record: Option<&str>, message: impl Into<String>) {
        self.push(field, record, Severity::Warning, message.into());
    }

    fn push(&mut self, field: ValidationField, record: Option<&str>, severity: Severity, message: String) {
        self.messages.push(ValidationMessage {
            field,
            record: record.map(String::from),
            severity,
            message,
        });
    }
}

impl Configuration {
    /// Check every rule that does not need the filesystem
    pub fn validate(&self) -> ValidationResults {
        let mut results = ValidationResults::default();
        self.validate_receivers(&mut results);
        self.validate_merged_feeds(&mut results);
        self.validate_feeds_present(&mut results);
        self.validate_rebroadcast_servers(&mut results);
        self.validate_receiver_locations(&mut results);
        self.validate_users(&mut results);
        self.validate_web_server(&mut results);
        self.validate_google_map(&mut results);
        self.validate_base_station(&mut results);
        self.validate_decoding(&mut results);
        results
    }

    /// [`validate`](Self::validate) plus checks that resolve files against
    /// the project root
    pub fn validate_in(&self, project_root: &Path) -> ValidationResults {
        let mut results = self.validate();
        if self.base_station.database_file_name.trim().is_empty() {
            return results;
        }
        let path = self.database_path(project_root);
        if !path.exists() {
            results.warning(
                ValidationField::DatabaseFile,
                None,
                format!("database file {} does not exist", path.display()),
            );
        }
        results
    }

    /// Resolve the flight database file against `project_root`
    pub fn database_path(&self, project_root: &Path) -> std::path::PathBuf {
        let name = Path::new(self.base_station.database_file_name.trim());
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            project_root.join(name)
        }
    }

    fn validate_receivers(&self, results: &mut ValidationResults) {
        check_names(
            results,
            ValidationField::ReceiverName,
            "receiver",
            self.receivers.iter().map(|r| r.name.as_str()),
        );

        for receiver in &self.receivers {
            let record = Some(receiver.name.as_str());
            match receiver.connection_type {
                ConnectionType::Tcp => {
                    if receiver.address.trim().is_empty() && !receiver.is_passive {
                        results.error(
                            ValidationField::ReceiverAddress,
                            record,
                            "an address is required",
                        );
                    }
                    check_port(results, ValidationField::ReceiverPort, record, receiver.port);
                }
                ConnectionType::Com => {
                    if receiver.com_port.as_deref().map_or(true, |p| p.trim().is_empty()) {
                        results.error(ValidationField::ComPort, record, "a COM port is required");
                    }
                    if !STANDARD_BAUD_RATES.contains(&receiver.baud_rate) {
                        results.error(
                            ValidationField::BaudRate,
                            record,
                            format!("{} is not a standard baud rate", receiver.baud_rate),
                        );
                    }
                    if !(5..=8).contains(&receiver.data_bits) {
                        results.error(
                            ValidationField::DataBits,
                            record,
                            "data bits must be between 5 and 8",
                        );
                    }
                }
            }

            if let Some(location_id) = receiver.receiver_location_id {
                if self.receiver_location(location_id).is_none() {
                    results.error(
                        ValidationField::ReceiverLocation,
                        record,
                        format!("receiver location {} does not exist", location_id),
                    );
                }
            }

            check_idle_timeout(results, record, receiver.idle_timeout_milliseconds);
            check_access(results, record, &receiver.access, receiver.is_passive);
        }
    }

    fn validate_merged_feeds(&self, results: &mut ValidationResults) {
        check_names(
            results,
            ValidationField::MergedFeedName,
            "merged feed",
            self.merged_feeds.iter().map(|m| m.name.as_str()),
        );

        for feed in &self.merged_feeds {
            let record = Some(feed.name.as_str());
            if feed.receiver_ids.is_empty() {
                results.error(
                    ValidationField::MergedFeedReceivers,
                    record,
                    "at least one receiver must be merged",
                );
            }
            for id in &feed.receiver_ids {
                if self.receiver(*id).is_none() {
                    let message = if self.merged_feed(*id).is_some() {
                        format!("feed {} is itself a merged feed", id)
                    } else {
                        format!("receiver {} does not exist", id)
                    };
                    results.error(ValidationField::MergedFeedReceivers, record, message);
                }
            }
            for id in &feed.mlat_receiver_ids {
                if !feed.receiver_ids.contains(id) {
                    results.error(
                        ValidationField::MlatReceivers,
                        record,
                        format!("MLAT receiver {} is not one of the merged receivers", id),
                    );
                }
            }
            if feed.ice_period_milliseconds < 1000 {
                results.error(
                    ValidationField::IcePeriod,
                    record,
                    "ice period must be at least 1000 milliseconds",
                );
            }
        }
    }

    fn validate_feeds_present(&self, results: &mut ValidationResults) {
        let any_enabled = self.receivers.iter().any(|r| r.enabled)
            || self.merged_feeds.iter().any(|m| m.enabled);
        if !any_enabled {
            results.error(
                ValidationField::FeedsRequired,
                None,
                "at least one enabled receiver or merged feed is required",
            );
        }

        let visible = self
            .receivers
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.receiver_usage)
            .chain(self.merged_feeds.iter().filter(|m| m.enabled).map(|m| m.receiver_usage))
            .any(|usage| usage == ReceiverUsage::Normal);
        if any_enabled && !visible {
            results.warning(
                ValidationField::FeedsRequired,
                None,
                "no enabled feed is shown on the web site",
            );
        }
    }

    fn validate_rebroadcast_servers(&self, results: &mut ValidationResults) {
        check_names(
            results,
            ValidationField::RebroadcastName,
            "rebroadcast server",
            self.rebroadcast_servers.iter().map(|r| r.name.as_str()),
        );

        let mut listeners: HashMap<i32, &str> = HashMap::new();
        if (1..=65535).contains(&self.web_server.port) {
            listeners.insert(self.web_server.port, "the web server");
        }

        for server in &self.rebroadcast_servers {
            let record = Some(server.name.as_str());
            if self.receiver(server.receiver_id).is_none()
                && self.merged_feed(server.receiver_id).is_none()
            {
                results.error(
                    ValidationField::RebroadcastReceiver,
                    record,
                    format!("receiver or merged feed {} does not exist", server.receiver_id),
                );
            }

            check_port(results, ValidationField::RebroadcastPort, record, server.port);
            if server.is_transmitter {
                if server.transmit_address.trim().is_empty() {
                    results.error(
                        ValidationField::TransmitAddress,
                        record,
                        "a transmitter needs an address to send to",
                    );
                }
            } else if server.enabled && (1..=65535).contains(&server.port) {
                if let Some(other) = listeners.get(&server.port) {
                    results.error(
                        ValidationField::RebroadcastPort,
                        record,
                        format!("port {} is already used by {}", server.port, other),
                    );
                } else {
                    listeners.insert(server.port, server.name.as_str());
                }
            }
            let listening = server.enabled && !server.is_transmitter;
            check_access(results, record, &server.access, listening);

            if server.stale_seconds < 1 {
                results.error(
                    ValidationField::StaleSeconds,
                    record,
                    "stale seconds must be at least 1",
                );
            }
            check_idle_timeout(results, record, server.idle_timeout_milliseconds);
        }
    }

    fn validate_receiver_locations(&self, results: &mut ValidationResults) {
        check_names(
            results,
            ValidationField::LocationName,
            "receiver location",
            self.receiver_locations.iter().map(|l| l.name.as_str()),
        );

        for location in &self.receiver_locations {
            let record = Some(location.name.as_str());
            check_latitude(results, ValidationField::Latitude, record, location.latitude);
            check_longitude(results, ValidationField::Longitude, record, location.longitude);
        }

        let base_stations = self
            .receiver_locations
            .iter()
            .filter(|l| l.is_base_station_location)
            .count();
        if base_stations > 1 {
            results.error(
                ValidationField::BaseStationLocation,
                None,
                "only one receiver location can be the BaseStation location",
            );
        }
    }

    fn validate_users(&self, results: &mut ValidationResults) {
        check_names(
            results,
            ValidationField::LoginName,
            "user",
            self.users.iter().map(|u| u.login_name.as_str()),
        );
        for user in self.users.iter().filter(|u| u.enabled && !u.has_password()) {
            results.warning(
                ValidationField::LoginName,
                Some(user.login_name.as_str()),
                "user has no password and cannot log in",
            );
        }
    }

    fn validate_web_server(&self, results: &mut ValidationResults) {
        let web = &self.web_server;
        check_port(results, ValidationField::WebServerPort, None, web.port);
        if web.enable_upnp {
            check_port(results, ValidationField::UpnpPort, None, web.upnp_port);
        }
        if web.basic_authentication && !self.users.iter().any(|u| u.can_log_in()) {
            results.error(
                ValidationField::BasicAuthentication,
                None,
                "basic authentication needs at least one enabled web site user with a password",
            );
        }
        check_access(results, Some("internet access"), &web.internet_access, true);
        if self.internet_client.timeout_minutes < 0 {
            results.error(
                ValidationField::InternetClientTimeout,
                None,
                "internet client timeout cannot be negative",
            );
        }
    }

    fn validate_google_map(&self, results: &mut ValidationResults) {
        let map = &self.google_map;
        if !(0..=19).contains(&map.initial_zoom) {
            results.error(
                ValidationField::InitialZoom,
                None,
                "initial zoom must be between 0 and 19",
            );
        }
        check_latitude(results, ValidationField::InitialLatitude, None, map.initial_latitude);
        check_longitude(results, ValidationField::InitialLongitude, None, map.initial_longitude);
        if map.minimum_refresh_seconds < 0 {
            results.error(
                ValidationField::RefreshSeconds,
                None,
                "minimum refresh cannot be negative",
            );
        }
        if map.initial_refresh_seconds < map.minimum_refresh_seconds {
            results.error(
                ValidationField::RefreshSeconds,
                None,
                "initial refresh cannot be shorter than the minimum refresh",
            );
        }
    }

    fn validate_base_station(&self, results: &mut ValidationResults) {
        let base = &self.base_station;
        if base.auto_save_flights && base.database_file_name.trim().is_empty() {
            results.error(
                ValidationField::DatabaseFileName,
                None,
                "a database file is required when flights are saved",
            );
        }
    }

    fn validate_decoding(&self, results: &mut ValidationResults) {
        if !(-10..=10).contains(&self.audio.voice_rate) {
            results.error(
                ValidationField::VoiceRate,
                None,
                "voice rate must be between -10 and 10",
            );
        }

        let raw = &self.raw_decoding;
        if raw.receiver_range_km < 1 {
            results.error(
                ValidationField::ReceiverRange,
                None,
                "receiver range must be at least 1 km",
            );
        }
        for (label, seconds) in [
            ("airborne", raw.airborne_global_position_limit_seconds),
            ("fast surface", raw.fast_surface_global_position_limit_seconds),
            ("slow surface", raw.slow_surface_global_position_limit_seconds),
        ] {
            if seconds < 1 {
                results.error(
                    ValidationField::PositionLimit,
                    None,
                    format!("{} position limit must be at least 1 second", label),
                );
            }
        }
    }
}

fn check_names<'a>(
    results: &mut ValidationResults,
    field: ValidationField,
    kind: &str,
    names: impl Iterator<Item = &'a str>,
) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            results.error(field, None, format!("every {} needs a name", kind));
            continue;
        }
        let count = seen.entry(trimmed.to_lowercase()).or_insert(0);
        *count += 1;
        if *count == 2 {
            results.error(
                field,
                Some(trimmed),
                format!("more than one {} has this name", kind),
            );
        }
    }
}

fn check_port(results: &mut ValidationResults, field: ValidationField, record: Option<&str>, port: i32) {
    if !(1..=65535).contains(&port) {
        results.error(field, record, format!("port {} is not between 1 and 65535", port));
    }
}

fn check_idle_timeout(results: &mut ValidationResults, record: Option<&str>, millis: i32) {
    if millis != 0 && millis < 5000 {
        results.error(
            ValidationField::IdleTimeout,
            record,
            "idle timeout must be 0 (off) or at least 5000 milliseconds",
        );
    }
}

fn check_latitude(results: &mut ValidationResults, field: ValidationField, record: Option<&str>, value: f64) {
    if !(-90.0..=90.0).contains(&value) {
        results.error(field, record, "latitude must be between -90 and 90");
    }
}

fn check_longitude(results: &mut ValidationResults, field: ValidationField, record: Option<&str>, value: f64) {
    if !(-180.0..=180.0).contains(&value) {
        results.error(field, record, "longitude must be between -180 and 180");
    }
}

/// Addresses must always parse; the empty-list warning only applies while
/// the list is `in_use`
fn check_access(
    results: &mut ValidationResults,
    record: Option<&str>,
    access: &Access,
    in_use: bool,
) {
    for address in &access.addresses {
        if !is_valid_cidr(address) {
            results.error(
                ValidationField::AccessAddress,
                record,
                format!("'{}' is not a valid address or CIDR block", address),
            );
        }
    }
    if in_use
        && access.default_access != DefaultAccess::Unrestricted
        && access.addresses.is_empty()
    {
        let message = match access.default_access {
            DefaultAccess::Allow => "access is allowed to nobody",
            _ => "the deny list is empty, so nobody is denied",
        };
        results.warning(ValidationField::AccessList, record, message);
    }
}

/// `addr` or `addr/prefix`, IPv4 or IPv6
pub fn is_valid_cidr(text: &str) -> bool {
    let (addr, prefix) = match text.trim().split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (text.trim(), None),
    };
    let Ok(ip) = addr.parse::<IpAddr>() else {
        return false;
    };
    let max = if ip.is_ipv4() { 32 } else { 128 };
    match prefix {
        None => true,
        Some(bits) => bits.parse::<u8>().is_ok_and(|bits| bits <= max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::{Receiver, RebroadcastSettings, ReceiverLocation};
    use tempfile::tempdir;

    fn fields(results: &ValidationResults) -> Vec<ValidationField> {
        results.messages.iter().map(|m| m.field).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let results = Configuration::default().validate();
        assert!(!results.has_errors(), "{:?}", results.messages);
    }

    #[test]
    fn test_blank_and_duplicate_receiver_names() {
        let mut config = Configuration::default();
        config.receivers.push(Receiver {
            unique_id: 2,
            name: "RECEIVER ".into(),
            ..Receiver::default()
        });
        config.receivers.push(Receiver {
            unique_id: 3,
            ..Receiver::default()
        });
        let results = config.validate();
        let names: Vec<_> = results.for_field(ValidationField::ReceiverName).collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].record.as_deref(), Some("RECEIVER"));
        assert_eq!(names[1].message, "every receiver needs a name");
    }

    #[test]
    fn test_no_enabled_feed() {
        let mut config = Configuration::default();
        config.receivers[0].enabled = false;
        assert!(fields(&config.validate()).contains(&ValidationField::FeedsRequired));
    }

    #[test]
    fn test_network_receiver_rules() {
        let mut config = Configuration::default();
        config.receivers[0].address = " ".into();
        config.receivers[0].port = 70000;
        config.receivers[0].idle_timeout_milliseconds = 1000;
        config.receivers[0].receiver_location_id = Some(9);
        let got = fields(&config.validate());
        for field in [
            ValidationField::ReceiverAddress,
            ValidationField::ReceiverPort,
            ValidationField::IdleTimeout,
            ValidationField::ReceiverLocation,
        ] {
            assert!(got.contains(&field), "{:?} missing from {:?}", field, got);
        }
    }

    #[test]
    fn test_idle_timeout_zero_is_off() {
        let mut config = Configuration::default();
        config.receivers[0].idle_timeout_milliseconds = 0;
        assert!(!config.validate().has_errors());
    }

    #[test]
    fn test_serial_receiver_rules() {
        let mut config = Configuration::default();
        config.receivers[0].connection_type = ConnectionType::Com;
        config.receivers[0].baud_rate = 12345;
        let got = fields(&config.validate());
        assert!(got.contains(&ValidationField::ComPort));
        assert!(got.contains(&ValidationField::BaudRate));

        config.receivers[0].com_port = Some("/dev/ttyUSB0".into());
        config.receivers[0].baud_rate = 3_000_000;
        assert!(!config.validate().has_errors());
    }

    #[test]
    fn test_merged_feed_rules() {
        let mut config = Configuration::default();
        let feed = config.add_merged_feed("All").unwrap();
        feed.receiver_ids = vec![1, 42];
        feed.mlat_receiver_ids = vec![7];
        let nested = config.add_merged_feed("Nested").unwrap();
        nested.receiver_ids = vec![2];

        let results = config.validate();
        let receivers: Vec<_> = results
            .for_field(ValidationField::MergedFeedReceivers)
            .map(|m| m.message.as_str())
            .collect();
        assert_eq!(
            receivers,
            vec!["receiver 42 does not exist", "feed 2 is itself a merged feed"]
        );
        assert_eq!(results.for_field(ValidationField::MlatReceivers).count(), 1);

        config.merged_feeds[0].receiver_ids.clear();
        let results = config.validate();
        assert!(results
            .for_field(ValidationField::MergedFeedReceivers)
            .any(|m| m.message == "at least one receiver must be merged"));
    }

    #[test]
    fn test_rebroadcast_rules() {
        let mut config = Configuration::default();
        config.rebroadcast_servers.push(RebroadcastSettings {
            unique_id: 1,
            name: "A".into(),
            receiver_id: 1,
            port: 8080,
            ..RebroadcastSettings::default()
        });
        config.rebroadcast_servers.push(RebroadcastSettings {
            unique_id: 2,
            name: "B".into(),
            receiver_id: 99,
            is_transmitter: true,
            ..RebroadcastSettings::default()
        });
        let results = config.validate();
        let got = fields(&results);
        assert!(results
            .for_field(ValidationField::RebroadcastPort)
            .any(|m| m.message.contains("web server")));
        assert!(got.contains(&ValidationField::RebroadcastReceiver));
        assert!(got.contains(&ValidationField::TransmitAddress));
    }

    #[test]
    fn test_receiver_location_rules() {
        let mut config = Configuration::default();
        for (id, lat) in [(1, 91.0), (2, 10.0)] {
            config.receiver_locations.push(ReceiverLocation {
                unique_id: id,
                name: format!("L{}", id),
                latitude: lat,
                longitude: 0.0,
                is_base_station_location: true,
            });
        }
        let got = fields(&config.validate());
        assert!(got.contains(&ValidationField::Latitude));
        assert!(got.contains(&ValidationField::BaseStationLocation));
        assert!(!got.contains(&ValidationField::Longitude));
    }

    #[test]
    fn test_basic_authentication_needs_a_user() {
        let mut config = Configuration::default();
        config.web_server.basic_authentication = true;
        assert!(fields(&config.validate()).contains(&ValidationField::BasicAuthentication));

        config.add_user("admin").unwrap().set_password("secret");
        assert!(!config.validate().has_errors());
    }

    #[test]
    fn test_map_and_decoding_ranges() {
        let mut config = Configuration::default();
        config.google_map.initial_zoom = 20;
        config.google_map.initial_longitude = -181.0;
        config.audio.voice_rate = 11;
        config.raw_decoding.airborne_global_position_limit_seconds = 0;
        config.internet_client.timeout_minutes = -1;
        let got = fields(&config.validate());
        for field in [
            ValidationField::InitialZoom,
            ValidationField::InitialLongitude,
            ValidationField::VoiceRate,
            ValidationField::PositionLimit,
            ValidationField::InternetClientTimeout,
        ] {
            assert!(got.contains(&field), "{:?}", field);
        }
    }

    #[test]
    fn test_database_file_rules() {
        let tmp = tempdir().unwrap();
        let mut config = Configuration::default();

        let results = config.validate_in(tmp.path());
        assert!(!results.has_errors());
        assert_eq!(results.warnings().count(), 1);
        assert_eq!(results.messages[0].field, ValidationField::DatabaseFile);

        std::fs::write(tmp.path().join("BaseStation.sqb"), b"").unwrap();
        assert!(config.validate_in(tmp.path()).is_empty());

        config.base_station.database_file_name = String::new();
        assert!(fields(&config.validate()).contains(&ValidationField::DatabaseFileName));
        config.base_station.auto_save_flights = false;
        assert!(!config.validate().has_errors());
    }

    #[test]
    fn test_access_lists() {
        let mut config = Configuration::default();
        config.web_server.internet_access.default_access = DefaultAccess::Allow;
        let results = config.validate();
        assert!(!results.has_errors());
        assert_eq!(results.for_field(ValidationField::AccessList).count(), 1);

        config.web_server.internet_access.addresses =
            vec!["192.168.0.0/16".into(), "10.0.0.300".into(), "::1/129".into()];
        let results = config.validate();
        assert_eq!(results.for_field(ValidationField::AccessAddress).count(), 2);
    }

    #[test]
    fn test_bad_addresses_reported_on_unused_access_lists() {
        let mut config = Configuration::default();
        config.receivers[0].is_passive = false;
        config.receivers[0].access.addresses = vec!["10.0.0.0/40".into()];
        config.receivers[0].access.default_access = DefaultAccess::Deny;
        let server = config.add_rebroadcast_server("Feed").unwrap();
        server.enabled = false;
        server.access.default_access = DefaultAccess::Allow;
        server.access.addresses = vec!["not-an-address".into()];

        let results = config.validate();
        assert_eq!(results.for_field(ValidationField::AccessAddress).count(), 2);

        config.receivers[0].access.addresses.clear();
        config.rebroadcast_servers[0].access.addresses.clear();
        let results = config.validate();
        assert_eq!(results.for_field(ValidationField::AccessList).count(), 0);
    }

    #[test]
    fn test_cidr_parsing() {
        assert!(is_valid_cidr("10.0.0.1"));
        assert!(is_valid_cidr("10.0.0.0/8"));
        assert!(is_valid_cidr("fe80::/10"));
        assert!(!is_valid_cidr("10.0.0.0/33"));
        assert!(!is_valid_cidr("example.com"));
        assert!(!is_valid_cidr("10.0.0.0/"));
    }
}
