//! Configuration records
//!
//! Every record deserializes with `#[serde(default)]` so older settings
//! files keep loading after fields are added.

use serde::{Deserialize, Serialize};

use super::user::User;

/// Format of the feed a receiver listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Port30003,
    Sbs3,
    Beast,
    CompressedVrs,
    AircraftListJson,
    PlaneFinder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Tcp,
    Com,
}

/// Where a receiver's or merged feed's aircraft may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverUsage {
    #[default]
    Normal,
    HideFromWebSite,
    MergeOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RebroadcastFormat {
    #[default]
    Passthrough,
    Port30003,
    Avr,
    CompressedVrs,
    AircraftListJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAccess {
    #[default]
    Unrestricted,
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Handshake {
    #[default]
    None,
    XonXoff,
    RequestToSend,
    RequestToSendXonXoff,
}

/// Address-based access restrictions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Access {
    pub default_access: DefaultAccess,
    /// CIDR blocks, e.g. `192.168.0.0/16`
    pub addresses: Vec<String>,
}

/// A single feed of aircraft messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receiver {
    pub unique_id: i32,
    pub name: String,
    pub enabled: bool,
    pub data_source: DataSource,
    pub connection_type: ConnectionType,
    pub address: String,
    pub port: i32,
    pub use_keep_alive: bool,
    /// Zero disables the idle timeout
    pub idle_timeout_milliseconds: i32,
    pub com_port: Option<String>,
    pub baud_rate: i32,
    pub data_bits: i32,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub handshake: Handshake,
    pub receiver_location_id: Option<i32>,
    /// Listen for an inbound connection instead of dialling out
    pub is_passive: bool,
    pub access: Access,
    pub receiver_usage: ReceiverUsage,
}

impl Default for Receiver {
    fn default() -> Self {
        Self {
            unique_id: 0,
            name: String::new(),
            enabled: true,
            data_source: DataSource::Port30003,
            connection_type: ConnectionType::Tcp,
            address: "127.0.0.1".to_string(),
            port: 30003,
            use_keep_alive: true,
            idle_timeout_milliseconds: 60_000,
            com_port: None,
            baud_rate: 115_200,
            data_bits: 8,
            stop_bits: StopBits::One,
            parity: Parity::None,
            handshake: Handshake::None,
            receiver_location_id: None,
            is_passive: false,
            access: Access::default(),
            receiver_usage: ReceiverUsage::Normal,
        }
    }
}

/// Several receivers combined into one aircraft list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergedFeed {
    pub unique_id: i32,
    pub name: String,
    pub enabled: bool,
    pub receiver_ids: Vec<i32>,
    /// Receivers whose positions come from MLAT; subset of `receiver_ids`
    pub mlat_receiver_ids: Vec<i32>,
    pub ice_period_milliseconds: i32,
    pub receiver_usage: ReceiverUsage,
}

impl Default for MergedFeed {
    fn default() -> Self {
        Self {
            unique_id: 0,
            name: String::new(),
            enabled: true,
            receiver_ids: Vec::new(),
            mlat_receiver_ids: Vec::new(),
            ice_period_milliseconds: 3_000,
            receiver_usage: ReceiverUsage::Normal,
        }
    }
}

/// A server that re-publishes a receiver or merged feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebroadcastSettings {
    pub unique_id: i32,
    pub name: String,
    pub enabled: bool,
    /// Receiver or merged feed id
    pub receiver_id: i32,
    pub format: RebroadcastFormat,
    /// Connect out to `transmit_address` rather than listening
    pub is_transmitter: bool,
    pub transmit_address: String,
    pub port: i32,
    pub use_keep_alive: bool,
    pub idle_timeout_milliseconds: i32,
    pub stale_seconds: i32,
    pub access: Access,
}

impl Default for RebroadcastSettings {
    fn default() -> Self {
        Self {
            unique_id: 0,
            name: String::new(),
            enabled: true,
            receiver_id: 0,
            format: RebroadcastFormat::Passthrough,
            is_transmitter: false,
            transmit_address: String::new(),
            port: 33001,
            use_keep_alive: true,
            idle_timeout_milliseconds: 30_000,
            stale_seconds: 3,
            access: Access::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverLocation {
    pub unique_id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_base_station_location: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebServerSettings {
    pub port: i32,
    pub basic_authentication: bool,
    pub enable_upnp: bool,
    pub upnp_port: i32,
    pub internet_access: Access,
}

impl Default for WebServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            basic_authentication: false,
            enable_upnp: false,
            upnp_port: 80,
            internet_access: Access::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleMapSettings {
    pub initial_latitude: f64,
    pub initial_longitude: f64,
    pub initial_zoom: i32,
    pub initial_map_type: String,
    pub initial_refresh_seconds: i32,
    pub minimum_refresh_seconds: i32,
    pub short_trail_length_seconds: i32,
    pub server_api_key: Option<String>,
}

impl Default for GoogleMapSettings {
    fn default() -> Self {
        Self {
            initial_latitude: 51.47,
            initial_longitude: -0.46,
            initial_zoom: 11,
            initial_map_type: "roadmap".to_string(),
            initial_refresh_seconds: 1,
            minimum_refresh_seconds: 1,
            short_trail_length_seconds: 30,
            server_api_key: None,
        }
    }
}

/// Flight-log database options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStationSettings {
    /// Relative paths resolve against the project root
    pub database_file_name: String,
    pub auto_save_flights: bool,
    pub display_timeout_seconds: i32,
    pub tracking_timeout_seconds: i32,
    pub operator_flags_folder: Option<String>,
    pub silhouettes_folder: Option<String>,
    pub pictures_folder: Option<String>,
}

impl Default for BaseStationSettings {
    fn default() -> Self {
        Self {
            database_file_name: "BaseStation.sqb".to_string(),
            auto_save_flights: true,
            display_timeout_seconds: 30,
            tracking_timeout_seconds: 600,
            operator_flags_folder: None,
            silhouettes_folder: None,
            pictures_folder: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightRouteSettings {
    pub auto_update_enabled: bool,
    pub update_interval_hours: i32,
}

impl Default for FlightRouteSettings {
    fn default() -> Self {
        Self {
            auto_update_enabled: true,
            update_interval_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enabled: bool,
    pub voice_name: Option<String>,
    /// -10 (slowest) to 10 (fastest)
    pub voice_rate: i32,
}

/// Message decoder tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDecodingSettings {
    pub receiver_range_km: i32,
    pub suppress_receiver_range_check: bool,
    pub airborne_global_position_limit_seconds: i32,
    pub fast_surface_global_position_limit_seconds: i32,
    pub slow_surface_global_position_limit_seconds: i32,
    pub ignore_military_extended_squitter: bool,
}

impl Default for RawDecodingSettings {
    fn default() -> Self {
        Self {
            receiver_range_km: 650,
            suppress_receiver_range_check: false,
            airborne_global_position_limit_seconds: 10,
            fast_surface_global_position_limit_seconds: 25,
            slow_surface_global_position_limit_seconds: 50,
            ignore_military_extended_squitter: false,
        }
    }
}

/// What remote (internet) visitors to the web site may do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternetClientSettings {
    pub can_run_reports: bool,
    pub can_show_pin_text: bool,
    pub can_show_pictures: bool,
    pub allow_audio: bool,
    /// Zero disables the timeout
    pub timeout_minutes: i32,
}

impl Default for InternetClientSettings {
    fn default() -> Self {
        Self {
            can_run_reports: false,
            can_show_pin_text: true,
            can_show_pictures: true,
            allow_audio: false,
            timeout_minutes: 20,
        }
    }
}

/// The whole settings graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub version: u32,
    pub receivers: Vec<Receiver>,
    pub merged_feeds: Vec<MergedFeed>,
    pub rebroadcast_servers: Vec<RebroadcastSettings>,
    pub receiver_locations: Vec<ReceiverLocation>,
    pub users: Vec<User>,
    pub web_server: WebServerSettings,
    pub google_map: GoogleMapSettings,
    pub base_station: BaseStationSettings,
    pub flight_route: FlightRouteSettings,
    pub audio: AudioSettings,
    pub raw_decoding: RawDecodingSettings,
    pub internet_client: InternetClientSettings,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: 1,
            receivers: vec![Receiver {
                unique_id: 1,
                name: "Receiver".to_string(),
                ..Receiver::default()
            }],
            merged_feeds: Vec::new(),
            rebroadcast_servers: Vec::new(),
            receiver_locations: Vec::new(),
            users: Vec::new(),
            web_server: WebServerSettings::default(),
            google_map: GoogleMapSettings::default(),
            base_station: BaseStationSettings::default(),
            flight_route: FlightRouteSettings::default(),
            audio: AudioSettings::default(),
            raw_decoding: RawDecodingSettings::default(),
            internet_client: InternetClientSettings::default(),
        }
    }
}
