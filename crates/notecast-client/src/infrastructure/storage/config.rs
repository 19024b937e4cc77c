//! TOML-based configuration persistence for the client.
//!
//! Reads and writes [`ClientConfig`] to the platform-appropriate config file
//! unless an explicit path is given:
//! - Windows:  `%APPDATA%\Notecast\config.toml`
//! - Linux:    `~/.config/notecast/config.toml`
//! - macOS:    `~/Library/Application Support/Notecast/config.toml`
//!
//! Example:
//!
//! ```toml
//! [player]
//! name = "ana"
//! instrument = "piano"
//! send_velocity = true
//!
//! [transport]
//! active = "websocket"
//! websocket_endpoint = "ws://192.168.1.20:9000"
//! http_endpoint = "http://192.168.1.20:8080/notes"
//! connect_on_start = true
//!
//! [midi]
//! enabled = true
//! client_name = "notecast"
//! poll_interval_ms = 2000
//!
//! [client]
//! log_level = "info"
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section, or
//! a config written by an older version all load cleanly.

use std::path::{Path, PathBuf};

use notecast_core::{PlayerSettings, TransportConfiguration, TransportKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub client: GeneralConfig,
}

/// Who is playing and how notes are described.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerConfig {
    /// Sent as `playerName`; may be empty.
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_instrument")]
    pub instrument: String,
    /// Forward device velocity instead of the fixed 1.0.
    #[serde(default)]
    pub send_velocity: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    /// `"websocket"` or `"http"`.
    #[serde(default)]
    pub active: TransportKind,
    #[serde(default)]
    pub websocket_endpoint: String,
    #[serde(default)]
    pub http_endpoint: String,
    /// Open the WebSocket at startup instead of waiting for `connect`.
    #[serde(default)]
    pub connect_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MidiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Name this program registers with the MIDI system.
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// How often the device list is rescanned.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_instrument() -> String {
    "piano".to_string()
}
fn default_true() -> bool {
    true
}
fn default_client_name() -> String {
    "notecast".to_string()
}
fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            instrument: default_instrument(),
            send_velocity: false,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            active: TransportKind::default(),
            websocket_endpoint: String::new(),
            http_endpoint: String::new(),
            connect_on_start: false,
        }
    }
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            client_name: default_client_name(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            originator: self.player.name.clone(),
            instrument: self.player.instrument.clone(),
            report_velocity: self.player.send_velocity,
        }
    }

    pub fn transport_configuration(&self) -> TransportConfiguration {
        TransportConfiguration::new(
            self.transport.active,
            self.transport.websocket_endpoint.clone(),
            self.transport.http_endpoint.clone(),
        )
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

fn resolve(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => config_file_path(),
    }
}

/// Loads [`ClientConfig`] from `path` (or the default location), returning
/// `ClientConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let path = resolve(path)?;

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Writes `config` to `path` (or the default location), creating the parent
/// directory if needed.  Returns the path written.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &ClientConfig, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = resolve(path)?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Notecast"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("notecast"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Notecast")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("notecast-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn test_default_config_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.player.name, "");
        assert_eq!(cfg.player.instrument, "piano");
        assert!(!cfg.player.send_velocity);
        assert_eq!(cfg.transport.active, TransportKind::Persistent);
        assert!(!cfg.transport.connect_on_start);
        assert!(cfg.midi.enabled);
        assert_eq!(cfg.midi.poll_interval_ms, 2000);
        assert_eq!(cfg.client.log_level, "info");
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let cfg: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_toml_fills_missing_fields() {
        // Arrange
        let text = r#"
            [player]
            name = "ana"

            [transport]
            active = "http"
            http_endpoint = "http://h:8080/notes"
        "#;

        // Act
        let cfg: ClientConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.player.name, "ana");
        assert_eq!(cfg.player.instrument, "piano");
        assert_eq!(cfg.transport.active, TransportKind::OneShot);
        assert_eq!(cfg.transport.websocket_endpoint, "");
        assert_eq!(cfg.midi, MidiConfig::default());
    }

    #[test]
    fn test_unknown_transport_is_a_parse_error() {
        let result: Result<ClientConfig, _> = toml::from_str("[transport]\nactive = \"smoke\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_toml_round_trip() {
        // Arrange
        let mut cfg = ClientConfig::default();
        cfg.player.name = "bo".to_string();
        cfg.player.send_velocity = true;
        cfg.transport.active = TransportKind::OneShot;
        cfg.transport.websocket_endpoint = "ws://h:9000".to_string();
        cfg.midi.enabled = false;

        // Act
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: ClientConfig = toml::from_str(&text).unwrap();

        // Assert
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_save_then_load_from_explicit_path() {
        // Arrange
        let path = scratch_path("save-load");
        let mut cfg = ClientConfig::default();
        cfg.player.instrument = "harp".to_string();

        // Act
        let written = save_config(&cfg, Some(&path)).unwrap();
        let loaded = load_config(Some(&path)).unwrap();

        // Assert
        assert_eq!(written, path);
        assert_eq!(loaded, cfg);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let path = scratch_path("missing");
        assert_eq!(load_config(Some(&path)).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let path = scratch_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "this is = = not toml").unwrap();

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_conversions_to_domain_types() {
        let mut cfg = ClientConfig::default();
        cfg.player.name = "ana".to_string();
        cfg.transport.http_endpoint = "http://h".to_string();

        let settings = cfg.player_settings();
        let transport = cfg.transport_configuration();

        assert_eq!(settings.originator, "ana");
        assert_eq!(transport.active(), TransportKind::Persistent);
        assert_eq!(transport.address(TransportKind::OneShot), Some("http://h"));
        assert_eq!(transport.address(TransportKind::Persistent), None);
    }
}
