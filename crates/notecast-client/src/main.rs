//! notecast client entry point.
//!
//! Forwards notes played on MIDI keyboards (or typed on the console) to a
//! remote listener, over a WebSocket or as HTTP POSTs.
//!
//! # Usage
//!
//! ```text
//! notecast [OPTIONS]
//!
//! Options:
//!   --config <PATH>              Config file [default: platform config dir]
//!   --player <NAME>              Player name sent with every note
//!   --instrument <NAME>          Instrument name sent with every note
//!   --send-velocity              Forward MIDI velocity instead of 1.0
//!   --transport <websocket|http> Active transport
//!   --websocket-endpoint <URL>   WebSocket address (ws://host:port)
//!   --http-endpoint <URL>        HTTP POST address
//!   --connect                    Connect the WebSocket at startup
//!   --no-midi                    Do not open MIDI inputs
//!   --log-level <LEVEL>          Diagnostic level when RUST_LOG is unset
//!   --save-config                Write the merged settings back to the config file
//! ```
//!
//! # Precedence
//!
//! CLI flag, then `NOTECAST_*` environment variable, then config file, then
//! built-in default.
//!
//! | Variable                      | Overrides                       |
//! |-------------------------------|---------------------------------|
//! | `NOTECAST_CONFIG`             | config file path                |
//! | `NOTECAST_PLAYER`             | `player.name`                   |
//! | `NOTECAST_INSTRUMENT`         | `player.instrument`             |
//! | `NOTECAST_SEND_VELOCITY`      | `player.send_velocity`          |
//! | `NOTECAST_TRANSPORT`          | `transport.active`              |
//! | `NOTECAST_WEBSOCKET_ENDPOINT` | `transport.websocket_endpoint`  |
//! | `NOTECAST_HTTP_ENDPOINT`      | `transport.http_endpoint`       |
//! | `NOTECAST_CONNECT`            | `transport.connect_on_start`    |
//! | `NOTECAST_NO_MIDI`            | `midi.enabled` (set to false)   |
//! | `NOTECAST_LOG_LEVEL`          | `client.log_level`              |
//!
//! The activity log goes to stdout; `tracing` diagnostics go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use notecast_client::infrastructure::run;
use notecast_client::infrastructure::storage::{load_config, save_config, ClientConfig};
use notecast_core::TransportKind;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Forward MIDI and console key presses to a remote listener.
#[derive(Debug, Parser)]
#[command(
    name = "notecast",
    about = "Forward MIDI and console key presses over WebSocket or HTTP",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, env = "NOTECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Player name sent as `playerName`.
    #[arg(long, env = "NOTECAST_PLAYER")]
    player: Option<String>,

    #[arg(long, env = "NOTECAST_INSTRUMENT")]
    instrument: Option<String>,

    /// Forward device velocity instead of the fixed 1.0.
    #[arg(long, env = "NOTECAST_SEND_VELOCITY")]
    send_velocity: bool,

    /// Active transport: `websocket` or `http`.
    #[arg(long, env = "NOTECAST_TRANSPORT")]
    transport: Option<TransportKind>,

    #[arg(long, env = "NOTECAST_WEBSOCKET_ENDPOINT")]
    websocket_endpoint: Option<String>,

    #[arg(long, env = "NOTECAST_HTTP_ENDPOINT")]
    http_endpoint: Option<String>,

    /// Open the WebSocket at startup.
    #[arg(long, env = "NOTECAST_CONNECT")]
    connect: bool,

    /// Do not open MIDI inputs (console only).
    #[arg(long, env = "NOTECAST_NO_MIDI")]
    no_midi: bool,

    #[arg(long, env = "NOTECAST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write the merged configuration back to the config file.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    /// Layers the flags that were given on top of `config`.
    fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(name) = &self.player {
            config.player.name = name.clone();
        }
        if let Some(instrument) = &self.instrument {
            config.player.instrument = instrument.clone();
        }
        if self.send_velocity {
            config.player.send_velocity = true;
        }
        if let Some(kind) = self.transport {
            config.transport.active = kind;
        }
        if let Some(endpoint) = &self.websocket_endpoint {
            config.transport.websocket_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.http_endpoint {
            config.transport.http_endpoint = endpoint.clone();
        }
        if self.connect {
            config.transport.connect_on_start = true;
        }
        if self.no_midi {
            config.midi.enabled = false;
        }
        if let Some(level) = &self.log_level {
            config.client.log_level = level.clone();
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// A current-thread runtime is enough: the event loop handles one event at a
/// time and all network waits happen in spawned tasks on the same thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins; otherwise the configured level.  Diagnostics go to
    // stderr so stdout carries only the activity log.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.save_config {
        let path = save_config(&config, cli.config.as_deref())
            .context("failed to save configuration")?;
        info!("configuration saved to {}", path.display());
    }

    info!(
        "notecast starting: transport={}, websocket={:?}, http={:?}, midi={}",
        config.transport.active,
        config.transport.websocket_endpoint,
        config.transport.http_endpoint,
        config.midi.enabled
    );

    run(config).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        // Arrange: parse with no arguments
        let cli = Cli::parse_from(["notecast"]);
        let mut config = ClientConfig::default();

        // Act
        cli.apply_overrides(&mut config);

        // Assert
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_cli_transport_override() {
        let cli = Cli::parse_from(["notecast", "--transport", "http"]);
        assert_eq!(cli.transport, Some(TransportKind::OneShot));
    }

    #[test]
    fn test_cli_invalid_transport_is_rejected() {
        let result = Cli::try_parse_from(["notecast", "--transport", "smoke-signals"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_are_layered_on_config() {
        // Arrange
        let cli = Cli::parse_from([
            "notecast",
            "--player",
            "ana",
            "--instrument",
            "organ",
            "--send-velocity",
            "--websocket-endpoint",
            "ws://10.0.0.5:9000",
            "--connect",
            "--no-midi",
        ]);
        let mut config = ClientConfig::default();
        config.transport.http_endpoint = "http://kept".to_string();

        // Act
        cli.apply_overrides(&mut config);

        // Assert
        assert_eq!(config.player.name, "ana");
        assert_eq!(config.player.instrument, "organ");
        assert!(config.player.send_velocity);
        assert_eq!(config.transport.websocket_endpoint, "ws://10.0.0.5:9000");
        assert_eq!(config.transport.http_endpoint, "http://kept");
        assert!(config.transport.connect_on_start);
        assert!(!config.midi.enabled);
    }

    #[test]
    fn test_every_setting_flag_has_an_env_fallback() {
        // Arrange
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|name| name.to_string_lossy().into_owned())
        };

        // Assert
        assert_eq!(env_of("connect").as_deref(), Some("NOTECAST_CONNECT"));
        assert_eq!(env_of("no_midi").as_deref(), Some("NOTECAST_NO_MIDI"));
        assert_eq!(env_of("send_velocity").as_deref(), Some("NOTECAST_SEND_VELOCITY"));
        assert_eq!(env_of("transport").as_deref(), Some("NOTECAST_TRANSPORT"));
    }

    #[test]
    fn test_cli_log_level_override() {
        let cli = Cli::parse_from(["notecast", "--log-level", "debug"]);
        let mut config = ClientConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.client.log_level, "debug");
    }
}
