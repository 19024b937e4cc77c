//! The client event loop.
//!
//! Everything that mutates the [`Session`] happens here, one event at a time,
//! on a single task:
//!
//! ```text
//!  midir callback thread ──DeviceEvent──┐
//!  websocket task ──────TransportEvent──┤
//!  stdin thread ───────────console line─┼──▶ select! ──▶ Session
//!  rescan interval ───────────────tick──┤
//!  Ctrl+C ──────────────────────────────┘
//!  ActivityLog ──────────LogEntry──────────▶ stdout
//! ```
//!
//! Transports and device callbacks never touch the session directly; they
//! post to channels and the loop applies their results in arrival order.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::activity::{ActivityLog, LogEntry};
use crate::application::commands::parse_command;
use crate::application::deliver::TransportSelector;
use crate::application::devices::DeviceRegistry;
use crate::application::session::{Flow, Session};
use crate::infrastructure::http::{HttpTransport, ReqwestClient};
use crate::infrastructure::midi_input::MidirDeviceSource;
use crate::infrastructure::storage::ClientConfig;
use crate::infrastructure::websocket::WebSocketTransport;

/// Lower bound on the device rescan period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long shutdown waits for the WebSocket close handshake.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Runs the client until `quit`, Ctrl+C, or a fatal error.
///
/// # Errors
///
/// Returns an error if the Ctrl+C handler cannot be installed.
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let (log, mut log_rx) = ActivityLog::channel();
    let (transport_tx, mut transport_rx) = mpsc::unbounded_channel();
    let (device_tx, mut device_rx) = mpsc::unbounded_channel();

    let selector = TransportSelector::new(
        config.transport_configuration(),
        Box::new(WebSocketTransport::new(transport_tx, log.clone())),
        Box::new(HttpTransport::new(Arc::new(ReqwestClient::new()), log.clone())),
        log.clone(),
    );

    let devices = config.midi.enabled.then(|| {
        DeviceRegistry::new(
            Box::new(MidirDeviceSource::new(config.midi.client_name.clone())),
            device_tx,
        )
    });

    let mut session = Session::new(config.player_settings(), selector, devices, log.clone());

    session.refresh_devices(true);
    if config.transport.connect_on_start {
        session.connect();
    }

    let mut console = spawn_console_reader();
    let mut console_open = true;

    let poll = Duration::from_millis(config.midi.poll_interval_ms).max(MIN_POLL_INTERVAL);
    let mut rescan = tokio::time::interval(poll);
    rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the startup scan already ran.
    rescan.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("notecast ready; type 'help' for commands");

    loop {
        tokio::select! {
            Some(entry) = log_rx.recv() => print_entry(&entry),

            Some(event) = device_rx.recv() => session.on_device_event(event),

            Some(event) = transport_rx.recv() => session.on_transport_event(event),

            line = console.recv(), if console_open => match line {
                Some(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_command(&line) {
                        Ok(command) => {
                            if session.apply(command) == Flow::Quit {
                                break;
                            }
                        }
                        Err(e) => log.command_error(e),
                    }
                }
                None => {
                    console_open = false;
                    info!("console input closed; still forwarding device input");
                }
            },

            _ = rescan.tick(), if session.has_devices() => session.refresh_devices(false),

            signal = &mut shutdown => {
                signal.context("failed to listen for Ctrl+C")?;
                info!("received Ctrl+C; shutting down");
                break;
            }
        }
    }

    if let Some(task) = session.shutdown() {
        if tokio::time::timeout(CLOSE_GRACE, task).await.is_err() {
            debug!("websocket close did not finish in time");
        }
    }

    while let Ok(entry) = log_rx.try_recv() {
        print_entry(&entry);
    }
    Ok(())
}

fn print_entry(entry: &LogEntry) {
    println!("{entry}");
}

/// Reads stdin lines on a dedicated OS thread.
///
/// A blocking read inside the runtime would hold up shutdown until the user
/// pressed Enter; a detached thread does not.
fn spawn_console_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("notecast-console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("failed to read console input: {e}");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!("console input unavailable: {e}");
    }
    rx
}
