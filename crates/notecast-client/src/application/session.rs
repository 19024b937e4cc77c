//! The client session: everything the event loop mutates.
//!
//! A [`Session`] is owned by exactly one task and handles one event to
//! completion before the next, so it needs no locking.  Device notes, console
//! commands, and transport completions all arrive here.

use notecast_core::{
    normalize, normalize_click, KeyName, NoteSource, PlayerSettings, TransportKind,
};
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::activity::ActivityLog;
use crate::application::commands::{Command, HELP};
use crate::application::deliver::{TransportEvent, TransportSelector};
use crate::application::devices::{DeviceEvent, DeviceRegistry};

/// Whether the event loop should keep running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    settings: PlayerSettings,
    selector: TransportSelector,
    devices: Option<DeviceRegistry>,
    /// Set while the device backend keeps failing, so the failure is
    /// reported once rather than on every rescan.
    devices_failed: bool,
    log: ActivityLog,
}

impl Session {
    /// `devices` is `None` when device input is disabled or unavailable.
    pub fn new(
        settings: PlayerSettings,
        selector: TransportSelector,
        devices: Option<DeviceRegistry>,
        log: ActivityLog,
    ) -> Self {
        Self {
            settings,
            selector,
            devices,
            devices_failed: false,
            log,
        }
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn selector(&self) -> &TransportSelector {
        &self.selector
    }

    pub fn has_devices(&self) -> bool {
        self.devices.is_some()
    }

    /// Forwards a note played on an input device.
    pub fn on_device_event(&mut self, event: DeviceEvent) {
        let source = NoteSource::Device {
            pitch: event.note.pitch,
            velocity: Some(event.note.velocity),
        };
        let request = normalize(&source, event.note.kind, &self.settings);
        self.selector.deliver(&request);
    }

    /// Forwards a key click.
    pub fn play_key(&mut self, key: KeyName) {
        let request = normalize_click(key.pitch(), &self.settings);
        self.selector.deliver(&request);
    }

    pub fn on_transport_event(&mut self, event: TransportEvent) {
        self.selector.on_transport_event(event);
    }

    pub fn connect(&mut self) {
        self.selector.connect();
    }

    /// Rescans input devices.  The device list is written to the activity log
    /// when it changed, or always when `report` is set.  A backend failure is
    /// written once and again only when `report` is set; the next successful
    /// scan after a failure always lists the devices.
    pub fn refresh_devices(&mut self, report: bool) {
        let Some(registry) = self.devices.as_mut() else {
            if report {
                self.log.status("MIDI input is disabled.");
            }
            return;
        };

        match registry.refresh() {
            Ok(changes) => {
                let recovered = std::mem::take(&mut self.devices_failed);
                if report || recovered || changes.is_changed() {
                    self.log.devices(changes.summary());
                }
            }
            Err(e) => {
                if report || !self.devices_failed {
                    self.log.status(format!("MIDI input couldn't be enabled: {e}"));
                }
                self.devices_failed = true;
            }
        }
    }

    /// Applies one console command.
    pub fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::Play(key) => self.play_key(key),
            Command::Connect(address) => {
                if let Some(address) = address {
                    self.selector.set_address(TransportKind::Persistent, address);
                }
                self.selector.connect();
            }
            Command::Transport(kind) => {
                self.selector.select(kind);
                self.log.status(format!("Transport: {kind}"));
            }
            Command::Endpoint { kind, address } => {
                self.selector.set_address(kind, address);
                let shown = self.selector.config().address(kind).unwrap_or("(unset)");
                self.log.status(format!("{kind} endpoint: {shown}"));
            }
            Command::Player(name) => {
                self.settings.originator = name;
                self.log.status(format!("Player: {}", self.settings.originator));
            }
            Command::Instrument(instrument) => {
                self.settings.instrument = instrument;
                self.log.status(format!("Instrument: {}", self.settings.instrument));
            }
            Command::Velocity(on) => {
                self.settings.report_velocity = on;
                let state = if on { "on" } else { "off" };
                self.log.status(format!("Send velocity: {state}"));
            }
            Command::Devices => self.refresh_devices(true),
            Command::Status => self.log.status(self.describe()),
            Command::Help => self.log.status(HELP),
            Command::Quit => {
                info!("quit requested");
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Multi-line summary of the current settings.
    pub fn describe(&self) -> String {
        let config = self.selector.config();
        let endpoint = move |kind: TransportKind| config.address(kind).unwrap_or("(unset)");
        let subscribed: Vec<&str> = self
            .devices
            .iter()
            .flat_map(|r| r.subscribed())
            .map(|d| d.as_str())
            .collect();
        format!(
            "player: {:?}\ninstrument: {}\nsend velocity: {}\ntransport: {}\nwebsocket: {} [{:?}]\nhttp: {}\ninputs: {}",
            self.settings.originator,
            self.settings.instrument,
            self.settings.report_velocity,
            config.active(),
            endpoint(TransportKind::Persistent),
            self.selector.ready_state(),
            endpoint(TransportKind::OneShot),
            subscribed.join(", "),
        )
    }

    /// Releases the persistent connection.
    pub fn shutdown(&mut self) -> Option<JoinHandle<()>> {
        self.selector.shutdown()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
