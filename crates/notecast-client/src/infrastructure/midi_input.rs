//! MIDI device input via `midir`.
//!
//! Devices are identified by port name.  Listing reuses one long-lived
//! `MidiInput` client across rescans.  `MidiInput::connect` consumes its
//! client, so each subscription opens its own and looks the port up by name.
//! The note callback runs on midir's own thread and forwards decoded events
//! into the device channel.

use std::cell::RefCell;

use midir::{Ignore, MidiInput};
use notecast_core::{decode_midi, DeviceId};
use tracing::trace;

use crate::application::devices::{
    DeviceError, DeviceEvent, DeviceSink, DeviceSource, Subscription,
};

/// [`DeviceSource`] over the platform MIDI API.
pub struct MidirDeviceSource {
    client_name: String,
    /// Enumeration client, opened on the first successful `list`.  It stays
    /// unset while the backend cannot be opened, so each rescan retries.
    scanner: RefCell<Option<MidiInput>>,
}

impl MidirDeviceSource {
    /// `client_name` is how this program shows up in the system MIDI graph.
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            scanner: RefCell::new(None),
        }
    }

    fn open(&self) -> Result<MidiInput, DeviceError> {
        MidiInput::new(&self.client_name).map_err(|e| DeviceError::Backend(e.to_string()))
    }
}

impl DeviceSource for MidirDeviceSource {
    fn list(&self) -> Result<Vec<DeviceId>, DeviceError> {
        let mut scanner = self.scanner.borrow_mut();
        if scanner.is_none() {
            *scanner = Some(self.open()?);
        }
        let Some(input) = scanner.as_ref() else {
            return Ok(Vec::new());
        };
        Ok(input
            .ports()
            .iter()
            .filter_map(|port| input.port_name(port).ok())
            .map(DeviceId::new)
            .collect())
    }

    fn subscribe(&self, device: &DeviceId, sink: DeviceSink) -> Result<Subscription, DeviceError> {
        let mut input = self.open()?;
        input.ignore(Ignore::All);

        let port = input
            .ports()
            .into_iter()
            .find(|port| input.port_name(port).ok().as_deref() == Some(device.as_str()))
            .ok_or_else(|| DeviceError::NotFound(device.clone()))?;

        let id = device.clone();
        let connection = input
            .connect(
                &port,
                &format!("{}-in", self.client_name),
                move |_stamp, bytes, _| {
                    if let Some(note) = decode_midi(bytes) {
                        trace!(device = %id, ?note, "midi note");
                        let _ = sink.send(DeviceEvent {
                            device: id.clone(),
                            note,
                        });
                    }
                },
                (),
            )
            .map_err(|e| DeviceError::Connect {
                device: device.clone(),
                reason: e.to_string(),
            })?;

        Ok(Subscription::new(connection))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_source_opens_no_client() {
        let source = MidirDeviceSource::new("notecast-test");
        assert!(source.scanner.borrow().is_none());
    }

    #[test]
    fn test_list_keeps_one_client_across_rescans() {
        // Arrange
        let source = MidirDeviceSource::new("notecast-test");

        // Act
        let first = source.list();
        let second = source.list();

        // Assert: with a working backend the client stays open between scans;
        // without one nothing is cached and both scans report the failure
        match (first, second) {
            (Ok(_), Ok(_)) => assert!(source.scanner.borrow().is_some()),
            (Err(DeviceError::Backend(_)), Err(DeviceError::Backend(_))) => {
                assert!(source.scanner.borrow().is_none())
            }
            (first, second) => panic!("inconsistent scans: {first:?} / {second:?}"),
        }
    }
}
