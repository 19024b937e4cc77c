//! Decoding of raw MIDI channel messages into note events.
//!
//! Only note-on (`0x9n`) and note-off (`0x8n`) are of interest.  A note-on
//! with velocity 0 is the running-status idiom for note-off and is reported
//! as [`EventType::Off`].

use tracing::trace;

use crate::domain::note::{EventType, Pitch, Velocity};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

/// A note event reported by an input device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceNoteEvent {
    pub kind: EventType,
    pub pitch: Pitch,
    /// Velocity as reported by the device, scaled into `0.0..=1.0`.
    pub velocity: Velocity,
}

/// Decodes one MIDI message.  Returns `None` for anything that is not a
/// complete note-on or note-off.
pub fn decode_midi(bytes: &[u8]) -> Option<DeviceNoteEvent> {
    let (&status, data) = bytes.split_first()?;
    let (&note, rest) = data.split_first()?;
    let &velocity = rest.first()?;

    let kind = match status & 0xF0 {
        NOTE_ON if velocity & 0x7F > 0 => EventType::On,
        NOTE_ON | NOTE_OFF => EventType::Off,
        _ => {
            trace!("ignoring MIDI status {status:#04x}");
            return None;
        }
    };

    Some(DeviceNoteEvent {
        kind,
        pitch: Pitch::from_7bit(note),
        velocity: Velocity::from_7bit(velocity),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
