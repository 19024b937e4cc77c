//! The note message model.
//!
//! A [`NoteRequest`] is the unit of delivery: who played (`originator`), what
//! happened (`event_type`), and the [`Note`] itself.  Both types are immutable
//! once built; the transports only ever read and serialize them.
//!
//! # Value ranges
//!
//! - [`Pitch`] is a MIDI note number, `0..=127` (middle C is 60).
//! - [`Velocity`] is normalized to `0.0..=1.0`.  Devices report 7-bit values
//!   (`0..=127`) which are scaled by `1/127`.  When velocity reporting is off,
//!   or the event came from a click, the fixed value [`Velocity::FIXED`]
//!   (`1.0`) is used.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a note number is outside the MIDI range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("pitch {0} is out of range (0..=127)")]
pub struct PitchError(pub u8);

/// Error returned when a velocity is not a finite value within `0.0..=1.0`.
#[derive(Debug, Error, PartialEq)]
#[error("velocity {0} is out of range (0.0..=1.0)")]
pub struct VelocityError(pub f32);

// ── Pitch ─────────────────────────────────────────────────────────────────────

/// A MIDI note number in `0..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pitch(u8);

impl Pitch {
    /// Highest valid note number.
    pub const MAX: u8 = 127;

    /// Creates a pitch, rejecting values above [`Pitch::MAX`].
    ///
    /// # Errors
    ///
    /// Returns [`PitchError`] when `value > 127`.
    pub fn new(value: u8) -> Result<Self, PitchError> {
        if value > Self::MAX {
            Err(PitchError(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Builds a pitch from a 7-bit MIDI data byte, ignoring the high bit.
    pub fn from_7bit(byte: u8) -> Self {
        Self(byte & 0x7F)
    }

    /// Returns the raw note number.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Pitch {
    type Error = PitchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pitch> for u8 {
    fn from(p: Pitch) -> Self {
        p.0
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Velocity ──────────────────────────────────────────────────────────────────

/// Normalized key velocity in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Velocity(f32);

impl Velocity {
    /// Sentinel used when no device velocity is reported.
    pub const FIXED: Velocity = Velocity(1.0);

    /// # Errors
    ///
    /// Returns [`VelocityError`] for NaN, infinities, and values outside
    /// `0.0..=1.0`.
    pub fn new(value: f32) -> Result<Self, VelocityError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(VelocityError(value))
        }
    }

    /// Scales a 7-bit MIDI velocity (`0..=127`) into `0.0..=1.0`.
    pub fn from_7bit(byte: u8) -> Self {
        Self(f32::from(byte & 0x7F) / 127.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::FIXED
    }
}

impl TryFrom<f32> for Velocity {
    type Error = VelocityError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Velocity> for f32 {
    fn from(v: Velocity) -> Self {
        v.0
    }
}

// ── EventType ─────────────────────────────────────────────────────────────────

/// What happened to the note.
///
/// `Join` is part of the wire vocabulary (a session-join announcement) but no
/// code path produces or delivers it; see [`EventType::is_supported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    On,
    Off,
    Join,
}

impl EventType {
    /// Returns `true` for event types the transports will deliver.
    pub fn is_supported(self) -> bool {
        matches!(self, EventType::On | EventType::Off)
    }

    /// Wire name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::On => "ON",
            EventType::Off => "OFF",
            EventType::Join => "JOIN",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Note / NoteRequest ────────────────────────────────────────────────────────

/// A single sounded note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    instrument: String,
    pitch: Pitch,
    velocity: Velocity,
}

impl Note {
    pub fn new(instrument: impl Into<String>, pitch: Pitch, velocity: Velocity) -> Self {
        Self {
            instrument: instrument.into(),
            pitch,
            velocity,
        }
    }

    /// Free-form instrument name chosen by the player.
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }
}

/// A note event addressed to the remote listener.
///
/// On the wire the originator is `playerName` and the event type is `type`:
///
/// ```json
/// {"playerName":"ana","type":"ON","note":{"instrument":"piano","pitch":60,"velocity":1.0}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRequest {
    #[serde(rename = "playerName")]
    originator: String,
    #[serde(rename = "type")]
    event_type: EventType,
    note: Note,
}

impl NoteRequest {
    pub fn new(originator: impl Into<String>, event_type: EventType, note: Note) -> Self {
        Self {
            originator: originator.into(),
            event_type,
            note,
        }
    }

    /// Player identity; may be empty.
    pub fn originator(&self) -> &str {
        &self.originator
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn note(&self) -> &Note {
        &self.note
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
