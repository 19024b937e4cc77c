//! Event normalization: raw input → [`NoteRequest`].
//!
//! Input arrives from two places, an on-screen/console key click or a note
//! event from a physical device.  Both are reduced to the same request shape
//! here so the transports never need to know where a note came from.
//!
//! Normalization is total.  Key names are validated when they are parsed into
//! a [`KeyName`](crate::KeyName), before they reach this module.

use crate::domain::note::{EventType, Note, NoteRequest, Pitch, Velocity};

/// Where a note event came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteSource {
    /// A click on a named key; always sent with [`Velocity::FIXED`].
    UiClick { pitch: Pitch },
    /// A device note event.  `velocity` is `None` when the device did not
    /// report one.
    Device {
        pitch: Pitch,
        velocity: Option<Velocity>,
    },
}

/// Player-controlled settings consulted on every event.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Player identity sent as `playerName`; may be empty.
    pub originator: String,
    pub instrument: String,
    /// Forward device velocity instead of the fixed sentinel.
    pub report_velocity: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            originator: String::new(),
            instrument: "piano".to_string(),
            report_velocity: false,
        }
    }
}

/// Builds the [`NoteRequest`] for one input event.
///
/// The caller decides `event_type`; it is never inferred from the source.
pub fn normalize(source: &NoteSource, event_type: EventType, settings: &PlayerSettings) -> NoteRequest {
    let (pitch, velocity) = match *source {
        NoteSource::UiClick { pitch } => (pitch, Velocity::FIXED),
        NoteSource::Device { pitch, velocity } => {
            let velocity = match velocity {
                Some(v) if settings.report_velocity => v,
                _ => Velocity::FIXED,
            };
            (pitch, velocity)
        }
    };

    NoteRequest::new(
        settings.originator.clone(),
        event_type,
        Note::new(settings.instrument.clone(), pitch, velocity),
    )
}

/// Clicks only ever produce note-on.
pub fn normalize_click(pitch: Pitch, settings: &PlayerSettings) -> NoteRequest {
    normalize(&NoteSource::UiClick { pitch }, EventType::On, settings)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(report_velocity: bool) -> PlayerSettings {
        PlayerSettings {
            originator: "ana".to_string(),
            instrument: "piano".to_string(),
            report_velocity,
        }
    }

    #[test]
    fn test_click_preserves_pitch_with_fixed_velocity_for_all_pitches() {
        for n in 0..=127u8 {
            // Arrange
            let pitch = Pitch::new(n).unwrap();

            // Act
            let req = normalize_click(pitch, &settings(true));

            // Assert
            assert_eq!(req.note().pitch(), pitch);
            assert_eq!(req.note().velocity(), Velocity::FIXED);
            assert_eq!(req.event_type(), EventType::On);
        }
    }

    #[test]
    fn test_device_velocity_forwarded_when_reporting_enabled() {
        // Arrange
        let source = NoteSource::Device {
            pitch: Pitch::new(60).unwrap(),
            velocity: Some(Velocity::from_7bit(64)),
        };

        // Act
        let req = normalize(&source, EventType::On, &settings(true));

        // Assert
        assert_eq!(req.note().velocity(), Velocity::from_7bit(64));
    }

    #[test]
    fn test_device_velocity_replaced_when_reporting_disabled() {
        let source = NoteSource::Device {
            pitch: Pitch::new(60).unwrap(),
            velocity: Some(Velocity::from_7bit(64)),
        };

        let req = normalize(&source, EventType::On, &settings(false));

        assert_eq!(req.note().velocity(), Velocity::FIXED);
    }

    #[test]
    fn test_device_without_velocity_uses_fixed_even_when_reporting() {
        let source = NoteSource::Device {
            pitch: Pitch::new(60).unwrap(),
            velocity: None,
        };

        let req = normalize(&source, EventType::Off, &settings(true));

        assert_eq!(req.note().velocity(), Velocity::FIXED);
        assert_eq!(req.event_type(), EventType::Off);
    }

    #[test]
    fn test_settings_copied_into_request() {
        // Arrange
        let s = PlayerSettings {
            originator: String::new(),
            instrument: "marimba".to_string(),
            report_velocity: false,
        };

        // Act
        let req = normalize_click(Pitch::new(72).unwrap(), &s);

        // Assert
        assert_eq!(req.originator(), "");
        assert_eq!(req.note().instrument(), "marimba");
    }
}
