//! Keyboard note names such as `C4`, `F#3`, or `Bb2`.
//!
//! The octave numbering places middle C at `C4` = 60, so `C-1` is note 0 and
//! `G9` is note 127.  A plain number (`"60"`) is also accepted and taken as
//! the note number directly.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::note::Pitch;

/// Errors produced while parsing a key name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyNameError {
    #[error("key name is empty")]
    Empty,

    /// The text is neither a note name nor a note number.
    #[error("unrecognised key name '{0}' (expected e.g. C4, F#3, Bb2 or 60)")]
    Invalid(String),

    /// The name is well formed but lands outside `0..=127`.
    #[error("key '{0}' is outside the MIDI note range")]
    OutOfRange(String),
}

/// A parsed key name, resolved to its [`Pitch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyName {
    pitch: Pitch,
}

impl KeyName {
    pub fn pitch(self) -> Pitch {
        self.pitch
    }
}

impl From<Pitch> for KeyName {
    fn from(pitch: Pitch) -> Self {
        Self { pitch }
    }
}

impl FromStr for KeyName {
    type Err = KeyNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(KeyNameError::Empty);
        }

        if text.bytes().all(|b| b.is_ascii_digit()) {
            let n: u16 = text
                .parse()
                .map_err(|_| KeyNameError::OutOfRange(text.to_string()))?;
            return to_pitch(i32::from(n), text);
        }

        let mut chars = text.chars();
        let letter = chars
            .next()
            .ok_or(KeyNameError::Empty)?
            .to_ascii_uppercase();
        let base: i32 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(KeyNameError::Invalid(text.to_string())),
        };

        let rest = chars.as_str();
        let (shift, octave_text) = match rest.chars().next() {
            Some('#') => (1, &rest[1..]),
            Some('b') => (-1, &rest[1..]),
            _ => (0, rest),
        };

        let octave: i32 = octave_text
            .parse()
            .map_err(|_| KeyNameError::Invalid(text.to_string()))?;
        if !(-1..=9).contains(&octave) {
            return Err(KeyNameError::OutOfRange(text.to_string()));
        }

        to_pitch((octave + 1) * 12 + base + shift, text)
    }
}

fn to_pitch(number: i32, text: &str) -> Result<KeyName, KeyNameError> {
    u8::try_from(number)
        .ok()
        .and_then(|n| Pitch::new(n).ok())
        .map(KeyName::from)
        .ok_or_else(|| KeyNameError::OutOfRange(text.to_string()))
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        let n = i32::from(self.pitch.value());
        write!(f, "{}{}", NAMES[(n % 12) as usize], n / 12 - 1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
