//! Transport selection and connection state.
//!
//! [`TransportConfiguration`] is read on every send and never cached by the
//! transports, so a change of active kind or address applies to the next
//! message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two delivery strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransportKind {
    /// Long-lived WebSocket connection.
    #[default]
    #[serde(rename = "websocket")]
    Persistent,
    /// One HTTP POST per message.
    #[serde(rename = "http")]
    OneShot,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Persistent => "websocket",
            TransportKind::OneShot => "http",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown transport '{0}' (expected 'websocket' or 'http')")]
pub struct ParseTransportKindError(pub String);

impl FromStr for TransportKind {
    type Err = ParseTransportKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "websocket" | "ws" => Ok(TransportKind::Persistent),
            "http" | "post" => Ok(TransportKind::OneShot),
            other => Err(ParseTransportKindError(other.to_string())),
        }
    }
}

/// Lifecycle of the persistent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    Connecting,
    Open,
    #[default]
    Closed,
}

/// Which transport is active and where each one sends.
///
/// Addresses are plain strings; an empty or whitespace-only address means
/// "not configured".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportConfiguration {
    active: TransportKind,
    persistent_address: String,
    one_shot_address: String,
}

impl TransportConfiguration {
    pub fn new(
        active: TransportKind,
        persistent_address: impl Into<String>,
        one_shot_address: impl Into<String>,
    ) -> Self {
        Self {
            active,
            persistent_address: persistent_address.into(),
            one_shot_address: one_shot_address.into(),
        }
    }

    pub fn active(&self) -> TransportKind {
        self.active
    }

    /// Switches the active kind.  Addresses are left untouched.
    pub fn set_active(&mut self, kind: TransportKind) {
        self.active = kind;
    }

    /// Returns the trimmed address for `kind`, or `None` when unset.
    pub fn address(&self, kind: TransportKind) -> Option<&str> {
        let raw = match kind {
            TransportKind::Persistent => &self.persistent_address,
            TransportKind::OneShot => &self.one_shot_address,
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Address of the currently active transport.
    pub fn active_address(&self) -> Option<&str> {
        self.address(self.active)
    }

    pub fn set_address(&mut self, kind: TransportKind, address: impl Into<String>) {
        let slot = match kind {
            TransportKind::Persistent => &mut self.persistent_address,
            TransportKind::OneShot => &mut self.one_shot_address,
        };
        *slot = address.into();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_persistent_with_no_addresses() {
        let cfg = TransportConfiguration::default();
        assert_eq!(cfg.active(), TransportKind::Persistent);
        assert_eq!(cfg.address(TransportKind::Persistent), None);
        assert_eq!(cfg.address(TransportKind::OneShot), None);
    }

    #[test]
    fn test_whitespace_address_counts_as_unset() {
        let cfg = TransportConfiguration::new(TransportKind::OneShot, "", "   ");
        assert_eq!(cfg.active_address(), None);
    }

    #[test]
    fn test_switching_back_and_forth_keeps_both_addresses() {
        // Arrange
        let mut cfg =
            TransportConfiguration::new(TransportKind::Persistent, "ws://a:1", "http://b:2");

        // Act
        for _ in 0..3 {
            cfg.set_active(TransportKind::OneShot);
            cfg.set_active(TransportKind::Persistent);
        }
        cfg.set_active(TransportKind::OneShot);

        // Assert
        assert_eq!(cfg.address(TransportKind::Persistent), Some("ws://a:1"));
        assert_eq!(cfg.address(TransportKind::OneShot), Some("http://b:2"));
        assert_eq!(cfg.active_address(), Some("http://b:2"));
    }

    #[test]
    fn test_set_address_only_touches_one_slot() {
        let mut cfg = TransportConfiguration::new(TransportKind::Persistent, "ws://a:1", "");
        cfg.set_address(TransportKind::OneShot, "http://c:3");
        assert_eq!(cfg.address(TransportKind::Persistent), Some("ws://a:1"));
        assert_eq!(cfg.address(TransportKind::OneShot), Some("http://c:3"));
    }

    #[test]
    fn test_transport_kind_from_str_accepts_aliases() {
        assert_eq!("websocket".parse::<TransportKind>(), Ok(TransportKind::Persistent));
        assert_eq!("WS".parse::<TransportKind>(), Ok(TransportKind::Persistent));
        assert_eq!("http".parse::<TransportKind>(), Ok(TransportKind::OneShot));
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_transport_kind_serde_uses_lowercase_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrap {
            kind: TransportKind,
        }
        let json = serde_json::to_string(&Wrap { kind: TransportKind::OneShot }).unwrap();
        assert_eq!(json, r#"{"kind":"http"}"#);
    }

    #[test]
    fn test_ready_state_defaults_to_closed() {
        assert_eq!(ReadyState::default(), ReadyState::Closed);
    }
}
