//! The activity log: the only place delivery outcomes become visible.
//!
//! Transports never return failures to the code that produced a note.  They
//! record an entry here instead, and the event loop prints the entries to
//! stdout.  Each entry is mirrored as a `tracing` event so it also lands in
//! the diagnostic log on stderr.

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Category of an activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Lifecycle and informational messages.
    Status,
    /// A frame received on the persistent connection.
    Inbound,
    /// The body of a one-shot response, with its HTTP status.
    Response { status: u16 },
    /// A one-shot request that never got a response.
    DeliveryFailed,
    /// A persistent send refused because the connection is not open.
    NotConnected,
    /// An error reported by the persistent connection.
    ConnectionError,
    /// The current input device list.
    Devices,
    /// A console line that could not be parsed.
    CommandError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Response { status } if !(200..300).contains(&status) => {
                write!(f, "[{status}] {}", self.message)
            }
            _ => f.write_str(&self.message),
        }
    }
}

/// Cloneable writer half of the activity log.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    tx: mpsc::UnboundedSender<LogEntry>,
}

impl ActivityLog {
    /// Creates a log and the receiver the event loop drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LogEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn record(&self, kind: EntryKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            EntryKind::Status | EntryKind::Devices => info!(activity = ?kind, "{message}"),
            EntryKind::Inbound | EntryKind::Response { .. } => {
                debug!(activity = ?kind, "{message}")
            }
            EntryKind::DeliveryFailed
            | EntryKind::NotConnected
            | EntryKind::ConnectionError
            | EntryKind::CommandError => warn!(activity = ?kind, "{message}"),
        }
        // The receiver only goes away during shutdown.
        let _ = self.tx.send(LogEntry { kind, message });
    }

    pub fn status(&self, message: impl Into<String>) {
        self.record(EntryKind::Status, message);
    }

    pub fn inbound(&self, text: impl Into<String>) {
        self.record(EntryKind::Inbound, text);
    }

    pub fn response(&self, status: u16, body: impl Into<String>) {
        self.record(EntryKind::Response { status }, body);
    }

    pub fn delivery_failed(&self, reason: impl fmt::Display) {
        self.record(EntryKind::DeliveryFailed, format!("Delivery failed: {reason}"));
    }

    pub fn not_connected(&self) {
        self.record(EntryKind::NotConnected, "WebSocket not connected.");
    }

    pub fn connection_error(&self, reason: impl fmt::Display) {
        self.record(EntryKind::ConnectionError, format!("WebSocket error: {reason}"));
    }

    pub fn devices(&self, message: impl Into<String>) {
        self.record(EntryKind::Devices, message);
    }

    pub fn command_error(&self, reason: impl fmt::Display) {
        self.record(EntryKind::CommandError, reason.to_string());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
