//! Transport selection: route each [`NoteRequest`] to the active transport.
//!
//! The selector holds the [`TransportConfiguration`] and one instance of each
//! transport.  It reads the active kind and its address on every call, so
//! switching transports or editing an address applies to the very next note.
//!
//! Nothing here ever fails towards the caller.  `deliver` returns `()`; the
//! outcome of a send is written to the [`ActivityLog`] (directly for
//! "not connected", by the transport for everything that happens later).

use notecast_core::{NoteRequest, ProtocolError, ReadyState, TransportConfiguration, TransportKind};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::application::activity::ActivityLog;

/// Why a transport refused a request.
#[derive(Debug, Error)]
pub enum SendError {
    /// No destination address is set.
    #[error("no destination address configured")]
    NotConfigured,

    /// The persistent connection is missing, still connecting, closed, or has
    /// reported an error since it was opened.
    #[error("connection is not open")]
    NotOpen,

    #[error(transparent)]
    Encode(#[from] ProtocolError),
}

/// Identifies one persistent connection attempt.  Events from a superseded
/// attempt are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// Asynchronous completion reported by a persistent connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub connection: ConnectionId,
    pub kind: TransportEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// Handshake completed.
    Opened,
    /// A frame arrived from the peer.
    Inbound(String),
    /// The connection reported an error.
    Failed(String),
    /// The connection is gone.
    Closed,
}

// ── Transport seams ───────────────────────────────────────────────────────────

/// A long-lived, ordered, bidirectional connection.
///
/// Implementations must only transmit while open and error-free, and must
/// release any previous connection before starting a new one.
pub trait PersistentTransport: Send {
    /// Starts connecting to `address`.  A blank address is ignored.
    fn connect(&mut self, address: &str);

    /// Queues `request` for transmission.
    ///
    /// # Errors
    ///
    /// [`SendError::NotOpen`] unless the connection is open and healthy.
    fn send(&mut self, address: &str, request: &NoteRequest) -> Result<(), SendError>;

    /// Applies a completion reported by the connection task.
    fn on_event(&mut self, event: TransportEvent);

    fn ready_state(&self) -> ReadyState;

    /// Releases the current connection, returning its task if one was live.
    fn close(&mut self) -> Option<JoinHandle<()>>;
}

/// A stateless request-per-message transport.
pub trait OneShotTransport: Send {
    /// Starts one request for `request`.  Completion is reported through the
    /// activity log; the call itself never waits.
    ///
    /// # Errors
    ///
    /// [`SendError::NotConfigured`] for a blank address,
    /// [`SendError::Encode`] if the request cannot be serialized.
    fn send(&self, address: &str, request: &NoteRequest) -> Result<(), SendError>;
}

// ── Selector ──────────────────────────────────────────────────────────────────

pub struct TransportSelector {
    config: TransportConfiguration,
    persistent: Box<dyn PersistentTransport>,
    one_shot: Box<dyn OneShotTransport>,
    log: ActivityLog,
}

impl TransportSelector {
    pub fn new(
        config: TransportConfiguration,
        persistent: Box<dyn PersistentTransport>,
        one_shot: Box<dyn OneShotTransport>,
        log: ActivityLog,
    ) -> Self {
        Self {
            config,
            persistent,
            one_shot,
            log,
        }
    }

    pub fn config(&self) -> &TransportConfiguration {
        &self.config
    }

    /// Switches the active transport.  In-flight one-shot requests continue;
    /// the persistent connection is left as it is.
    pub fn select(&mut self, kind: TransportKind) {
        self.config.set_active(kind);
    }

    pub fn set_address(&mut self, kind: TransportKind, address: impl Into<String>) {
        self.config.set_address(kind, address);
    }

    /// (Re)connects the persistent transport to its configured address.
    pub fn connect(&mut self) {
        match self.config.address(TransportKind::Persistent) {
            Some(address) => self.persistent.connect(address),
            None => debug!("connect requested without a websocket endpoint"),
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.persistent.ready_state()
    }

    pub fn on_transport_event(&mut self, event: TransportEvent) {
        self.persistent.on_event(event);
    }

    /// Sends `request` over the active transport.
    pub fn deliver(&mut self, request: &NoteRequest) {
        if !request.event_type().is_supported() {
            warn!(event_type = %request.event_type(), "refusing to deliver unsupported event type");
            return;
        }

        let kind = self.config.active();
        let Some(address) = self.config.address(kind) else {
            debug!(transport = %kind, "no address configured; note dropped");
            return;
        };

        debug!(
            transport = %kind,
            event_type = %request.event_type(),
            pitch = %request.note().pitch(),
            "delivering note"
        );

        let result = match kind {
            TransportKind::Persistent => self.persistent.send(address, request),
            TransportKind::OneShot => self.one_shot.send(address, request),
        };

        match result {
            Ok(()) => {}
            Err(SendError::NotOpen) => self.log.not_connected(),
            Err(SendError::NotConfigured) => {}
            Err(SendError::Encode(e)) => error!("failed to encode note request: {e}"),
        }
    }

    /// Releases the persistent connection.
    pub fn shutdown(&mut self) -> Option<JoinHandle<()>> {
        self.persistent.close()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
