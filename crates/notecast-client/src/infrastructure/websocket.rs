//! WebSocket implementation of the persistent transport.
//!
//! # Connection lifecycle
//!
//! ```text
//!   connect(addr)          Opened                Failed / Closed
//! ───────────────▶ Connecting ───────▶ Open ───────────────────▶ Closed
//! ```
//!
//! [`WebSocketTransport`] lives on the event loop and never touches the
//! socket.  Each `connect` spawns a connection task that owns the socket and
//! reports back over an `mpsc` channel with [`TransportEvent`]s tagged by a
//! [`ConnectionId`].  Outbound frames go to the task through a second,
//! unbounded channel, which keeps them in send order.
//!
//! A new `connect` releases the previous connection first: a handshake still
//! in progress is aborted, an open socket is sent a Close frame.  Late events
//! from a released connection carry a stale id and are ignored.

use futures_util::{SinkExt, StreamExt};
use notecast_core::{encode_request, NoteRequest, ReadyState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::application::activity::ActivityLog;
use crate::application::deliver::{
    ConnectionId, PersistentTransport, SendError, TransportEvent, TransportEventKind,
};

/// Instruction from the transport to its connection task.
#[derive(Debug)]
enum Outbound {
    Frame(String),
    Close,
}

struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

pub struct WebSocketTransport {
    events: mpsc::UnboundedSender<TransportEvent>,
    log: ActivityLog,
    handle: Option<ConnectionHandle>,
    ready_state: ReadyState,
    faulted: bool,
    next_id: u64,
}

impl WebSocketTransport {
    /// `events` is where connection tasks report; the event loop feeds each
    /// event back through [`PersistentTransport::on_event`].
    pub fn new(events: mpsc::UnboundedSender<TransportEvent>, log: ActivityLog) -> Self {
        Self {
            events,
            log,
            handle: None,
            ready_state: ReadyState::Closed,
            faulted: false,
            next_id: 0,
        }
    }

    fn release(&mut self) -> Option<JoinHandle<()>> {
        let handle = self.handle.take()?;
        match self.ready_state {
            ReadyState::Connecting => {
                debug!(connection = handle.id.0, "aborting pending handshake");
                handle.task.abort();
            }
            ReadyState::Open | ReadyState::Closed => {
                debug!(connection = handle.id.0, "closing connection");
                let _ = handle.outbound.send(Outbound::Close);
            }
        }
        self.ready_state = ReadyState::Closed;
        Some(handle.task)
    }
}

impl PersistentTransport for WebSocketTransport {
    fn connect(&mut self, address: &str) {
        let address = address.trim();
        if address.is_empty() {
            return;
        }

        self.release();

        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.log.status("Connecting via WebSocket..");
        info!(connection = id.0, %address, "opening websocket");

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(
            id,
            address.to_string(),
            outbound_rx,
            self.events.clone(),
        ));

        self.handle = Some(ConnectionHandle {
            id,
            outbound: outbound_tx,
            task,
        });
        self.ready_state = ReadyState::Connecting;
        self.faulted = false;
    }

    fn send(&mut self, address: &str, request: &NoteRequest) -> Result<(), SendError> {
        if address.trim().is_empty() {
            return Err(SendError::NotConfigured);
        }
        let handle = match &self.handle {
            Some(handle) if self.ready_state == ReadyState::Open && !self.faulted => handle,
            _ => return Err(SendError::NotOpen),
        };

        let text = encode_request(request)?;
        debug!(connection = handle.id.0, payload = %text, "queueing websocket frame");
        handle
            .outbound
            .send(Outbound::Frame(text))
            .map_err(|_| SendError::NotOpen)
    }

    fn on_event(&mut self, event: TransportEvent) {
        let current = self.handle.as_ref().map(|h| h.id);
        if current != Some(event.connection) {
            debug!(connection = event.connection.0, "ignoring event from released connection");
            return;
        }

        match event.kind {
            TransportEventKind::Opened => {
                self.ready_state = ReadyState::Open;
                self.log.status("Successfully connected!");
            }
            TransportEventKind::Inbound(text) => self.log.inbound(text),
            TransportEventKind::Failed(reason) => {
                self.faulted = true;
                self.log.connection_error(reason);
            }
            TransportEventKind::Closed => {
                self.ready_state = ReadyState::Closed;
                self.handle = None;
                self.log.status("WebSocket connection closed.");
            }
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn close(&mut self) -> Option<JoinHandle<()>> {
        self.release()
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

/// Owns one socket from handshake to close.
///
/// Always finishes by emitting [`TransportEventKind::Closed`], unless it is
/// aborted during the handshake.
async fn run_connection(
    id: ConnectionId,
    address: String,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let emit = |kind: TransportEventKind| {
        let _ = events.send(TransportEvent {
            connection: id,
            kind,
        });
    };

    let stream = match connect_async(address.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(connection = id.0, %address, "websocket handshake failed: {e}");
            emit(TransportEventKind::Failed(e.to_string()));
            emit(TransportEventKind::Closed);
            return;
        }
    };
    emit(TransportEventKind::Opened);

    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            instruction = outbound.recv() => match instruction {
                Some(Outbound::Frame(text)) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        emit(TransportEventKind::Failed(e.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.close().await;
                    break;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => emit(TransportEventKind::Inbound(text)),
                Some(Ok(Message::Binary(bytes))) => {
                    emit(TransportEventKind::Inbound(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/pong are answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(TransportEventKind::Failed(e.to_string()));
                    break;
                }
            },
        }
    }

    debug!(connection = id.0, "websocket task finished");
    emit(TransportEventKind::Closed);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::activity::{EntryKind, LogEntry};
    use notecast_core::{normalize_click, Pitch, PlayerSettings};

    fn make_transport() -> (
        WebSocketTransport,
        mpsc::UnboundedReceiver<TransportEvent>,
        mpsc::UnboundedReceiver<LogEntry>,
    ) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (log, log_rx) = ActivityLog::channel();
        (WebSocketTransport::new(events_tx, log), events_rx, log_rx)
    }

    fn request() -> NoteRequest {
        normalize_click(Pitch::new(60).unwrap(), &PlayerSettings::default())
    }

    fn event(id: u64, kind: TransportEventKind) -> TransportEvent {
        TransportEvent {
            connection: ConnectionId(id),
            kind,
        }
    }

    #[test]
    fn test_send_before_connect_is_not_open() {
        let (mut transport, _events, _log) = make_transport();
        assert!(matches!(
            transport.send("ws://x", &request()),
            Err(SendError::NotOpen)
        ));
    }

    #[test]
    fn test_send_with_blank_address_is_not_configured() {
        let (mut transport, _events, _log) = make_transport();
        assert!(matches!(
            transport.send("  ", &request()),
            Err(SendError::NotConfigured)
        ));
    }

    #[test]
    fn test_connect_with_blank_address_does_nothing() {
        let (mut transport, _events, mut log) = make_transport();
        transport.connect("");
        assert_eq!(transport.ready_state(), ReadyState::Closed);
        assert!(log.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_connect_enters_connecting_and_logs() {
        // Arrange
        let (mut transport, _events, mut log) = make_transport();

        // Act
        transport.connect("ws://127.0.0.1:1");

        // Assert
        assert_eq!(transport.ready_state(), ReadyState::Connecting);
        assert_eq!(log.try_recv().unwrap().message, "Connecting via WebSocket..");
        assert!(matches!(
            transport.send("ws://127.0.0.1:1", &request()),
            Err(SendError::NotOpen)
        ));
    }

    #[tokio::test]
    async fn test_opened_then_failed_blocks_sending() {
        // Arrange
        let (mut transport, _events, mut log) = make_transport();
        transport.connect("ws://127.0.0.1:1");
        let id = transport.handle.as_ref().unwrap().id.0;

        // Act
        transport.on_event(event(id, TransportEventKind::Opened));
        let ready = transport.ready_state();
        transport.on_event(event(id, TransportEventKind::Failed("reset".to_string())));

        // Assert
        assert_eq!(ready, ReadyState::Open);
        assert!(matches!(
            transport.send("ws://127.0.0.1:1", &request()),
            Err(SendError::NotOpen)
        ));
        let kinds: Vec<EntryKind> = std::iter::from_fn(|| log.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![EntryKind::Status, EntryKind::Status, EntryKind::ConnectionError]
        );
    }

    #[tokio::test]
    async fn test_events_from_released_connection_are_ignored() {
        // Arrange: two connects, the first is superseded
        let (mut transport, _events, _log) = make_transport();
        transport.connect("ws://127.0.0.1:1");
        let stale = transport.handle.as_ref().unwrap().id.0;
        transport.connect("ws://127.0.0.1:2");

        // Act
        transport.on_event(event(stale, TransportEventKind::Opened));

        // Assert
        assert_eq!(transport.ready_state(), ReadyState::Connecting);
    }

    #[tokio::test]
    async fn test_closed_event_drops_handle() {
        let (mut transport, _events, _log) = make_transport();
        transport.connect("ws://127.0.0.1:1");
        let id = transport.handle.as_ref().unwrap().id.0;

        transport.on_event(event(id, TransportEventKind::Opened));
        transport.on_event(event(id, TransportEventKind::Closed));

        assert_eq!(transport.ready_state(), ReadyState::Closed);
        assert!(transport.handle.is_none());
    }

    #[tokio::test]
    async fn test_refused_handshake_reports_failed_then_closed() {
        // Arrange: nothing listens on port 1
        let (mut transport, mut events, _log) = make_transport();
        transport.connect("ws://127.0.0.1:1");

        // Act
        let first = events.recv().await.unwrap();
        let second = events.recv().await.unwrap();

        // Assert
        assert!(matches!(first.kind, TransportEventKind::Failed(_)));
        assert_eq!(second.kind, TransportEventKind::Closed);
    }
}
