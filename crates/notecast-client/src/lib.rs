//! notecast-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does notecast-client do? (for beginners)
//!
//! The client sits between a player's keyboard and a remote listener (a game
//! server, a visualiser, another musician's machine).  Every key press turns
//! into a small JSON message that is sent to the listener.
//!
//! The client:
//!
//! 1. Watches the MIDI input devices attached to the machine and subscribes to
//!    each one exactly once, picking up devices that are plugged in later.
//! 2. Accepts console commands (`play C4`, `transport http`, ...) as a stand-in
//!    for an on-screen keyboard.
//! 3. Normalizes each event into a `NoteRequest` and hands it to the
//!    transport selector.
//! 4. Delivers the request over whichever transport is active: a persistent
//!    WebSocket connection, or one HTTP POST per message.
//! 5. Prints an activity log to stdout: connection status, inbound frames,
//!    HTTP responses, and delivery failures.

/// Application layer: session state, transport selection, device registry.
pub mod application;

/// Infrastructure layer: WebSocket, HTTP, MIDI, configuration, event loop.
pub mod infrastructure;
