//! # notecast-core
//!
//! Shared library for notecast containing the note message model, the event
//! normalizer, transport configuration types, and the JSON wire codec.
//!
//! This crate performs no I/O.  It has no dependency on sockets, HTTP clients,
//! MIDI backends, or the async runtime; everything here is plain data and pure
//! functions, which keeps it trivially testable.
//!
//! # Architecture overview (for beginners)
//!
//! notecast turns key presses (from a MIDI keyboard or typed on the console)
//! into small JSON messages and delivers them to a remote listener, either
//! over a long-lived WebSocket or as individual HTTP POST requests.
//!
//! This crate (`notecast-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – The message model ([`Note`], [`NoteRequest`]), key name
//!   parsing (`"C4"` → pitch 60), the normalizer that turns raw input into a
//!   [`NoteRequest`], the transport configuration, and the device
//!   subscription set.
//!
//! - **`protocol`** – How messages travel: JSON encoding of a
//!   [`NoteRequest`] and decoding of raw MIDI bytes into note events.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `notecast_core::NoteRequest` instead of `notecast_core::domain::note::NoteRequest`.
pub use domain::devices::{DeviceId, SubscriptionSet};
pub use domain::key_name::{KeyName, KeyNameError};
pub use domain::normalize::{normalize, normalize_click, NoteSource, PlayerSettings};
pub use domain::note::{EventType, Note, NoteRequest, Pitch, PitchError, Velocity, VelocityError};
pub use domain::transport::{
    ParseTransportKindError, ReadyState, TransportConfiguration, TransportKind,
};
pub use protocol::codec::{decode_request, encode_request, ProtocolError};
pub use protocol::midi::{decode_midi, DeviceNoteEvent};
