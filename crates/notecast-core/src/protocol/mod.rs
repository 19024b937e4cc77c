//! Wire-level encoding: JSON for outbound note requests, raw MIDI bytes for
//! inbound device events.

pub mod codec;
pub mod midi;

pub use codec::{decode_request, encode_request, ProtocolError};
pub use midi::{decode_midi, DeviceNoteEvent};
