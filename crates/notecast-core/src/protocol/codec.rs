//! JSON codec for [`NoteRequest`].
//!
//! Wire format (one JSON object per message, UTF-8 text):
//! ```text
//! {"playerName":<string>,"type":"ON"|"OFF","note":{"instrument":<string>,"pitch":<0..127>,"velocity":<0.0..1.0>}}
//! ```
//! The same text is used as a WebSocket text frame and as an HTTP POST body.

use thiserror::Error;

use crate::domain::note::NoteRequest;

/// Errors that can occur during request encoding or decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request could not be serialized.
    #[error("failed to encode note request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The text is not a valid note request (bad JSON, missing field, pitch or
    /// velocity out of range, unknown event type).
    #[error("malformed note request: {0}")]
    Decode(#[source] serde_json::Error),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`NoteRequest`] into its JSON wire text.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use notecast_core::{decode_request, encode_request, EventType, Note, NoteRequest, Pitch, Velocity};
///
/// let req = NoteRequest::new("ana", EventType::On, Note::new("piano", Pitch::new(60).unwrap(), Velocity::FIXED));
/// let text = encode_request(&req).unwrap();
/// assert_eq!(decode_request(&text).unwrap(), req);
/// ```
pub fn encode_request(request: &NoteRequest) -> Result<String, ProtocolError> {
    serde_json::to_string(request).map_err(ProtocolError::Encode)
}

/// Decodes a [`NoteRequest`] from JSON wire text.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if the text is not a valid request.
pub fn decode_request(text: &str) -> Result<NoteRequest, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
