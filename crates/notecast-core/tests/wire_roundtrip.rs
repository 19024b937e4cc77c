//! Integration tests for the note request wire format.
//!
//! These exercise the public API end to end: raw input (key names and MIDI
//! bytes) is normalized into a request, encoded to JSON text, and decoded
//! back, the same path a message takes from the client to a listener.

use notecast_core::{
    decode_midi, decode_request, encode_request, normalize, normalize_click, EventType, KeyName,
    NoteSource, PlayerSettings,
};

fn player(report_velocity: bool) -> PlayerSettings {
    PlayerSettings {
        originator: "ana".to_string(),
        instrument: "piano".to_string(),
        report_velocity,
    }
}

#[test]
fn test_click_request_survives_wire_round_trip_for_every_key() {
    for n in 0..=127u8 {
        // Arrange
        let key: KeyName = n.to_string().parse().unwrap();
        let request = normalize_click(key.pitch(), &player(false));

        // Act
        let text = encode_request(&request).unwrap();
        let decoded = decode_request(&text).unwrap();

        // Assert
        assert_eq!(decoded, request);
        assert_eq!(decoded.note().pitch().value(), n);
    }
}

#[test]
fn test_device_note_on_then_off_round_trip() {
    // Arrange: note-on at velocity 90, then running-status note-off
    let on = decode_midi(&[0x90, 64, 90]).unwrap();
    let off = decode_midi(&[0x90, 64, 0]).unwrap();

    for ev in [on, off] {
        let source = NoteSource::Device {
            pitch: ev.pitch,
            velocity: Some(ev.velocity),
        };
        let request = normalize(&source, ev.kind, &player(true));

        // Act
        let decoded = decode_request(&encode_request(&request).unwrap()).unwrap();

        // Assert
        assert_eq!(decoded.originator(), "ana");
        assert_eq!(decoded.event_type(), ev.kind);
        assert_eq!(decoded.note(), request.note());
    }

    assert_eq!(on.kind, EventType::On);
    assert_eq!(off.kind, EventType::Off);
}

#[test]
fn test_named_key_encodes_expected_json() {
    let key: KeyName = "C4".parse().unwrap();
    let text = encode_request(&normalize_click(key.pitch(), &player(false))).unwrap();
    assert_eq!(
        text,
        r#"{"playerName":"ana","type":"ON","note":{"instrument":"piano","pitch":60,"velocity":1.0}}"#
    );
}
