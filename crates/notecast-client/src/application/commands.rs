//! Console command parsing.
//!
//! The console stands in for an on-screen keyboard and settings panel.  One
//! command per line, words separated by whitespace:
//!
//! ```text
//! play C4                       send note-on for a key (name or number)
//! connect [ws://host:port]      (re)connect the WebSocket transport
//! transport websocket|http      switch the active transport
//! endpoint websocket|http [url] set or clear a transport address
//! player [name]                 set the player name (blank clears it)
//! instrument <name>             set the instrument
//! velocity on|off               forward device velocity
//! devices                       rescan and list MIDI inputs
//! status                        show the current settings
//! help                          show this list
//! quit                          exit
//! ```

use notecast_core::{KeyName, KeyNameError, ParseTransportKindError, TransportKind};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  play <key>                    send note-on (e.g. play C4, play F#3, play 60)
  connect [url]                 connect the WebSocket transport
  transport websocket|http      switch the active transport
  endpoint websocket|http [url] set or clear a transport address
  player [name]                 set the player name
  instrument <name>             set the instrument
  velocity on|off               forward MIDI velocity
  devices                       rescan MIDI inputs
  status                        show current settings
  help                          show this help
  quit                          exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play(KeyName),
    Connect(Option<String>),
    Transport(TransportKind),
    Endpoint { kind: TransportKind, address: String },
    Player(String),
    Instrument(String),
    Velocity(bool),
    Devices,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Key(#[from] KeyNameError),

    #[error(transparent)]
    Transport(#[from] ParseTransportKindError),

    #[error("expected 'on' or 'off', got '{0}'")]
    Toggle(String),
}

/// Parses one console line.
///
/// # Errors
///
/// [`CommandError`] describing what was wrong with the line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    if word.is_empty() {
        return Err(CommandError::Empty);
    }

    match word.to_ascii_lowercase().as_str() {
        "play" | "p" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("play <key>"));
            }
            Ok(Command::Play(rest.parse()?))
        }
        "connect" => Ok(Command::Connect((!rest.is_empty()).then(|| rest.to_string()))),
        "transport" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("transport websocket|http"));
            }
            Ok(Command::Transport(rest.parse()?))
        }
        "endpoint" => {
            let (kind, address) = match rest.split_once(char::is_whitespace) {
                Some((kind, address)) => (kind, address.trim()),
                None => (rest, ""),
            };
            if kind.is_empty() {
                return Err(CommandError::Usage("endpoint websocket|http [url]"));
            }
            Ok(Command::Endpoint {
                kind: kind.parse()?,
                address: address.to_string(),
            })
        }
        "player" => Ok(Command::Player(rest.to_string())),
        "instrument" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("instrument <name>"));
            }
            Ok(Command::Instrument(rest.to_string()))
        }
        "velocity" => match rest.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Ok(Command::Velocity(true)),
            "off" | "false" | "0" => Ok(Command::Velocity(false)),
            other => Err(CommandError::Toggle(other.to_string())),
        },
        "devices" => Ok(Command::Devices),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
