//! Infrastructure layer for the client application.
//!
//! Contains the I/O-facing adapters: the WebSocket and HTTP transports, MIDI
//! device input, configuration storage, and the event loop that ties them to
//! the application layer.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `notecast_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`websocket`** – [`PersistentTransport`](crate::application::deliver::PersistentTransport)
//!   over `tokio-tungstenite`.  One background task per connection owns the
//!   socket; completions come back as `TransportEvent`s.
//!
//! - **`http`** – [`OneShotTransport`](crate::application::deliver::OneShotTransport)
//!   over `reqwest`.  Each note is one spawned POST.
//!
//! - **`midi_input`** – [`DeviceSource`](crate::application::devices::DeviceSource)
//!   over `midir`.
//!
//! - **`storage`** – TOML configuration file.
//!
//! - **`runtime`** – The single-threaded event loop.

pub mod http;
pub mod midi_input;
pub mod runtime;
pub mod storage;
pub mod websocket;

pub use runtime::run;
