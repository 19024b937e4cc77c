//! Application layer use cases for the client.
//!
//! # What use cases does the client have?
//!
//! - **`deliver`** – The transport selector.  Reads the active transport kind
//!   on every send and routes a `NoteRequest` to the persistent or one-shot
//!   transport.  Both transports are traits here; the WebSocket and HTTP
//!   implementations live in the infrastructure layer.
//!
//! - **`devices`** – Keeps exactly one subscription per attached input device
//!   across repeated refreshes.
//!
//! - **`session`** – The context object the event loop owns: player settings,
//!   the selector, and the device registry.
//!
//! - **`commands`** – Parses console lines into [`commands::Command`]s.
//!
//! - **`activity`** – The user-visible activity log.

pub mod activity;
pub mod commands;
pub mod deliver;
pub mod devices;
pub mod session;
