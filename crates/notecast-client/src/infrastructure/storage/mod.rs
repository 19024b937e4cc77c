//! Persistent storage for the client (configuration file).

pub mod config;

pub use config::{load_config, save_config, ClientConfig, ConfigError};
