//! Configuration module for voicelib
//!
//! Loads config from `$XDG_CONFIG_HOME/voicelib/config.toml` or the platform config directory.
//! Falls back to built-in defaults if the file doesn't exist.
//! Partial configs are merged with defaults using serde's default attributes.
//!
//! # Example
//!
//! ```no_run
//! use voicelib::config::Config;
//!
//! let config = Config::load().expect("Failed to load config");
//! println!("Models root: {}", config.models.root_dir().unwrap().display());
//! println!("Payload threshold: {} bytes", config.models.payload_min_bytes);
//! ```

pub mod schema;

pub use schema::Config;
