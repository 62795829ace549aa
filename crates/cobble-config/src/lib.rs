//! Settings for the cobble client.
//!
//! One `config.ron` on disk, clap flags that override it, and defaults for
//! every field so a first run needs neither. [`Config::reload`] detects
//! on-disk edits without restarting the client.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, NetworkConfig, WorldConfig, default_config_dir};
pub use error::ConfigError;
