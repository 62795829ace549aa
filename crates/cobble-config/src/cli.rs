//! Command-line flags for the cobble client.
//!
//! Flags are sparse on purpose: anything set here wins over `config.ron`,
//! anything absent leaves the loaded value alone.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments accepted by the client binary.
#[derive(Parser, Debug)]
#[command(name = "cobble", about = "Synchronized voxel world client")]
pub struct CliArgs {
    /// IP address of the world server.
    #[arg(long)]
    pub server: Option<String>,

    /// TCP port of the world server.
    #[arg(long)]
    pub port: Option<u16>,

    /// Surface window radius in chunks.
    #[arg(long)]
    pub render_distance: Option<i64>,

    /// Collider window radius in blocks.
    #[arg(long)]
    pub interaction_radius: Option<f64>,

    /// Log verbosity, one of error, warn, info, debug or trace.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Read and write `config.ron` under this directory instead of the
    /// platform default.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Fold CLI overrides into a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(server) = &args.server {
            self.network.server_address.clone_from(server);
        }
        if let Some(port) = args.port {
            self.network.server_port = port;
        }
        if let Some(distance) = args.render_distance {
            self.world.render_distance = distance;
        }
        if let Some(radius) = args.interaction_radius {
            self.world.interaction_radius = radius;
        }
        if let Some(level) = &args.log_level {
            self.debug.log_level.clone_from(level);
        }
    }
}
