//! Headless demo client.
//!
//! Connects to a world server, mirrors its snapshots, and drives the
//! streaming and collider subsystems at a fixed tick rate with a renderer
//! that only counts what it is asked to build. Useful for soaking the
//! protocol against a live server without a graphics stack.
//!
//! Run with `cargo run -p cobble-demo -- --server 10.0.0.5 --port 4000`
//! to override the configured address.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use cobble_client::{
    ClientConfig, ClientSession, ProxyHandle, Renderer, SurfaceHandle, SurfaceMesh, TICK_DURATION,
};
use cobble_config::{CliArgs, Config};
use cobble_proto::FrameConfig;
use cobble_world::BlockPos;
use glam::DVec3;
use tracing::{debug, error, info, warn};

/// Renderer stand-in that hands out sequential handles and keeps live
/// counts. With `log_renderer_calls` enabled in the config it traces every
/// call at debug level.
struct TraceRenderer {
    log_calls: bool,
    next_surface: u64,
    next_proxy: u64,
    live_surfaces: u64,
    live_proxies: u64,
}

impl TraceRenderer {
    fn new(log_calls: bool) -> Self {
        Self {
            log_calls,
            next_surface: 0,
            next_proxy: 0,
            live_surfaces: 0,
            live_proxies: 0,
        }
    }
}

impl Renderer for TraceRenderer {
    fn build_surface(&mut self, mesh: &SurfaceMesh) -> SurfaceHandle {
        self.next_surface += 1;
        self.live_surfaces += 1;
        let handle = SurfaceHandle(self.next_surface);
        if self.log_calls {
            debug!(
                handle = handle.0,
                blocks = mesh.block_count(),
                "build surface"
            );
        }
        handle
    }

    fn destroy_surface(&mut self, handle: SurfaceHandle) {
        self.live_surfaces = self.live_surfaces.saturating_sub(1);
        if self.log_calls {
            debug!(handle = handle.0, "destroy surface");
        }
    }

    fn create_physical_proxy(&mut self, position: BlockPos) -> ProxyHandle {
        self.next_proxy += 1;
        self.live_proxies += 1;
        let handle = ProxyHandle(self.next_proxy);
        if self.log_calls {
            debug!(handle = handle.0, ?position, "create proxy");
        }
        handle
    }

    fn destroy_physical_proxy(&mut self, handle: ProxyHandle) {
        self.live_proxies = self.live_proxies.saturating_sub(1);
        if self.log_calls {
            debug!(handle = handle.0, "destroy proxy");
        }
    }
}

/// Settings directory plus the effective config: `--config` wins over the
/// platform default location, CLI flags win over `config.ron`, and a broken
/// file degrades to defaults rather than aborting.
fn startup_config(args: &CliArgs) -> (PathBuf, Config) {
    let dir = args
        .config
        .clone()
        .or_else(cobble_config::default_config_dir)
        .expect("no usable config directory on this platform");
    let mut config = Config::load_or_create(&dir).unwrap_or_else(|e| {
        eprintln!("config unavailable ({e}), continuing with defaults");
        Config::default()
    });
    config.apply_cli_overrides(args);
    (dir, config)
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let (config_dir, config) = startup_config(&args);

    let log_dir = config_dir.join("logs");
    cobble_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let addr: SocketAddr = match format!(
        "{}:{}",
        config.network.server_address, config.network.server_port
    )
    .parse()
    {
        Ok(addr) => addr,
        Err(e) => {
            error!(
                address = %config.network.server_address,
                port = config.network.server_port,
                error = %e,
                "invalid server address"
            );
            std::process::exit(1);
        }
    };

    let client_config = ClientConfig {
        server_addr: addr,
        chunk_size: config.world.chunk_size,
        render_distance: config.world.render_distance,
        interaction_radius: config.world.interaction_radius,
        frame: FrameConfig {
            max_payload_size: config.world.max_frame_bytes,
        },
    };

    info!(%addr, "connecting to server");
    let mut session = match ClientSession::connect(client_config).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "failed to connect");
            std::process::exit(1);
        }
    };
    info!("connected, waiting for the first snapshot");

    let mut renderer = TraceRenderer::new(config.debug.log_renderer_calls);
    // The demo viewer stands still at spawn height; streaming and collider
    // churn is driven entirely by server snapshots.
    let viewer = DVec3::new(0.0, 10.0, 0.0);
    let mut interval = tokio::time::interval(TICK_DURATION);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = session.tick(viewer, &mut renderer) {
                    warn!(error = %e, "session ended");
                    break;
                }
                ticks += 1;
                // Status line every five seconds at the 60 Hz tick rate
                if ticks % 300 == 0 {
                    let world = session.world().read();
                    info!(
                        chunks = world.chunk_count(),
                        players = world.players().len(),
                        surfaces = session.surface_count(),
                        proxies = session.proxy_count(),
                        "status"
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                session.close();
                break;
            }
        }
    }
}
