//! Logging setup for the cobble client.
//!
//! Everything logs through the `tracing` ecosystem: a human-readable console
//! layer is always installed, and debug builds add a JSON file under the log
//! directory for after-the-fact digging. Filtering honors `RUST_LOG` first,
//! then the configured `debug.log_level`, then plain `info`.

use std::path::Path;
use std::sync::Arc;

use cobble_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the JSON log file written in debug builds.
const LOG_FILE: &str = "cobble.log";

/// Install the global tracing subscriber.
///
/// The console layer prints target, thread name, level, and time since
/// startup. When `debug_build` is set and `log_dir` is given, a second layer
/// mirrors everything as JSON into `cobble.log` inside that directory; if
/// the directory or file cannot be created the client runs with console
/// output only.
///
/// ```no_run
/// use cobble_config::Config;
/// use cobble_log::init_logging;
///
/// let config = Config::default();
/// init_logging(
///     Some(std::path::Path::new("./logs")),
///     cfg!(debug_assertions),
///     Some(&config),
/// );
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let configured = config
        .map(|c| c.debug.log_level.as_str())
        .filter(|level| !level.is_empty())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured));

    let console = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // the receive task logs under its own name
        .with_timer(fmt::time::uptime());

    let registry = tracing_subscriber::registry().with(filter).with(console);

    if debug_build
        && let Some(dir) = log_dir
        && std::fs::create_dir_all(dir).is_ok()
        && let Ok(file) = std::fs::File::create(dir.join(LOG_FILE))
    {
        let json = fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_timer(fmt::time::uptime())
            .json();
        registry.with(json).init();
        return;
    }

    registry.init();
}

/// The filter used when neither `RUST_LOG` nor the config says otherwise.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info")
}
