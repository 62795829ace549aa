//! Client settings with RON persistence.
//!
//! Every section and field carries a default, so a partial `config.ron` is
//! always valid and an absent one is created on first run. Unknown fields
//! parse without error, which lets old builds read configs written by newer
//! ones.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the config file inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Network settings.
    pub network: NetworkConfig,
    /// World synchronization settings.
    pub world: WorldConfig,
    /// Logging and diagnostics.
    pub debug: DebugConfig,
}

/// Where and how to reach the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// IP address the client connects to.
    pub server_address: String,
    /// TCP port the server listens on.
    pub server_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1".to_string(),
            server_port: 12345,
        }
    }
}

/// Tuning for the synchronization core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Blocks per chunk edge on the horizontal axes.
    pub chunk_size: i64,
    /// Surface window radius in chunks around the viewer.
    pub render_distance: i64,
    /// Collider window radius in blocks.
    pub interaction_radius: f64,
    /// Maximum frame payload accepted from the server, in bytes.
    pub max_frame_bytes: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            render_distance: 3,
            interaction_radius: 5.0,
            max_frame_bytes: 1_048_576,
        }
    }
}

/// Logging and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Default log verbosity; `RUST_LOG` still wins when set.
    pub log_level: String,
    /// Log every renderer call at debug level.
    pub log_renderer_calls: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_renderer_calls: false,
        }
    }
}

fn file_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing a default file first if
    /// none exists yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = file_in(config_dir);
        if !path.exists() {
            let defaults = Config::default();
            defaults.save(config_dir)?;
            log::info!("wrote default config to {}", path.display());
            return Ok(defaults);
        }

        let config = Self::read_from(&path)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Persist this config to `config_dir/config.ron`, creating the
    /// directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let rendered = ron::ser::to_string_pretty(self, pretty)?;

        let path = file_in(config_dir);
        std::fs::write(&path, rendered).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read the config file, returning `Some` only if it differs from
    /// `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let reread = Self::read_from(&file_in(config_dir))?;
        if reread == *self {
            return Ok(None);
        }
        log::info!("config changed on disk");
        Ok(Some(reread))
    }

    fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Default config directory: `<platform config dir>/cobble`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cobble"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render_as_ron() {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        let rendered = ron::ser::to_string_pretty(&Config::default(), pretty).unwrap();

        assert!(rendered.contains("server_port: 12345"));
        assert!(rendered.contains("chunk_size: 16"));
        assert!(rendered.contains("interaction_radius: 5.0"));
    }

    #[test]
    fn test_ron_roundtrip_is_lossless() {
        let mut config = Config::default();
        config.world.render_distance = 7;
        config.debug.log_renderer_calls = true;

        let rendered = ron::to_string(&config).unwrap();
        let parsed: Config = ron::from_str(&rendered).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let parsed: Config = ron::from_str("(world: (chunk_size: 32))").unwrap();

        assert_eq!(parsed.world.chunk_size, 32);
        assert_eq!(parsed.world.render_distance, 3);
        assert_eq!(parsed.network, NetworkConfig::default());
        assert_eq!(parsed.debug, DebugConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let parsed: Result<Config, _> = ron::from_str("(shaders: (quality: 3))");
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_save_then_load_preserves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.network.server_address = "voxel.example.net".to_string();
        config.world.interaction_radius = 7.5;

        config.save(dir.path()).unwrap();

        assert_eq!(Config::load_or_create(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_load_or_create_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();

        let first = Config::load_or_create(dir.path()).unwrap();

        assert_eq!(first, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_picks_up_disk_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut edited = config.clone();
        edited.world.render_distance = 8;
        edited.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.world.render_distance), Some(8));
    }

    #[test]
    fn test_reload_without_changes_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(world: oops").unwrap();

        match Config::load_or_create(dir.path()) {
            Err(ConfigError::Parse { path, .. }) => {
                assert!(path.ends_with(CONFIG_FILE));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_in_config_are_legal() {
        let parsed: Config =
            ron::from_str("// tuned by hand\n(\n  // defaults otherwise\n)").unwrap();
        assert_eq!(parsed, Config::default());
    }
}
