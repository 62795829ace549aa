//! Error type for configuration persistence.

use std::path::PathBuf;

/// Failures while loading, saving, or re-reading `config.ron`.
///
/// Filesystem and parse variants carry the offending path so the client can
/// tell the user which file to fix.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An existing config file could not be read.
    #[error("could not read {}: {}", .path.display(), .source)]
    Read {
        /// The file that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The config file or its directory could not be written.
    #[error("could not write {}: {}", .path.display(), .source)]
    Write {
        /// The file or directory that failed to write.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The file's contents are not valid RON for a [`Config`](crate::Config).
    #[error("malformed config {}: {}", .path.display(), .source)]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// RON parse failure with position information.
        source: ron::error::SpannedError,
    },

    /// A [`Config`](crate::Config) could not be rendered as RON.
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
}
