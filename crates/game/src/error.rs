//! Errors at the load boundary.
//!
//! Nothing on the per-tick path returns an error: bad geometry is
//! normalized and missing entities are skipped. Only loading and validating
//! levels and configuration can fail.

use std::path::PathBuf;

/// Error loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid session config: {0}")]
    Invalid(String),
}

/// Error loading or validating a [`LevelDefinition`](crate::LevelDefinition).
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid level '{level}': {reason}")]
    Invalid { level: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
