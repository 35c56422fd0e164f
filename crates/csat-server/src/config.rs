// ABOUTME: Configuration loading and validation for the csatd server.
// ABOUTME: Reads CSAT_* environment variables and applies defaults for storage and binding.

use std::net::SocketAddr;
use std::path::PathBuf;

use csat_store::{Backend, UnknownBackend};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CSAT_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("CSAT_BACKEND is invalid: {0}")]
    Backend(#[from] UnknownBackend),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CsatConfig {
    pub home: PathBuf,
    pub bind: SocketAddr,
    pub backend: Backend,
    pub static_dir: Option<PathBuf>,
}

impl CsatConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - CSAT_HOME: storage directory (default: ./persistent_data)
    /// - CSAT_BIND: socket address to bind (default: 0.0.0.0:5000)
    /// - CSAT_BACKEND: `json` or `sqlite` (default: json)
    /// - CSAT_STATIC_DIR: built dashboard assets to serve (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("CSAT_HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("persistent_data"));

        let bind_str = std::env::var("CSAT_BIND").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let backend = match std::env::var("CSAT_BACKEND") {
            Ok(name) if !name.is_empty() => name.parse()?,
            _ => Backend::default(),
        };

        let static_dir = std::env::var("CSAT_STATIC_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            home,
            bind,
            backend,
            static_dir,
        })
    }
}
