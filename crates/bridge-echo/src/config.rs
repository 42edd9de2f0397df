//! TOML configuration for the echo server.
//!
//! Every field has a default, so the server runs with no config file at
//! all, and an existing file may omit any subset of fields:
//!
//! ```toml
//! port = 7777
//! poll_interval_ms = 10
//! max_read = 4096
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Echo server settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EchoConfig {
    /// TCP port to listen on; 0 lets the OS pick an ephemeral port.
    pub port: u16,
    /// Sleep between poll sweeps, in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum bytes pulled from a client per receive attempt.
    pub max_read: usize,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            port: 7777,
            poll_interval_ms: 10,
            max_read: 4096,
        }
    }
}

impl EchoConfig {
    /// Loads settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let cfg = EchoConfig::default();
        assert_eq!(cfg.port, 7777);
        assert_eq!(cfg.poll_interval_ms, 10);
        assert_eq!(cfg.max_read, 4096);
    }

    #[test]
    fn test_parse_full_config() {
        let cfg: EchoConfig =
            toml::from_str("port = 9000\npoll_interval_ms = 25\nmax_read = 512\n").unwrap();
        assert_eq!(
            cfg,
            EchoConfig {
                port: 9000,
                poll_interval_ms: 25,
                max_read: 512,
            }
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let cfg: EchoConfig = toml::from_str("port = 9000\n").unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.poll_interval_ms, EchoConfig::default().poll_interval_ms);
        assert_eq!(cfg.max_read, EchoConfig::default().max_read);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(toml::from_str::<EchoConfig>("bogus = 1\n").is_err());
    }
}
