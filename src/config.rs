//! Configuration management for RAX FTP Connect
//!
//! Loads the connection target and the connectivity checker to run from
//! `config.toml`, with environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::options::ConnectionOptions;

/// Which liveness probe to run against an open connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckerKind {
    /// `NOOP` probe, detects dead connections.
    #[default]
    Noop,
    /// Raw listing of `./`, always reports connected.
    RawList,
}

/// Complete client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    /// Target and handshake options, the `[connection]` table.
    /// Environment: RAX_FTP_CONNECTION__HOST, RAX_FTP_CONNECTION__PASSWORD, ...
    pub connection: ConnectionOptions,

    /// Environment: RAX_FTP_CHECKER
    #[serde(default)]
    pub checker: CheckerKind,
}

impl ClientSettings {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        // Try the packaged path first, then the working directory
        let config_paths = [
            "rax-ftp-connect/config", // Docker: /app/rax-ftp-connect/config.toml
            "config",                 // Local development: ./config.toml
        ];

        let mut last_error = None;

        for config_path in config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(
                    Environment::with_prefix("RAX_FTP")
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                )
                .build()
            {
                Ok(settings) => return Self::from_config(settings),
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ConfigError::Message(format!("No configuration found in {config_paths:?}"))
        }))
    }

    /// Deserialize and validate an already-built configuration.
    pub fn from_config(settings: Config) -> Result<Self, ConfigError> {
        let parsed: ClientSettings = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.host().trim().is_empty() {
            return Err(ConfigError::Message("connection.host cannot be empty".into()));
        }

        if self.connection.port() == 0 {
            return Err(ConfigError::Message("connection.port cannot be 0".into()));
        }

        if self.connection.timeout() == 0 {
            return Err(ConfigError::Message(
                "connection.timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
