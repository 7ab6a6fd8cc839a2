//! Server configuration.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `5001`)
//! - `CORS_ALLOWED_ORIGINS`: comma-separated origin patterns
//!   (default: `http://localhost:*,http://127.0.0.1:*`)

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5001;

/// Default origin patterns: any port on the local machine.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:*", "http://127.0.0.1:*"];

/// Errors in the server configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerConfigError {
    /// `PORT` is not a valid port number.
    #[error("Invalid PORT value: '{0}'")]
    InvalidPort(String),

    /// `HOST` and `PORT` do not form a socket address.
    #[error("Invalid server address: '{0}'")]
    InvalidAddress(String),
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// CORS origin patterns.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ServerConfigError::InvalidPort` if `PORT` is set but unparsable.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration from an arbitrary variable lookup.
    ///
    /// Unset or blank variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ServerConfigError> {
        let defaults = Self::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = non_blank("HOST").unwrap_or(defaults.host);

        let port = match non_blank("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ServerConfigError::InvalidPort(value))?,
            None => defaults.port,
        };

        let allowed_origins = non_blank("CORS_ALLOWED_ORIGINS").map_or(
            defaults.allowed_origins,
            |value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(ToString::to_string)
                    .collect()
            },
        );

        Ok(Self {
            host,
            port,
            allowed_origins,
        })
    }

    /// Resolves the bind address.
    ///
    /// # Errors
    ///
    /// Returns `ServerConfigError::InvalidAddress` if the host is not an IP
    /// literal.
    pub fn socket_address(&self) -> Result<SocketAddr, ServerConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ServerConfigError::InvalidAddress(address))
    }
}
