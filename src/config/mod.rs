//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::ws::hub::DEFAULT_CONNECTION_BUFFER;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Seed for "it" reassignment; random when unset
    pub rng_seed: Option<u64>,
    /// Allowed client origins for CORS (comma-separated); any when unset
    pub client_origin: Option<String>,
    /// Outbound messages queued per connection before drops start
    pub connection_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            rng_seed: None,
            client_origin: None,
            connection_buffer: DEFAULT_CONNECTION_BUFFER,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // PORT wins over SERVER_ADDR, as on most hosting platforms
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| defaults.server_addr.to_string()),
        };

        let rng_seed = lookup("RNG_SEED")
            .map(|raw| raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidSeed))
            .transpose()?;

        let connection_buffer = match lookup("CONNECTION_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidBuffer),
            },
            None => defaults.connection_buffer,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            rng_seed,
            client_origin: lookup("CLIENT_ORIGIN").filter(|s| !s.trim().is_empty()),
            connection_buffer,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("RNG_SEED must be an unsigned 64-bit integer")]
    InvalidSeed,

    #[error("CONNECTION_BUFFER must be a positive integer")]
    InvalidBuffer,
}
