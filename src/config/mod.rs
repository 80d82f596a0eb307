//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Allowed client origins for CORS (comma-separated).
    /// Unset means any origin is accepted (development default).
    pub client_origin: Option<String>,

    /// Meter cost of a special attack. Historical revisions disagree on
    /// 50 vs 100, so this is a tunable balance parameter.
    pub special_cost: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string())
        };

        let special_cost = match env::var("SPECIAL_COST") {
            Ok(raw) => raw
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidNumber("SPECIAL_COST"))?,
            Err(_) => 100.0,
        };

        if !(0.0..=100.0).contains(&special_cost) {
            return Err(ConfigError::InvalidNumber("SPECIAL_COST"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            client_origin: env::var("CLIENT_ORIGIN").ok(),

            special_cost,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid numeric value for {0}")]
    InvalidNumber(&'static str),
}
