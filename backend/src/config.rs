//! Process configuration loaded from environment variables.
//!
//! Repository selection is configured separately, see
//! [`RepositoryFactory::from_env`](crate::db::RepositoryFactory::from_env).

use std::env;
use std::net::SocketAddr;

use crate::auth::jwt::DEFAULT_TTL_SECS;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FORECAST_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    /// Base URL of the forecasting service.
    pub forecast_url: String,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Read the configuration from the environment.
    ///
    /// # Environment Variables
    /// - `JWT_SECRET` (required): HS256 signing secret
    /// - `HOST` (optional, default: `0.0.0.0`)
    /// - `PORT` (optional, default: 5000)
    /// - `JWT_TTL_SECS` (optional, default: 3600)
    /// - `FORECAST_URL` (optional, default: `http://127.0.0.1:5000`)
    /// - `CORS` (optional): comma-separated list of allowed origins
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_var("PORT", DEFAULT_PORT)?,
            jwt_secret,
            jwt_ttl_secs: parse_var("JWT_TTL_SECS", DEFAULT_TTL_SECS)?,
            forecast_url: env::var("FORECAST_URL")
                .unwrap_or_else(|_| DEFAULT_FORECAST_URL.to_string()),
            cors_origins: env::var("CORS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: self.host.clone(),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
