// src/config.rs

use std::env;

use dotenvy::dotenv;
use thiserror::Error;

/// Namespace used for document paths when `APP_ID` is not set.
pub const DEFAULT_APP_ID: &str = "career-track-v1";

/// Minimum fraction of correct roadmap quiz answers, expressed as a ratio.
/// A step passes when `score * PASS_DENOMINATOR >= total * PASS_NUMERATOR`.
pub const PASS_NUMERATOR: usize = 1;
pub const PASS_DENOMINATOR: usize = 2;

/// Monthly activity percentages seeded into every new result.
pub const DEFAULT_MONTHLY_PROGRESS: [u8; 4] = [20, 35, 45, 60];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} is invalid: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. The in-memory store is used when absent.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub app_id: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let jwt_expiration = match env::var("JWT_EXPIRATION") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::Invalid("JWT_EXPIRATION", e.to_string()))?,
            Err(_) => 86_400,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let app_id = env::var("APP_ID").unwrap_or_else(|_| DEFAULT_APP_ID.to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid("PORT", e.to_string()))?,
            Err(_) => 3000,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            app_id,
            port,
        })
    }
}
