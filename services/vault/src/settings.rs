//! Service configuration loaded from environment variables
//!
//! Connection string, database name, signing secret and listen port have no
//! defaults: startup fails when any of them is missing. Pool tuning, token
//! lifetime and CORS origins are optional.

use anyhow::{Context, Result};
use common::DatabaseConfig;
use config::{Config, Environment};
use serde::Deserialize;

use crate::jwt::JwtConfig;

/// Environment as seen through the `config` crate. Keys are lowercased
/// variable names.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    database_url: Option<String>,
    database_name: Option<String>,
    database_max_connections: Option<u32>,
    database_min_connections: Option<u32>,
    database_connection_timeout: Option<u64>,
    jwt_secret: Option<String>,
    jwt_token_expiry: Option<u64>,
    port: Option<u16>,
    cors_allowed_origins: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Origins allowed to make cross-origin requests
    pub cors_allowed_origins: Vec<String>,
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

impl Settings {
    /// Load settings from the process environment
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: PostgreSQL connection URL (required)
    /// - `DATABASE_NAME`: database to use (required)
    /// - `JWT_SECRET`: token signing secret (required)
    /// - `PORT`: listen port (required)
    /// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
    /// - `DATABASE_MIN_CONNECTIONS`: idle connections kept (default: 1)
    /// - `DATABASE_CONNECTION_TIMEOUT`: acquire timeout in seconds (default: 30)
    /// - `JWT_TOKEN_EXPIRY`: token lifetime in seconds (default: 86400, max: one year)
    /// - `CORS_ALLOWED_ORIGINS`: comma-separated list of origins (default: none)
    pub fn from_env() -> Result<Self> {
        let raw: RawSettings = Config::builder()
            .add_source(Environment::default())
            .build()
            .context("Failed to read environment")?
            .try_deserialize()
            .context("Invalid configuration value")?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let database_url = required(raw.database_url, "DATABASE_URL")?;
        let database_name = required(raw.database_name, "DATABASE_NAME")?;
        let jwt_secret = required(raw.jwt_secret, "JWT_SECRET")?;
        let port = raw
            .port
            .ok_or_else(|| anyhow::anyhow!("PORT environment variable not set"))?;

        let mut database = DatabaseConfig::new(database_url, database_name);
        if let Some(max) = raw.database_max_connections {
            database.max_connections = max;
        }
        if let Some(min) = raw.database_min_connections {
            database.min_connections = min;
        }
        if let Some(timeout) = raw.database_connection_timeout {
            database.connection_timeout = timeout;
        }
        if database.min_connections > database.max_connections {
            anyhow::bail!(
                "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                database.min_connections,
                database.max_connections
            );
        }

        let mut jwt = JwtConfig::new(jwt_secret);
        if let Some(expiry) = raw.jwt_token_expiry {
            if expiry == 0 {
                anyhow::bail!("JWT_TOKEN_EXPIRY must be greater than zero");
            }
            if expiry > JwtConfig::MAX_TOKEN_EXPIRY {
                anyhow::bail!(
                    "JWT_TOKEN_EXPIRY ({}) exceeds the maximum of {} seconds",
                    expiry,
                    JwtConfig::MAX_TOKEN_EXPIRY
                );
            }
            jwt.token_expiry = expiry;
        }

        let cors_allowed_origins = raw
            .cors_allowed_origins
            .as_deref()
            .map(parse_origins)
            .unwrap_or_default();

        Ok(Settings {
            server: ServerConfig {
                port,
                cors_allowed_origins,
            },
            database,
            jwt,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => anyhow::bail!("{} environment variable not set", name),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
