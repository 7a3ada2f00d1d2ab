use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_DATABASE_URL: &str = "postgres:///feedback_app";
// Kept so a bare checkout still boots; never rely on it outside development.
const FALLBACK_SECRET_KEY: &str = "abc123";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub bcrypt_cost: u32,
    pub session_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            info!("DATABASE_URL not set, using default: {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });

        let secret_key = lookup("SECRET_KEY").unwrap_or_else(|| {
            warn!("SECRET_KEY not set, sessions are signed with the built-in development key");
            FALLBACK_SECRET_KEY.to_string()
        });

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let ttl_hours: i64 = parse_or(&lookup, "SESSION_TTL_HOURS", 24 * 31)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                value: ttl_hours.to_string(),
            });
        }

        Ok(Config {
            database_url,
            secret_key,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            bcrypt_cost,
            session_ttl: chrono::Duration::hours(ttl_hours),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
