//! Process configuration read from environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use invoify_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEV_JWT_SECRET: &str = "invoify-dev-secret";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 7 * 24 * 60;
pub const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required when {reason}")]
    Missing { key: &'static str, reason: &'static str },

    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// True when `JWT_SECRET` was unset and the development secret is in use.
    pub jwt_secret_defaulted: bool,
    pub session_ttl: Duration,
    pub store: StoreBackend,
    pub log_format: LogFormat,
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: SocketAddr = match get("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::invalid("BIND_ADDR", &raw, e))?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", DEFAULT_BIND_ADDR, e))?,
        };

        let (jwt_secret, jwt_secret_defaulted) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let ttl_minutes = match get("SESSION_TTL_MINUTES") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(minutes) if (1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) => minutes,
                Ok(_) => {
                    return Err(ConfigError::invalid(
                        "SESSION_TTL_MINUTES",
                        &raw,
                        format!("must be between 1 and {MAX_SESSION_TTL_MINUTES}"),
                    ));
                }
                Err(e) => return Err(ConfigError::invalid("SESSION_TTL_MINUTES", &raw, e)),
            },
            None => DEFAULT_SESSION_TTL_MINUTES,
        };
        let session_ttl = Duration::try_minutes(ttl_minutes).ok_or_else(|| {
            ConfigError::invalid("SESSION_TTL_MINUTES", &ttl_minutes.to_string(), "out of range")
        })?;

        let store = match get("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("postgres") => {
                let url = get("DATABASE_URL").ok_or(ConfigError::Missing {
                    key: "DATABASE_URL",
                    reason: "STORE_BACKEND=postgres",
                })?;
                let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => match raw.parse::<u32>() {
                        Ok(n) if n > 0 => n,
                        Ok(_) => {
                            return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", &raw, "must be positive"));
                        }
                        Err(e) => return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", &raw, e)),
                    },
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                StoreBackend::Postgres { url, max_connections }
            }
            Some(other) => {
                return Err(ConfigError::invalid(
                    "STORE_BACKEND",
                    other,
                    "expected `memory` or `postgres`",
                ));
            }
        };

        let log_format: LogFormat = match get("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::invalid("LOG_FORMAT", &raw, e))?,
            None => LogFormat::default(),
        };

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                Ok(_) => return Err(ConfigError::invalid("BCRYPT_COST", &raw, "must be between 4 and 31")),
                Err(e) => return Err(ConfigError::invalid("BCRYPT_COST", &raw, e)),
            },
            None => invoify_auth::password::DEFAULT_COST,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_secret_defaulted,
            session_ttl,
            store,
            log_format,
            bcrypt_cost,
        })
    }
}
