//! Gateway configuration
//!
//! Defaults suit local development. Every field can be overridden from the
//! environment (or a `.env` file); malformed values fail startup.

use persistence::StoreConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_JWT_SECRET: &str = "ledger-dev-secret";

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

/// Token bucket shape for one class of request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    pub capacity: u32,
    pub refill_per_sec: f64,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub db_max_connections: u32,
    /// Bound on each store call
    pub db_timeout: Duration,
    pub db_max_lifetime: Duration,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Keyed by username
    pub login_limit: RateLimit,
    /// Keyed by authenticated user
    pub trade_limit: RateLimit,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: "sqlite://ledger.db".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(60 * 60),
            db_max_connections: 8,
            db_timeout: Duration::from_secs(5),
            db_max_lifetime: Duration::from_secs(30 * 60),
            log_level: "info".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            login_limit: RateLimit {
                capacity: 10,
                refill_per_sec: 0.2,
            },
            trade_limit: RateLimit {
                capacity: 20,
                refill_per_sec: 20.0,
            },
        }
    }
}

impl GatewayConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse(&lookup, "LEDGER_BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(url) = non_empty(&lookup, "LEDGER_DATABASE_URL")? {
            config.database_url = url;
        }
        if let Some(secret) = non_empty(&lookup, "LEDGER_JWT_SECRET")? {
            config.jwt_secret = secret;
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "LEDGER_TOKEN_TTL_SECS")? {
            config.token_ttl = Duration::from_secs(secs);
        }
        if let Some(max) = parse(&lookup, "LEDGER_DB_MAX_CONNECTIONS")? {
            config.db_max_connections = max;
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "LEDGER_DB_TIMEOUT_MS")? {
            config.db_timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "LEDGER_DB_MAX_LIFETIME_SECS")? {
            config.db_max_lifetime = Duration::from_secs(secs);
        }
        if let Some(level) = non_empty(&lookup, "LEDGER_LOG")? {
            config.log_level = level;
        }
        if let Some(cost) = parse(&lookup, "LEDGER_BCRYPT_COST")? {
            config.bcrypt_cost = cost;
        }
        if let Some(capacity) = parse(&lookup, "LEDGER_LOGIN_BURST")? {
            config.login_limit.capacity = capacity;
        }
        if let Some(capacity) = parse(&lookup, "LEDGER_TRADE_BURST")? {
            config.trade_limit.capacity = capacity;
        }

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LEDGER_DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&config.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "LEDGER_BCRYPT_COST",
                value: config.bcrypt_cost.to_string(),
            });
        }
        if config.token_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "LEDGER_TOKEN_TTL_SECS",
                value: "0".to_string(),
            });
        }
        Ok(config)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url.clone(),
            max_connections: self.db_max_connections,
            operation_timeout: self.db_timeout,
            max_lifetime: self.db_max_lifetime,
            ..StoreConfig::default()
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

fn non_empty<F>(lookup: &F, key: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::Empty { key }),
        Some(raw) => Ok(Some(raw.trim().to_string())),
    }
}
