use std::env;
use std::fmt;

const DEFAULT_TOKEN_TTL_MINUTES: u32 = 10;

/// Runtime configuration, read from the environment (and `.env` via `dotenv`).
#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Postgres URL for the document store. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Secret used to sign and verify tokens.
    pub token_secret: String,
    /// Secret that signed tokens before the last rotation, still accepted by the verifier.
    pub token_previous_secret: Option<String>,
    pub token_ttl_minutes: u32,
    pub bcrypt_cost: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token_secret = non_empty("TOKEN_SECRET").ok_or(ConfigError::Missing("TOKEN_SECRET"))?;

        let token_ttl_minutes = parse_or(&non_empty, "TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        if token_ttl_minutes == 0 {
            return Err(ConfigError::Invalid("TOKEN_TTL_MINUTES", "0".into()));
        }

        let bcrypt_cost = parse_or(&non_empty, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST", bcrypt_cost.to_string()));
        }

        Ok(Self {
            server_host: non_empty("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&non_empty, "SERVER_PORT", 8080)?,
            database_url: non_empty("DATABASE_URL"),
            token_secret,
            token_previous_secret: non_empty("TOKEN_PREVIOUS_SECRET"),
            token_ttl_minutes,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("token_secret", &"<redacted>")
            .field("token_previous_secret", &self.token_previous_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key, raw)),
        None => Ok(default),
    }
}
