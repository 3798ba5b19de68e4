use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Where rows live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local tables; data is lost on restart.
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub store_backend: StoreBackend,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub log_dir: PathBuf,
    pub bcrypt_cost: u32,
    /// Lifetime of issued tokens, in seconds.
    pub token_ttl_secs: i64,
    pub messaging_webhook_url: Option<String>,
    pub messaging_default_recipient: String,
}

impl Config {
    /// Defaults for everything except the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.into(),
            store_backend: StoreBackend::Postgres,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            db_max_connections: 10,
            run_migrations: true,
            log_dir: PathBuf::from("logs"),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            token_ttl_secs: 36_000, // 10 hours
            messaging_webhook_url: None,
            messaging_default_recipient: "store-admin".to_string(),
        }
    }

    /// ✅ Load environment variables and apply defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::new(jwt_secret);

        config.store_backend = match optional("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "STORE_BACKEND", value: other.to_string() })
            }
        };

        config.database_url = optional("DATABASE_URL");
        if config.store_backend == StoreBackend::Postgres && config.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        if let Some(addr) = optional("BIND_ADDR") {
            config.bind_addr = parse("BIND_ADDR", addr)?;
        }
        if let Some(max) = optional("DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse("DB_MAX_CONNECTIONS", max)?;
        }
        if let Some(flag) = optional("RUN_MIGRATIONS") {
            config.run_migrations = parse("RUN_MIGRATIONS", flag)?;
        }
        if let Some(dir) = optional("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(cost) = optional("BCRYPT_COST") {
            config.bcrypt_cost = parse("BCRYPT_COST", cost)?;
        }
        if let Some(ttl) = optional("TOKEN_TTL_SECS") {
            config.token_ttl_secs = parse_token_ttl(ttl)?;
        }
        config.messaging_webhook_url = optional("MESSAGING_WEBHOOK_URL");
        if let Some(recipient) = optional("MESSAGING_DEFAULT_RECIPIENT") {
            config.messaging_default_recipient = recipient;
        }

        Ok(config)
    }
}

/// Unset and blank variables are treated the same.
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Token lifetimes must be strictly positive.
fn parse_token_ttl(value: String) -> Result<i64, ConfigError> {
    match value.parse::<i64>() {
        Ok(ttl) if ttl > 0 => Ok(ttl),
        _ => Err(ConfigError::Invalid { name: "TOKEN_TTL_SECS", value }),
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid { name, value })
}
