//! Database primitives: connection settings, pool wiring and the employee store.

mod store;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use thiserror::Error;

pub use store::{EmployeeChanges, EmployeeStore, SeaOrmEmployeeStore, StoreError, StoreResult};

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL missing")]
    MissingUrl,
    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
    #[error(transparent)]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven pool settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub log_statements: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    8
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: 0,
            connect_timeout_secs: default_connect_timeout_secs(),
            log_statements: false,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(DbError::MissingUrl)?;
        let mut settings = Self::new(url.trim());
        if let Some(raw) = lookup("DATABASE_MAX_CONNECTIONS") {
            settings.max_connections = parse_setting("DATABASE_MAX_CONNECTIONS", &raw)?;
        }
        if let Some(raw) = lookup("DATABASE_MIN_CONNECTIONS") {
            settings.min_connections = parse_setting("DATABASE_MIN_CONNECTIONS", &raw)?;
        }
        if let Some(raw) = lookup("DATABASE_CONNECT_TIMEOUT_SECS") {
            settings.connect_timeout_secs = parse_setting("DATABASE_CONNECT_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("DATABASE_LOG_STATEMENTS") {
            settings.log_statements = matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(settings)
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .max_connections(self.max_connections.max(1))
            .min_connections(self.min_connections.min(self.max_connections.max(1)))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .sqlx_logging(self.log_statements);
        options
    }
}

fn parse_setting<T: std::str::FromStr>(key: &'static str, raw: &str) -> DbResult<T> {
    raw.trim().parse().map_err(|_| DbError::InvalidSetting {
        key,
        value: raw.to_string(),
    })
}

/// Open a pool for the configured database.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let pool = Database::connect(settings.connect_options()).await?;
    tracing::debug!(backend = ?pool.get_database_backend(), "database pool ready");
    Ok(pool)
}

/// Round-trip to the database; used by the health endpoint.
pub async fn ping(pool: &DbPool) -> DbResult<()> {
    pool.ping().await.map_err(Into::into)
}
