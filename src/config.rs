use std::collections::HashMap;
use std::fmt;

use sqlx::postgres::PgConnectOptions;

use crate::shared::AppError;

/// Connection settings for the user store
#[derive(Clone, PartialEq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub db_name: String,
}

impl DatabaseConfig {
    /// Reads the settings from `AUTH_DB_*` environment variables, falling back to local defaults
    pub fn from_env() -> Self {
        let port = std::env::var("AUTH_DB_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5432);

        Self {
            user: std::env::var("AUTH_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("AUTH_DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
            host: std::env::var("AUTH_DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            db_name: std::env::var("AUTH_DB_NAME").unwrap_or_else(|_| "user_auth".to_string()),
        }
    }

    /// Builds the settings from a key/value map with keys `user`, `password`, `host`, `port`, `db_name`
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, AppError> {
        let get = |key: &str| {
            values
                .get(key)
                .cloned()
                .ok_or_else(|| AppError::InvalidInput(format!("missing config key: {}", key)))
        };

        let port = get("port")?
            .parse::<u16>()
            .map_err(|e| AppError::InvalidInput(format!("invalid port: {}", e)))?;

        Ok(Self {
            user: get("user")?,
            password: get("password")?,
            host: get("host")?,
            port,
            db_name: get("db_name")?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.db_name)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_name", &self.db_name)
            .finish()
    }
}

/// Which user store backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Process level settings for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreKind,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let store = match std::env::var("USER_STORE").as_deref() {
            Ok("memory") => StoreKind::Memory,
            _ => StoreKind::Postgres,
        };

        Self { port, store }
    }
}
