//! Database configuration from the environment.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::error::{LedgerError, Result};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings for the shared relational store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Read configuration from the environment (`.env` honoured).
    ///
    /// `DATABASE_URL` is required; `DATABASE_MAX_CONNECTIONS` is optional.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| LedgerError::Config("DATABASE_URL is not set".into()))?;

        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse::<u32>().map_err(|_| {
                LedgerError::Config(format!("invalid DATABASE_MAX_CONNECTIONS: {raw}"))
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            url,
            max_connections,
            acquire_timeout: Duration::from_secs(5),
        })
    }

    /// Build a connection pool from this configuration.
    pub async fn connect(&self) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.url)
            .await?;

        tracing::info!(max_connections = self.max_connections, "database pool ready");
        Ok(pool)
    }
}
