//! Pool de PostgreSQL
//!
//! Cada ubicación recibida hace una lectura y una escritura de su sesión bajo
//! el lock de esa sesión, así que el pool se dimensiona por buses activos en
//! paralelo. `DATABASE_MAX_CONNECTIONS` y `DATABASE_ACQUIRE_TIMEOUT_SECS`
//! permiten ajustarlo sin recompilar.

use anyhow::{bail, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::environment::parse_var;

const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Espera máxima por una conexión libre; al vencer, la muestra falla con 500
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_limits(url, DEFAULT_MAX_CONNECTIONS, DEFAULT_ACQUIRE_TIMEOUT_SECS)
    }

    fn with_limits(url: impl Into<String>, max_connections: u32, acquire_timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            max_connections,
            min_connections: max_connections.min(2),
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }

    /// Dimensionar el pool desde el entorno
    pub fn from_env(url: impl Into<String>) -> Result<Self> {
        let config = Self::with_limits(
            url,
            parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT_SECS)?,
        );
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        if self.acquire_timeout.is_zero() {
            bail!("DATABASE_ACQUIRE_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }

    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}
