use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::GpsLogEntry;
use crate::utils::errors::AppError;

#[async_trait]
pub trait GpsLogRepository: Send + Sync {
    async fn insert(&self, entry: &GpsLogEntry) -> Result<(), AppError>;
}

pub struct PgGpsLogRepository {
    pool: PgPool,
}

impl PgGpsLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GpsLogRepository for PgGpsLogRepository {
    async fn insert(&self, entry: &GpsLogEntry) -> Result<(), AppError> {
        sqlx::query("INSERT INTO gps_logs (id, payload, received_at) VALUES ($1, $2, $3)")
            .bind(entry.id)
            .bind(Json(&entry.payload))
            .bind(entry.received_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryGpsLogRepository {
    entries: Arc<RwLock<Vec<GpsLogEntry>>>,
}

impl InMemoryGpsLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<GpsLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl GpsLogRepository for InMemoryGpsLogRepository {
    async fn insert(&self, entry: &GpsLogEntry) -> Result<(), AppError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}
