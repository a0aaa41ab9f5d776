use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::Storage;
use crate::error::{Error, Kind, Meta};

const OP_OPEN: &str = "postgres.open";

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed storage
pub struct Postgres {
    source: String,
    pool: Option<PgPool>,
}

impl Postgres {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pool: None,
        }
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn open(&mut self) -> Result<(), Error> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&self.source)
            .await
            .map_err(|e| Error::new(OP_OPEN, Kind::DatabaseFailure, e, Meta::new()))?;

        tracing::info!("storage opened");
        self.pool = Some(pool);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Error> {
        let Some(pool) = self.pool.take() else {
            return Ok(());
        };
        pool.close().await;
        tracing::info!("storage closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_with_bad_source_is_database_failure() {
        let mut storage = Postgres::new("not a connection string");
        let err = storage.open().await.unwrap_err();
        assert_eq!(err.kind(), Kind::DatabaseFailure);
        assert_eq!(err.ops()[0].as_str(), OP_OPEN);
        assert!(storage.pool.is_none());
    }

    #[tokio::test]
    async fn close_without_open_is_ok() {
        let mut storage = Postgres::new("postgres://localhost/vocabking");
        assert!(storage.close().await.is_ok());
    }
}
