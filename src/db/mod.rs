use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub mod balances;
pub mod withdrawals;

/// Store-level failures. `DuplicateKey` and `LockUnavailable` are surfaced
/// distinctly so the engine can give them business meaning; everything else
/// is an opaque persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key")]
    DuplicateKey,
    #[error("lock unavailable")]
    LockUnavailable,
    #[error("row not found")]
    RowNotFound,
    #[error("failed to decode row: {0}")]
    Decode(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Database client wrapper
#[derive(Clone)]
pub struct DbClient {
    pub pool: PgPool,
}

impl DbClient {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
