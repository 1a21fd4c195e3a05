mod albums;
mod images;

pub use albums::PostgresAlbumRepository;
pub use images::PostgresImageRepository;

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::{MIGRATOR, error::Result};

/// Connection pool plus the repositories built on it.
#[derive(Clone, Debug)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;
        info!(max_connections, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| crate::PhotoError::Database(e.into()))?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn images(&self) -> PostgresImageRepository {
        PostgresImageRepository::new(self.pool.clone())
    }

    pub fn albums(&self) -> PostgresAlbumRepository {
        PostgresAlbumRepository::new(self.pool.clone())
    }
}
