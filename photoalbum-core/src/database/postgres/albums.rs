use async_trait::async_trait;
use chrono::{DateTime, Utc};
use photoalbum_model::{Album, AlbumName};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::{
    database::ports::AlbumRepository,
    error::{PhotoError, Result},
};

#[derive(Debug, FromRow)]
struct AlbumRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlbumRow> for Album {
    type Error = PhotoError;

    fn try_from(row: AlbumRow) -> Result<Self> {
        let name = AlbumName::parse(&row.name).map_err(|e| {
            PhotoError::Internal(format!("album {} has a malformed name: {e}", row.id))
        })?;
        Ok(Album {
            id: row.id,
            name,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PostgresAlbumRepository {
    pool: PgPool,
}

impl PostgresAlbumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumRepository for PostgresAlbumRepository {
    async fn list_albums(&self) -> Result<Vec<Album>> {
        let rows = sqlx::query_as::<_, AlbumRow>(
            "SELECT id, name, created_at FROM albums ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Album::try_from).collect()
    }

    async fn get_album(&self, name: &AlbumName) -> Result<Option<Album>> {
        sqlx::query_as::<_, AlbumRow>(
            "SELECT id, name, created_at FROM albums WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Album::try_from)
        .transpose()
    }

    async fn create_album(&self, name: AlbumName) -> Result<Album> {
        let album = Album::new(name);
        let result = sqlx::query(
            "INSERT INTO albums (id, name, created_at) VALUES ($1, $2, $3)",
        )
        .bind(album.id)
        .bind(album.name.as_str())
        .bind(album.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(album = %album.name, "created album");
                Ok(album)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(PhotoError::Conflict(format!(
                    "Album '{}' already exists",
                    album.name
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_album(&self, name: &AlbumName) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM albums WHERE name = $1")
            .bind(name.as_str())
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let touched = sqlx::query(
            "UPDATE images SET albums = array_remove(albums, $1) \
             WHERE albums @> ARRAY[$1::text]",
        )
        .bind(name.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(touched.rows_affected()))
    }
}
