use async_trait::async_trait;
use chrono::{DateTime, Utc};
use photoalbum_model::{
    AlbumName, Image, ImageFilter, ImageID, NewImage, Page, PageRequest,
};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::{
    database::ports::ImageRepository,
    error::{PhotoError, Result},
};

const IMAGE_COLUMNS: &str =
    "id, filename, url, is_favourite, albums, created_at";

#[derive(Debug, FromRow)]
struct ImageRow {
    id: Uuid,
    filename: String,
    url: String,
    is_favourite: bool,
    albums: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ImageRow> for Image {
    type Error = PhotoError;

    fn try_from(row: ImageRow) -> Result<Self> {
        let albums = row
            .albums
            .iter()
            .map(|name| AlbumName::parse(name))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                PhotoError::Internal(format!(
                    "image {} has a malformed album name: {e}",
                    row.id
                ))
            })?;

        Ok(Image {
            id: ImageID(row.id),
            filename: row.filename,
            url: row.url,
            is_favourite: row.is_favourite,
            albums,
            created_at: row.created_at,
        })
    }
}

fn map_rows(rows: Vec<ImageRow>) -> Result<Vec<Image>> {
    rows.into_iter().map(Image::try_from).collect()
}

/// Splits a filter into the two nullable predicates the listing queries use.
fn filter_binds(filter: &ImageFilter) -> (bool, Option<&str>) {
    match filter {
        ImageFilter::All => (false, None),
        ImageFilter::Favourites => (true, None),
        ImageFilter::Album(name) => (false, Some(name.as_str())),
    }
}

#[derive(Clone, Debug)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    async fn insert_image(&self, image: NewImage) -> Result<Image> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "INSERT INTO images (id, filename, url) VALUES ($1, $2, $3) \
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(ImageID::new().to_uuid())
        .bind(&image.filename)
        .bind(&image.url)
        .fetch_one(&self.pool)
        .await?;

        debug!(image_id = %row.id, filename = %row.filename, "stored image");
        row.try_into()
    }

    async fn get_image(&self, id: ImageID) -> Result<Option<Image>> {
        sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?
        .map(Image::try_from)
        .transpose()
    }

    async fn list_images(
        &self,
        filter: &ImageFilter,
        page: PageRequest,
    ) -> Result<Page<Image>> {
        let count = self.count_images(filter).await?;
        let (favourites_only, album) = filter_binds(filter);

        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images \
             WHERE ($1::boolean IS FALSE OR is_favourite) \
               AND ($2::text IS NULL OR albums @> ARRAY[$2::text]) \
             ORDER BY id DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(favourites_only)
        .bind(album)
        .bind(i64::from(page.limit))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(map_rows(rows)?, page, count))
    }

    async fn latest_in_album(&self, album: &AlbumName) -> Result<Option<Image>> {
        sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images \
             WHERE albums @> ARRAY[$1::text] \
             ORDER BY id DESC LIMIT 1"
        ))
        .bind(album.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Image::try_from)
        .transpose()
    }

    async fn all_images(&self) -> Result<Vec<Image>> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows)
    }

    async fn count_images(&self, filter: &ImageFilter) -> Result<u64> {
        let (favourites_only, album) = filter_binds(filter);
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM images \
             WHERE ($1::boolean IS FALSE OR is_favourite) \
               AND ($2::text IS NULL OR albums @> ARRAY[$2::text])",
        )
        .bind(favourites_only)
        .bind(album)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn set_favourite(
        &self,
        id: ImageID,
        is_favourite: bool,
    ) -> Result<Option<Image>> {
        sqlx::query_as::<_, ImageRow>(&format!(
            "UPDATE images SET is_favourite = $2 WHERE id = $1 \
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .bind(is_favourite)
        .fetch_optional(&self.pool)
        .await?
        .map(Image::try_from)
        .transpose()
    }

    async fn add_to_albums(
        &self,
        id: ImageID,
        albums: &[AlbumName],
    ) -> Result<Option<Image>> {
        let mut names: Vec<String> = Vec::with_capacity(albums.len());
        for album in albums {
            if !names.iter().any(|n| n == album.as_str()) {
                names.push(album.as_str().to_string());
            }
        }

        sqlx::query_as::<_, ImageRow>(&format!(
            "UPDATE images SET albums = albums || ARRAY( \
                 SELECT t.name FROM unnest($2::text[]) WITH ORDINALITY AS t(name, ord) \
                 WHERE NOT (t.name = ANY(images.albums)) \
                 ORDER BY t.ord) \
             WHERE id = $1 \
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .bind(names)
        .fetch_optional(&self.pool)
        .await?
        .map(Image::try_from)
        .transpose()
    }

    async fn remove_from_album(
        &self,
        id: ImageID,
        album: &AlbumName,
    ) -> Result<Option<Image>> {
        sqlx::query_as::<_, ImageRow>(&format!(
            "UPDATE images SET albums = array_remove(albums, $2) WHERE id = $1 \
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .bind(album.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Image::try_from)
        .transpose()
    }

    async fn delete_image(&self, id: ImageID) -> Result<bool> {
        let res = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
