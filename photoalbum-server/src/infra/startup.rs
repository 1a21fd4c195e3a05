use std::sync::Arc;

use anyhow::{Context, bail};
use photoalbum_core::{
    AlbumService, CloudinaryMediaHost, ImageService, InMemoryMediaHost,
    MediaHost, PostgresDatabase,
};
use tracing::{info, warn};

use crate::infra::{app_state::AppState, config::Config};

/// Picks the media host for the configuration. Cloudinary credentials are
/// required outside dev mode.
pub fn build_media_host(config: &Config) -> anyhow::Result<Arc<dyn MediaHost>> {
    match &config.cloudinary {
        Some(cloudinary) => {
            info!(
                cloud_name = %cloudinary.cloud_name,
                folder = %cloudinary.folder,
                "using Cloudinary media host"
            );
            Ok(Arc::new(CloudinaryMediaHost::new(cloudinary.clone())))
        }
        None if config.dev_mode => {
            warn!("Cloudinary is not configured; dev mode uses an in-memory media host");
            Ok(Arc::new(InMemoryMediaHost::default()))
        }
        None => bail!(
            "Cloudinary is not configured. Set CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET, or run with --dev"
        ),
    }
}

pub async fn connect_database(config: &Config) -> anyhow::Result<Option<PostgresDatabase>> {
    let Some(url) = config.database_url.as_deref() else {
        return Ok(None);
    };

    let db = PostgresDatabase::connect(url, config.database_max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    db.migrate().await.context("failed to apply database migrations")?;
    Ok(Some(db))
}

/// Wires repositories, media host and services into the shared state.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let media_host = build_media_host(&config)?;

    match connect_database(&config).await? {
        Some(db) => {
            let images = Arc::new(db.images());
            let albums = Arc::new(db.albums());

            let album_service = AlbumService::new(albums.clone());
            let image_service = ImageService::new(images, albums, media_host)
                .with_policy(config.upload_policy.clone())
                .with_page_size(config.page_size);
            Ok(AppState::new(album_service, image_service, config))
        }
        None => {
            warn!("DATABASE_URL is not set; image and album metadata are kept in memory and lost on restart");
            Ok(AppState::in_memory(media_host, config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_host_requires_credentials_outside_dev_mode() {
        let config = Config::default();
        assert!(build_media_host(&config).is_err());

        let dev = Config {
            dev_mode: true,
            ..Config::default()
        };
        assert!(build_media_host(&dev).is_ok());
    }

    #[tokio::test]
    async fn state_without_database_is_in_memory() {
        let config = Config {
            dev_mode: true,
            page_size: 4,
            ..Config::default()
        };
        let state = build_state(config).await.unwrap();
        assert_eq!(state.images.page_size(), 4);
        assert_eq!(state.images.image_count().await.unwrap(), 0);
    }
}
