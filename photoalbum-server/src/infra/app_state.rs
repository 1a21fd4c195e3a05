use std::{fmt, sync::Arc};

use photoalbum_core::{
    AlbumService, ImageService, InMemoryPhotoStore, MediaHost,
};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub albums: Arc<AlbumService>,
    pub images: Arc<ImageService>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("page_size", &self.images.page_size())
            .field("dev_mode", &self.config.dev_mode)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        albums: AlbumService,
        images: ImageService,
        config: Config,
    ) -> Self {
        Self {
            albums: Arc::new(albums),
            images: Arc::new(images),
            config: Arc::new(config),
        }
    }

    /// State backed by a fresh in-memory store. Used in dev mode without a
    /// database and by the integration tests.
    pub fn in_memory(media_host: Arc<dyn MediaHost>, config: Config) -> Self {
        let store = Arc::new(InMemoryPhotoStore::new());
        let albums = AlbumService::new(store.clone());
        let images = ImageService::new(store.clone(), store, media_host)
            .with_policy(config.upload_policy.clone())
            .with_page_size(config.page_size);
        Self::new(albums, images, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
