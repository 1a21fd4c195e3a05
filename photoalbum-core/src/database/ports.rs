use async_trait::async_trait;
use photoalbum_model::{
    Album, AlbumName, Image, ImageFilter, ImageID, NewImage, Page, PageRequest,
};

use crate::error::Result;

/// Repository port for image metadata.
///
/// Listings are newest first. Album membership updates have set semantics so
/// adapters never store the same album twice on one image.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn insert_image(&self, image: NewImage) -> Result<Image>;
    async fn get_image(&self, id: ImageID) -> Result<Option<Image>>;
    async fn list_images(
        &self,
        filter: &ImageFilter,
        page: PageRequest,
    ) -> Result<Page<Image>>;
    async fn latest_in_album(&self, album: &AlbumName) -> Result<Option<Image>>;
    async fn all_images(&self) -> Result<Vec<Image>>;
    async fn count_images(&self, filter: &ImageFilter) -> Result<u64>;

    async fn set_favourite(
        &self,
        id: ImageID,
        is_favourite: bool,
    ) -> Result<Option<Image>>;
    async fn add_to_albums(
        &self,
        id: ImageID,
        albums: &[AlbumName],
    ) -> Result<Option<Image>>;
    async fn remove_from_album(
        &self,
        id: ImageID,
        album: &AlbumName,
    ) -> Result<Option<Image>>;
    async fn delete_image(&self, id: ImageID) -> Result<bool>;
}

/// Repository port for albums. Albums are keyed by their normalized name.
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    async fn list_albums(&self) -> Result<Vec<Album>>;
    async fn get_album(&self, name: &AlbumName) -> Result<Option<Album>>;
    /// Fails with [`crate::PhotoError::Conflict`] when the name is taken.
    async fn create_album(&self, name: AlbumName) -> Result<Album>;
    /// Deletes the album and pulls it from every image as one atomic step.
    /// Returns the number of images touched, or `None` when no album has
    /// that name.
    async fn delete_album(&self, name: &AlbumName) -> Result<Option<u64>>;
}
