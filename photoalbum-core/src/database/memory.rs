use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use photoalbum_model::{
    Album, AlbumName, Image, ImageFilter, ImageID, NewImage, Page, PageRequest,
};

use crate::{
    database::ports::{AlbumRepository, ImageRepository},
    error::{PhotoError, Result},
};

/// Process-local store implementing both repository ports.
///
/// Backs dev mode and the test suites. Images are keyed by their UUIDv7 id,
/// so reverse iteration over the map is newest first.
#[derive(Debug, Default)]
pub struct InMemoryPhotoStore {
    images: RwLock<BTreeMap<ImageID, Image>>,
    albums: RwLock<Vec<Album>>,
}

impl InMemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_image<F>(&self, id: ImageID, apply: F) -> Option<Image>
    where
        F: FnOnce(&mut Image),
    {
        let mut images = self.images.write();
        let image = images.get_mut(&id)?;
        apply(image);
        Some(image.clone())
    }
}

#[async_trait]
impl ImageRepository for InMemoryPhotoStore {
    async fn insert_image(&self, image: NewImage) -> Result<Image> {
        let image = Image::from_new(image);
        self.images.write().insert(image.id, image.clone());
        Ok(image)
    }

    async fn get_image(&self, id: ImageID) -> Result<Option<Image>> {
        Ok(self.images.read().get(&id).cloned())
    }

    async fn list_images(
        &self,
        filter: &ImageFilter,
        page: PageRequest,
    ) -> Result<Page<Image>> {
        let images = self.images.read();
        let matching: Vec<&Image> =
            images.values().rev().filter(|img| filter.matches(img)).collect();
        let count = matching.len() as u64;

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let slice = matching
            .into_iter()
            .skip(offset)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(Page::new(slice, page, count))
    }

    async fn latest_in_album(&self, album: &AlbumName) -> Result<Option<Image>> {
        Ok(self
            .images
            .read()
            .values()
            .rev()
            .find(|img| img.in_album(album))
            .cloned())
    }

    async fn all_images(&self) -> Result<Vec<Image>> {
        Ok(self.images.read().values().rev().cloned().collect())
    }

    async fn count_images(&self, filter: &ImageFilter) -> Result<u64> {
        Ok(self
            .images
            .read()
            .values()
            .filter(|img| filter.matches(img))
            .count() as u64)
    }

    async fn set_favourite(
        &self,
        id: ImageID,
        is_favourite: bool,
    ) -> Result<Option<Image>> {
        Ok(self.update_image(id, |img| img.is_favourite = is_favourite))
    }

    async fn add_to_albums(
        &self,
        id: ImageID,
        albums: &[AlbumName],
    ) -> Result<Option<Image>> {
        Ok(self.update_image(id, |img| {
            img.add_albums(albums);
        }))
    }

    async fn remove_from_album(
        &self,
        id: ImageID,
        album: &AlbumName,
    ) -> Result<Option<Image>> {
        Ok(self.update_image(id, |img| {
            img.remove_album(album);
        }))
    }

    async fn delete_image(&self, id: ImageID) -> Result<bool> {
        Ok(self.images.write().remove(&id).is_some())
    }
}

#[async_trait]
impl AlbumRepository for InMemoryPhotoStore {
    async fn list_albums(&self) -> Result<Vec<Album>> {
        Ok(self.albums.read().clone())
    }

    async fn get_album(&self, name: &AlbumName) -> Result<Option<Album>> {
        Ok(self
            .albums
            .read()
            .iter()
            .find(|album| &album.name == name)
            .cloned())
    }

    async fn create_album(&self, name: AlbumName) -> Result<Album> {
        let mut albums = self.albums.write();
        if albums.iter().any(|album| album.name == name) {
            return Err(PhotoError::Conflict(format!(
                "Album '{name}' already exists"
            )));
        }
        let album = Album::new(name);
        albums.push(album.clone());
        Ok(album)
    }

    async fn delete_album(&self, name: &AlbumName) -> Result<Option<u64>> {
        // Both locks are held so no reader sees the album gone but still
        // referenced.
        let mut albums = self.albums.write();
        let mut images = self.images.write();

        let before = albums.len();
        albums.retain(|album| &album.name != name);
        if albums.len() == before {
            return Ok(None);
        }

        let touched = images
            .values_mut()
            .map(|img| img.remove_album(name))
            .filter(|changed| *changed)
            .count();
        Ok(Some(touched as u64))
    }
}
