use std::{any::type_name_of_val, fmt, sync::Arc};

use photoalbum_model::{Album, AlbumName};
use tracing::info;

use crate::{
    database::ports::AlbumRepository,
    error::{PhotoError, Result},
};

pub struct AlbumService {
    albums: Arc<dyn AlbumRepository>,
}

impl fmt::Debug for AlbumService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlbumService")
            .field("album_repository", &type_name_of_val(self.albums.as_ref()))
            .finish()
    }
}

impl AlbumService {
    pub fn new(albums: Arc<dyn AlbumRepository>) -> Self {
        Self { albums }
    }

    pub async fn list_albums(&self) -> Result<Vec<Album>> {
        self.albums.list_albums().await
    }

    pub async fn create_album(&self, raw_name: &str) -> Result<Album> {
        let name = AlbumName::parse(raw_name)?;
        self.albums.create_album(name).await
    }

    /// Deletes the album and pulls it from every image that referenced it.
    pub async fn delete_album(&self, raw_name: &str) -> Result<()> {
        let name = AlbumName::parse(raw_name)?;
        let Some(touched) = self.albums.delete_album(&name).await? else {
            return Err(PhotoError::album_not_found(&name));
        };
        info!(album = %name, images = touched, "deleted album");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{InMemoryPhotoStore, ports::ImageRepository};
    use photoalbum_model::NewImage;

    fn service() -> (AlbumService, Arc<InMemoryPhotoStore>) {
        let store = Arc::new(InMemoryPhotoStore::new());
        (AlbumService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_normalizes_and_rejects_duplicates() {
        let (service, _) = service();
        let album = service.create_album("  Summer 2023 ").await.unwrap();
        assert_eq!(album.name.as_str(), "summer 2023");

        let err = service.create_album("summer 2023").await.unwrap_err();
        assert!(matches!(err, PhotoError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_rejects_invalid_names() {
        let (service, _) = service();
        let err = service.create_album("ab").await.unwrap_err();
        assert_eq!(err.to_string(), "Album name must have at least 3 characters");
    }

    #[tokio::test]
    async fn delete_cascades_to_images() {
        let (service, store) = service();
        service.create_album("beach").await.unwrap();
        service.create_album("family").await.unwrap();

        let image = store
            .insert_image(NewImage {
                filename: "my_images/1".into(),
                url: "https://res.example.com/1.jpg".into(),
            })
            .await
            .unwrap();
        let beach = AlbumName::parse("beach").unwrap();
        let family = AlbumName::parse("family").unwrap();
        store
            .add_to_albums(image.id, &[beach.clone(), family.clone()])
            .await
            .unwrap();

        service.delete_album("Beach").await.unwrap();

        let albums = service.list_albums().await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, family);

        let image = store.get_image(image.id).await.unwrap().unwrap();
        assert_eq!(image.albums, vec![family]);
    }

    #[tokio::test]
    async fn delete_unknown_album_is_not_found() {
        let (service, _) = service();
        let err = service.delete_album("ghost").await.unwrap_err();
        assert!(matches!(err, PhotoError::NotFound(_)));
    }
}
