use std::{any::type_name_of_val, fmt, sync::Arc};

use futures::future::join_all;
use photoalbum_model::{
    AlbumName, FavouriteUpdateResponse, Image, ImageFilter, ImageID, NewImage,
    Page, PageRequest, DEFAULT_PAGE_SIZE,
};
use tracing::{error, info, warn};

use crate::{
    database::ports::{AlbumRepository, ImageRepository},
    error::{PhotoError, Result},
    media_host::{MediaHost, StoredAsset, UploadFile, UploadPolicy},
};

pub struct ImageService {
    images: Arc<dyn ImageRepository>,
    albums: Arc<dyn AlbumRepository>,
    media_host: Arc<dyn MediaHost>,
    policy: UploadPolicy,
    page_size: u32,
}

impl fmt::Debug for ImageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageService")
            .field("image_repository", &type_name_of_val(self.images.as_ref()))
            .field("album_repository", &type_name_of_val(self.albums.as_ref()))
            .field("media_host", &type_name_of_val(self.media_host.as_ref()))
            .field("policy", &self.policy)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl ImageService {
    pub fn new(
        images: Arc<dyn ImageRepository>,
        albums: Arc<dyn AlbumRepository>,
        media_host: Arc<dyn MediaHost>,
    ) -> Self {
        Self {
            images,
            albums,
            media_host,
            policy: UploadPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Builds a page request from a raw `?page=` query value.
    pub fn page_request(&self, raw: Option<&str>) -> PageRequest {
        PageRequest::from_query(raw, self.page_size)
    }

    pub async fn list_images(&self, page: PageRequest) -> Result<Page<Image>> {
        self.images.list_images(&ImageFilter::All, page).await
    }

    pub async fn image_count(&self) -> Result<u64> {
        self.images.count_images(&ImageFilter::All).await
    }

    pub async fn list_favourites(&self, page: PageRequest) -> Result<Page<Image>> {
        self.images.list_images(&ImageFilter::Favourites, page).await
    }

    pub async fn list_album_images(
        &self,
        raw_album: &str,
        page: PageRequest,
    ) -> Result<Page<Image>> {
        let album = AlbumName::parse(raw_album)?;
        self.images.list_images(&ImageFilter::Album(album), page).await
    }

    /// Most recent image in the album, used as its cover.
    pub async fn album_cover(&self, raw_album: &str) -> Result<Option<Image>> {
        let album = AlbumName::parse(raw_album)?;
        self.images.latest_in_album(&album).await
    }

    /// Uploads every file to the media host and records one image per asset.
    ///
    /// The batch is validated up front. If any upload or insert fails, assets
    /// that were uploaded but not recorded are destroyed again.
    pub async fn upload_images(&self, files: Vec<UploadFile>) -> Result<Page<Image>> {
        self.policy.validate(&files)?;
        info!(count = files.len(), "uploading images");

        let results =
            join_all(files.into_iter().map(|file| self.media_host.upload(file))).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(asset) => stored.push(asset),
                Err(e) if failure.is_none() => failure = Some(e),
                Err(e) => warn!(error = %e, "additional upload failure"),
            }
        }
        if let Some(e) = failure {
            error!(error = %e, uploaded = stored.len(), "upload batch failed");
            self.discard_assets(&stored).await;
            return Err(e);
        }

        for (index, asset) in stored.iter().enumerate() {
            let new_image = NewImage {
                filename: asset.public_id.clone(),
                url: asset.secure_url.clone(),
            };
            if let Err(e) = self.images.insert_image(new_image).await {
                error!(error = %e, public_id = %asset.public_id, "failed to record uploaded image");
                self.discard_assets(&stored[index..]).await;
                return Err(e);
            }
        }
        info!(count = stored.len(), "images saved");

        self.list_images(PageRequest::first(self.page_size)).await
    }

    async fn discard_assets(&self, assets: &[StoredAsset]) {
        for asset in assets {
            if let Err(e) = self.media_host.destroy(&asset.public_id).await {
                warn!(public_id = %asset.public_id, error = %e, "failed to discard orphaned asset");
            }
        }
    }

    /// Destroys the hosted asset, then the record.
    pub async fn delete_image(&self, id: ImageID) -> Result<()> {
        let image = self
            .images
            .get_image(id)
            .await?
            .ok_or_else(PhotoError::image_not_found)?;

        if !image.filename.is_empty() {
            self.media_host.destroy(&image.filename).await?;
        }
        self.images.delete_image(id).await?;
        info!(image_id = %id, "deleted image");
        Ok(())
    }

    pub async fn set_favourite(
        &self,
        id: ImageID,
        is_favourite: bool,
    ) -> Result<FavouriteUpdateResponse> {
        self.images
            .set_favourite(id, is_favourite)
            .await?
            .ok_or_else(PhotoError::image_not_found)?;

        let images = self.images.all_images().await?;
        let fav_count = self.images.count_images(&ImageFilter::Favourites).await?;
        Ok(FavouriteUpdateResponse { images, fav_count })
    }

    /// Adds the image to every named album. Unknown albums are rejected.
    pub async fn add_to_albums(&self, id: ImageID, raw_albums: &[String]) -> Result<Image> {
        if raw_albums.is_empty() {
            return Err(PhotoError::InvalidInput(
                "At least one album is required".to_string(),
            ));
        }

        let mut albums: Vec<AlbumName> = Vec::with_capacity(raw_albums.len());
        for raw in raw_albums {
            let name = AlbumName::parse(raw)?;
            if albums.contains(&name) {
                continue;
            }
            if self.albums.get_album(&name).await?.is_none() {
                return Err(PhotoError::album_not_found(&name));
            }
            albums.push(name);
        }

        let image = self
            .images
            .add_to_albums(id, &albums)
            .await?
            .ok_or_else(PhotoError::image_not_found)?;
        info!(image_id = %id, albums = ?image.albums, "added image to albums");
        Ok(image)
    }

    pub async fn remove_from_album(&self, id: ImageID, raw_album: &str) -> Result<Image> {
        let album = AlbumName::parse(raw_album)?;
        self.images
            .remove_from_album(id, &album)
            .await?
            .ok_or_else(PhotoError::image_not_found)
    }
}
