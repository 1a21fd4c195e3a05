use chrono::{DateTime, Utc};

use crate::{album::AlbumName, ids::ImageID};

/// Metadata for an image whose binary lives on the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Image {
    #[cfg_attr(feature = "serde", serde(rename = "_id", alias = "id"))]
    pub id: ImageID,
    /// Public id of the asset on the media host.
    pub filename: String,
    /// Secure delivery URL of the asset.
    pub url: String,
    pub is_favourite: bool,
    /// Album memberships, in the order they were added.
    pub albums: Vec<AlbumName>,
    pub created_at: DateTime<Utc>,
}

impl Image {
    pub fn from_new(new: NewImage) -> Self {
        Self {
            id: ImageID::new(),
            filename: new.filename,
            url: new.url,
            is_favourite: false,
            albums: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn in_album(&self, album: &AlbumName) -> bool {
        self.albums.iter().any(|name| name == album)
    }

    /// Appends albums not already present, preserving existing order.
    /// Returns true when anything changed.
    pub fn add_albums<'a>(
        &mut self,
        albums: impl IntoIterator<Item = &'a AlbumName>,
    ) -> bool {
        let before = self.albums.len();
        for album in albums {
            if !self.in_album(album) {
                self.albums.push(album.clone());
            }
        }
        self.albums.len() != before
    }

    pub fn remove_album(&mut self, album: &AlbumName) -> bool {
        let before = self.albums.len();
        self.albums.retain(|name| name != album);
        self.albums.len() != before
    }
}

/// Insert payload for a freshly uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub filename: String,
    pub url: String,
}

/// Which slice of the image collection a listing covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageFilter {
    #[default]
    All,
    Favourites,
    Album(AlbumName),
}

impl ImageFilter {
    pub fn matches(&self, image: &Image) -> bool {
        match self {
            ImageFilter::All => true,
            ImageFilter::Favourites => image.is_favourite,
            ImageFilter::Album(name) => image.in_album(name),
        }
    }
}
