//! Core data model definitions shared across the photo album crates.
#![allow(missing_docs)]

pub mod album;
pub mod api;
pub mod error;
pub mod ids;
pub mod image;
pub mod page;

pub use album::{ALBUM_NAME_MAX_CHARS, ALBUM_NAME_MIN_CHARS, Album, AlbumName};
pub use api::{
    CreateAlbumRequest, FavouriteUpdateResponse, MessageResponse,
    UpdateFavouriteRequest, UpdateImageAlbumsRequest,
};
pub use error::{ModelError, Result as ModelResult};
pub use ids::ImageID;
pub use image::{Image, ImageFilter, NewImage};
pub use page::{DEFAULT_PAGE_SIZE, Page, PageRequest};
