//! Persistence, media host integration and application services for the
//! photo album service.
//!
//! Image and album metadata live behind the [`ImageRepository`] and
//! [`AlbumRepository`] ports, with a PostgreSQL adapter for deployments and
//! an in-memory adapter for dev mode and tests. Binary storage is delegated
//! to a [`MediaHost`].

pub mod database;
pub mod error;
pub mod media_host;
pub mod services;

pub use database::{
    AlbumRepository, ImageRepository, InMemoryPhotoStore, PostgresDatabase,
};
pub use error::{PhotoError, Result};
pub use media_host::{
    CloudinaryConfig, CloudinaryMediaHost, InMemoryMediaHost, MediaHost,
    StoredAsset, UploadFile, UploadPolicy,
};
pub use services::{AlbumService, ImageService};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
