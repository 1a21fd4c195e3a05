pub mod memory;
pub mod ports;
pub mod postgres;

pub use memory::InMemoryPhotoStore;
pub use ports::{AlbumRepository, ImageRepository};
pub use postgres::{
    PostgresAlbumRepository, PostgresDatabase, PostgresImageRepository,
};
