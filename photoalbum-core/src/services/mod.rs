mod albums;
mod images;

pub use albums::AlbumService;
pub use images::ImageService;
