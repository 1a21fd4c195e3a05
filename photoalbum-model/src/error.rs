use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A user supplied album name failed validation.
    InvalidAlbumName(String),
    /// A path or body value could not be parsed as an image id.
    InvalidImageId(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidAlbumName(msg) => write!(f, "{msg}"),
            ModelError::InvalidImageId(raw) => {
                write!(f, "invalid image id: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
