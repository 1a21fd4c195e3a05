use photoalbum_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error(transparent)]
    Validation(#[from] ModelError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Media host error: {0}")]
    MediaHost(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PhotoError {
    pub fn image_not_found() -> Self {
        PhotoError::NotFound("Image not found".to_string())
    }

    pub fn album_not_found(name: impl std::fmt::Display) -> Self {
        PhotoError::NotFound(format!("Album '{name}' not found"))
    }
}

impl From<reqwest::Error> for PhotoError {
    fn from(err: reqwest::Error) -> Self {
        PhotoError::MediaHost(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PhotoError>;
