//! External media host integration.
//!
//! Binary storage, transformations and CDN delivery live on the media host.
//! The service only keeps the host's public id and delivery URL for each
//! asset.

mod cloudinary;
mod memory;
mod policy;

pub use cloudinary::{
    CloudinaryConfig, CloudinaryMediaHost, DEFAULT_API_BASE, DEFAULT_FOLDER,
};
pub use memory::InMemoryMediaHost;
pub use policy::UploadPolicy;

use async_trait::async_trait;

use crate::error::Result;

/// A file received from the client, held in memory until it is handed to the
/// media host.
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// Lowercased format name, taken from the file extension and falling back
    /// to the `image/*` content subtype.
    pub fn format(&self) -> Option<String> {
        let from_extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty());

        from_extension.or_else(|| {
            let content_type = self.content_type.as_deref()?;
            let subtype = content_type.strip_prefix("image/")?;
            let subtype = subtype
                .split(['+', ';'])
                .next()
                .unwrap_or(subtype)
                .trim()
                .to_ascii_lowercase();
            (!subtype.is_empty()).then_some(subtype)
        })
    }
}

/// Identity of an asset stored on the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub public_id: String,
    pub secure_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<StoredAsset>;
    /// Removes an asset. Deleting an asset the host no longer has succeeds.
    async fn destroy(&self, public_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: Option<&str>) -> UploadFile {
        UploadFile::new(name, content_type.map(str::to_string), vec![1, 2, 3])
    }

    #[test]
    fn format_prefers_extension() {
        assert_eq!(file("photo.JPG", Some("image/png")).format().as_deref(), Some("jpg"));
        assert_eq!(file("a.b.webp", None).format().as_deref(), Some("webp"));
    }

    #[test]
    fn format_falls_back_to_content_type() {
        assert_eq!(file("blob", Some("image/svg+xml")).format().as_deref(), Some("svg"));
        assert_eq!(file("blob", Some("image/jpeg")).format().as_deref(), Some("jpeg"));
        assert_eq!(file("blob", Some("application/pdf")).format(), None);
        assert_eq!(file("noextension", None).format(), None);
    }
}
