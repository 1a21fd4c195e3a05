use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ModelError, Result};

pub const ALBUM_NAME_MIN_CHARS: usize = 3;
pub const ALBUM_NAME_MAX_CHARS: usize = 20;

/// Normalized album name.
///
/// Album names are the album's identity: images reference albums by name and
/// the store enforces uniqueness on it. Construction trims surrounding
/// whitespace and lowercases, so `"  Summer 2023 "` and `"summer 2023"` name
/// the same album.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct AlbumName(String);

impl AlbumName {
    pub fn parse(raw: &str) -> Result<Self> {
        // Counted before lowercasing, which can change the scalar count
        let trimmed = raw.trim();
        let chars = trimmed.chars().count();

        if chars == 0 {
            return Err(ModelError::InvalidAlbumName(
                "Album must have a name".to_string(),
            ));
        }
        if chars < ALBUM_NAME_MIN_CHARS {
            return Err(ModelError::InvalidAlbumName(format!(
                "Album name must have at least {ALBUM_NAME_MIN_CHARS} characters"
            )));
        }
        if chars > ALBUM_NAME_MAX_CHARS {
            return Err(ModelError::InvalidAlbumName(format!(
                "Album name must have at most {ALBUM_NAME_MAX_CHARS} characters"
            )));
        }

        Ok(AlbumName(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for AlbumName {
    type Error = ModelError;

    fn try_from(raw: String) -> Result<Self> {
        AlbumName::parse(&raw)
    }
}

impl From<AlbumName> for String {
    fn from(name: AlbumName) -> Self {
        name.0
    }
}

impl AsRef<str> for AlbumName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlbumName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named grouping of images.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Album {
    #[cfg_attr(feature = "serde", serde(rename = "_id", alias = "id"))]
    pub id: Uuid,
    pub name: AlbumName,
    pub created_at: DateTime<Utc>,
}

impl Album {
    pub fn new(name: AlbumName) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        let name = AlbumName::parse("  My Album  ").unwrap();
        assert_eq!(name.as_str(), "my album");

        let name = AlbumName::parse("VACATION PHOTOS").unwrap();
        assert_eq!(name.as_str(), "vacation photos");
    }

    #[test]
    fn enforces_length_bounds_after_trimming() {
        assert!(AlbumName::parse("ab").is_err());
        assert!(AlbumName::parse("   ab   ").is_err());
        assert!(AlbumName::parse("abc").is_ok());
        assert!(AlbumName::parse(&"a".repeat(20)).is_ok());
        assert!(AlbumName::parse(&"a".repeat(21)).is_err());
    }

    #[test]
    fn blank_names_report_missing_name() {
        let err = AlbumName::parse("   ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Album must have a name",
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 20 two-byte characters
        let name = "é".repeat(20);
        assert!(AlbumName::parse(&name).is_ok());
    }

    #[test]
    fn length_is_measured_before_lowercasing() {
        // 'İ' lowercases to two scalars, so the stored name is longer
        let raw = "İ".repeat(20);
        let name = AlbumName::parse(&raw).unwrap();
        assert_eq!(name.as_str().chars().count(), 40);

        assert!(AlbumName::parse(&"İ".repeat(21)).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_validates_the_name() {
        let name: AlbumName = serde_json::from_str("\" Beach Trip \"").unwrap();
        assert_eq!(name.as_str(), "beach trip");

        assert!(serde_json::from_str::<AlbumName>("\"x\"").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn album_serializes_with_underscore_id() {
        let album = Album::new(AlbumName::parse("family").unwrap());
        let value = serde_json::to_value(&album).unwrap();
        assert_eq!(value["name"], "family");
        assert_eq!(value["_id"], album.id.to_string());
        assert!(value.get("createdAt").is_some());
    }
}
