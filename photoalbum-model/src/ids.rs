use crate::error::ModelError;
use std::str::FromStr;
use uuid::Uuid;

/// Strongly typed image identifier.
///
/// Ids are UUIDv7, so ordering by id matches insertion order and the
/// newest-first listings can sort on the id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ImageID(pub Uuid);

impl Default for ImageID {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageID {
    pub fn new() -> Self {
        ImageID(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for ImageID {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ImageID {
    fn from(id: Uuid) -> Self {
        ImageID(id)
    }
}

impl FromStr for ImageID {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(ImageID)
            .map_err(|_| ModelError::InvalidImageId(raw.to_string()))
    }
}

impl std::fmt::Display for ImageID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
