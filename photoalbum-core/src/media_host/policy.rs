use serde::{Deserialize, Serialize};

use super::UploadFile;
use crate::error::{PhotoError, Result};

fn default_max_files() -> usize {
    3
}

fn default_allowed_formats() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "svg", "webp", "tiff"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}

/// Limits applied to a multipart upload before anything reaches the media
/// host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Files accepted per request.
    pub max_files: usize,
    /// Lowercase format names, matched against [`UploadFile::format`].
    pub allowed_formats: Vec<String>,
    pub max_file_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            allowed_formats: default_allowed_formats(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl UploadPolicy {
    pub fn allows_format(&self, format: &str) -> bool {
        self.allowed_formats
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(format))
    }

    /// Largest request body a compliant upload can produce, with headroom
    /// for multipart framing.
    pub fn max_request_bytes(&self) -> usize {
        self.max_files
            .saturating_mul(self.max_file_bytes)
            .saturating_add(64 * 1024)
    }

    pub fn validate(&self, files: &[UploadFile]) -> Result<()> {
        if files.is_empty() {
            return Err(PhotoError::InvalidInput("No files uploaded".to_string()));
        }
        if files.len() > self.max_files {
            return Err(PhotoError::InvalidInput(format!(
                "At most {} files can be uploaded at once",
                self.max_files
            )));
        }

        for file in files {
            if file.bytes.is_empty() {
                return Err(PhotoError::InvalidInput(format!(
                    "File '{}' is empty",
                    file.file_name
                )));
            }
            if file.bytes.len() > self.max_file_bytes {
                return Err(PhotoError::InvalidInput(format!(
                    "File '{}' exceeds the {} byte limit",
                    file.file_name, self.max_file_bytes
                )));
            }
            match file.format() {
                Some(format) if self.allows_format(&format) => {}
                _ => {
                    return Err(PhotoError::InvalidInput(format!(
                        "File '{}' is not an allowed image format ({})",
                        file.file_name,
                        self.allowed_formats.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, len: usize) -> UploadFile {
        UploadFile::new(name, None, vec![0u8; len])
    }

    #[test]
    fn accepts_allowed_formats_case_insensitively() {
        let policy = UploadPolicy::default();
        assert!(policy.validate(&[file("a.jpg", 10), file("b.PNG", 10)]).is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_batches() {
        let policy = UploadPolicy::default();
        assert!(matches!(
            policy.validate(&[]),
            Err(PhotoError::InvalidInput(msg)) if msg == "No files uploaded"
        ));

        let batch: Vec<_> = (0..4).map(|n| file(&format!("{n}.jpg"), 1)).collect();
        assert!(policy.validate(&batch).is_err());
    }

    #[test]
    fn rejects_disallowed_formats() {
        let policy = UploadPolicy::default();
        assert!(policy.validate(&[file("document.pdf", 10)]).is_err());
        assert!(policy.validate(&[file("noextension", 10)]).is_err());
    }

    #[test]
    fn rejects_files_over_the_byte_limit() {
        let policy = UploadPolicy {
            max_file_bytes: 4,
            ..UploadPolicy::default()
        };
        assert!(policy.validate(&[file("a.gif", 5)]).is_err());
        assert!(policy.validate(&[file("a.gif", 4)]).is_ok());
    }

    #[test]
    fn partial_overrides_keep_defaults() {
        let policy: UploadPolicy = serde_json::from_str(r#"{"max_files": 5}"#).unwrap();
        assert_eq!(policy.max_files, 5);
        assert_eq!(policy.allowed_formats, default_allowed_formats());
    }
}
