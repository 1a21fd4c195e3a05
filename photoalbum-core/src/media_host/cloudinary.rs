use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use super::{MediaHost, StoredAsset, UploadFile};
use crate::error::{PhotoError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
pub const DEFAULT_FOLDER: &str = "my_images";

/// Sent with every signed request so the host verifies with SHA-256
/// regardless of the account default. Not itself part of the signature.
const SIGNATURE_ALGORITHM: &str = "sha256";

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: Url,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self> {
        let api_base = Url::parse(DEFAULT_API_BASE)
            .map_err(|e| PhotoError::Internal(e.to_string()))?;
        Ok(Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder: DEFAULT_FOLDER.to_string(),
            api_base,
        })
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base.as_str().trim_end_matches('/'),
            self.cloud_name,
            resource_type,
            action
        )
    }
}

/// Signs request parameters: the pairs are sorted by key, joined as
/// `key=value&...`, suffixed with the API secret and hashed with SHA-256.
///
/// The account must be configured for SHA-256 signatures.
pub(crate) fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("unexpected status {status}"))
}

/// Media host backed by Cloudinary's upload API.
#[derive(Debug, Clone)]
pub struct CloudinaryMediaHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryMediaHost {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(client: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }
}

#[async_trait]
impl MediaHost for CloudinaryMediaHost {
    async fn upload(&self, file: UploadFile) -> Result<StoredAsset> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", self.config.folder.clone()),
                ("timestamp", timestamp.clone()),
            ],
            &self.config.api_secret,
        );

        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature_algorithm", SIGNATURE_ALGORITHM)
            .text("signature", signature);

        debug!(file = %file.file_name, size, "uploading to cloudinary");
        let response = self
            .client
            .post(self.config.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(file = %file.file_name, %status, %message, "cloudinary upload failed");
            return Err(PhotoError::MediaHost(message));
        }

        let uploaded: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            PhotoError::MediaHost(format!("unreadable upload response: {e}"))
        })?;
        info!(public_id = %uploaded.public_id, "uploaded asset");

        Ok(StoredAsset {
            public_id: uploaded.public_id,
            secure_url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("public_id", public_id.to_string()),
                ("timestamp", timestamp.clone()),
            ],
            &self.config.api_secret,
        );

        let response = self
            .client
            .post(self.config.endpoint("image", "destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature_algorithm", SIGNATURE_ALGORITHM),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PhotoError::MediaHost(error_message(status, &body)));
        }

        let destroyed: DestroyResponse = serde_json::from_str(&body).map_err(|e| {
            PhotoError::MediaHost(format!("unreadable destroy response: {e}"))
        })?;
        match destroyed.result.as_str() {
            "ok" => {
                info!(public_id, "destroyed asset");
                Ok(())
            }
            "not found" => {
                warn!(public_id, "asset already gone from cloudinary");
                Ok(())
            }
            other => Err(PhotoError::MediaHost(format!(
                "destroy of {public_id} returned '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_parameters_before_hashing() {
        let params = [
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample_image".to_string()),
        ];

        let mut hasher = Sha256::new();
        hasher.update(b"public_id=sample_image&timestamp=1315060510abcd");
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(sign(&params, "abcd"), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn endpoints_include_cloud_and_resource_type() {
        let config = CloudinaryConfig::new("demo", "key", "secret")
            .unwrap()
            .with_api_base(Url::parse("http://127.0.0.1:9000/").unwrap());
        assert_eq!(
            config.endpoint("auto", "upload"),
            "http://127.0.0.1:9000/v1_1/demo/auto/upload"
        );
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = CloudinaryConfig::new("demo", "key", "super-secret").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("my_images"));
    }

    #[test]
    fn error_message_prefers_host_message() {
        let body = r#"{"error":{"message":"Invalid Signature"}}"#;
        assert_eq!(
            error_message(reqwest::StatusCode::UNAUTHORIZED, body),
            "Invalid Signature"
        );
        assert_eq!(
            error_message(reqwest::StatusCode::BAD_GATEWAY, "<html>"),
            "unexpected status 502 Bad Gateway"
        );
    }

    mod against_stub_host {
        use super::*;
        use axum::{
            Form, Json, Router,
            extract::{Multipart, State},
            http::StatusCode,
            routing::post,
        };
        use parking_lot::Mutex;
        use serde_json::{Value, json};
        use std::{collections::HashMap, sync::Arc};

        type Recorded = Arc<Mutex<Vec<(String, String)>>>;

        async fn upload_ok(
            State(recorded): State<Recorded>,
            mut multipart: Multipart,
        ) -> Json<Value> {
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let value = if name == "file" {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.unwrap();
                    format!("{file_name}:{}", bytes.len())
                } else {
                    field.text().await.unwrap()
                };
                recorded.lock().push((name, value));
            }
            Json(json!({
                "public_id": "my_images/abc123",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/my_images/abc123.jpg",
                "format": "jpg"
            }))
        }

        async fn upload_rejected() -> (StatusCode, Json<Value>) {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "message": "Invalid Signature abc" } })),
            )
        }

        async fn destroy(
            State(recorded): State<Recorded>,
            Form(params): Form<HashMap<String, String>>,
        ) -> Json<Value> {
            let result = match params.get("public_id").map(String::as_str) {
                Some("my_images/gone") => "not found",
                Some("my_images/locked") => "error",
                _ => "ok",
            };
            let mut recorded = recorded.lock();
            let mut params: Vec<_> = params.into_iter().collect();
            params.sort();
            recorded.extend(params);
            Json(json!({ "result": result }))
        }

        async fn spawn_stub() -> (CloudinaryMediaHost, Recorded) {
            let recorded = Recorded::default();
            let app = Router::new()
                .route("/v1_1/demo/auto/upload", post(upload_ok))
                .route("/v1_1/rejecting/auto/upload", post(upload_rejected))
                .route("/v1_1/demo/image/destroy", post(destroy))
                .with_state(recorded.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let config = CloudinaryConfig::new("demo", "key-123", "secret")
                .unwrap()
                .with_api_base(Url::parse(&format!("http://{addr}/")).unwrap());
            (CloudinaryMediaHost::new(config), recorded)
        }

        fn value_of<'a>(recorded: &'a [(String, String)], key: &str) -> &'a str {
            recorded
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
                .unwrap_or_else(|| panic!("field {key} was not sent"))
        }

        #[tokio::test]
        async fn upload_sends_signed_multipart_and_parses_asset() {
            let (host, recorded) = spawn_stub().await;

            let asset = host
                .upload(UploadFile::new(
                    "beach.jpg",
                    Some("image/jpeg".into()),
                    vec![0xFF, 0xD8, 0xFF, 0xE0],
                ))
                .await
                .unwrap();
            assert_eq!(asset.public_id, "my_images/abc123");
            assert!(asset.secure_url.ends_with("my_images/abc123.jpg"));

            let recorded = recorded.lock().clone();
            let names: Vec<&str> = recorded.iter().map(|(n, _)| n.as_str()).collect();
            assert_eq!(
                names,
                vec![
                    "file",
                    "api_key",
                    "timestamp",
                    "folder",
                    "signature_algorithm",
                    "signature"
                ]
            );
            assert_eq!(value_of(&recorded, "file"), "beach.jpg:4");
            assert_eq!(value_of(&recorded, "api_key"), "key-123");
            assert_eq!(value_of(&recorded, "folder"), "my_images");
            assert_eq!(value_of(&recorded, "signature_algorithm"), "sha256");

            let timestamp = value_of(&recorded, "timestamp").to_string();
            let expected = sign(
                &[
                    ("folder", "my_images".to_string()),
                    ("timestamp", timestamp),
                ],
                "secret",
            );
            assert_eq!(value_of(&recorded, "signature"), expected);
        }

        #[tokio::test]
        async fn upload_failure_surfaces_host_message() {
            let (host, _) = spawn_stub().await;
            let config = host
                .config()
                .clone();
            let rejecting = CloudinaryMediaHost::new(CloudinaryConfig {
                cloud_name: "rejecting".into(),
                ..config
            });

            let err = rejecting
                .upload(UploadFile::new("a.png", None, vec![1, 2, 3]))
                .await
                .unwrap_err();
            match err {
                PhotoError::MediaHost(message) => {
                    assert_eq!(message, "Invalid Signature abc")
                }
                other => panic!("expected a media host error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn destroy_sends_signed_form() {
            let (host, recorded) = spawn_stub().await;

            host.destroy("my_images/abc123").await.unwrap();

            let recorded = recorded.lock().clone();
            assert_eq!(value_of(&recorded, "public_id"), "my_images/abc123");
            assert_eq!(value_of(&recorded, "api_key"), "key-123");
            assert_eq!(value_of(&recorded, "signature_algorithm"), "sha256");

            let timestamp = value_of(&recorded, "timestamp").to_string();
            let expected = sign(
                &[
                    ("public_id", "my_images/abc123".to_string()),
                    ("timestamp", timestamp),
                ],
                "secret",
            );
            assert_eq!(value_of(&recorded, "signature"), expected);
        }

        #[tokio::test]
        async fn destroy_of_missing_asset_succeeds() {
            let (host, _) = spawn_stub().await;
            host.destroy("my_images/gone").await.unwrap();

            let err = host.destroy("my_images/locked").await.unwrap_err();
            assert!(matches!(err, PhotoError::MediaHost(_)));
        }
    }
}
