use std::sync::Arc;

use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};
use photoalbum_core::{InMemoryMediaHost, UploadPolicy};
use photoalbum_model::{Image, Page};
use photoalbum_server::{AppState, Config, create_app};

// Code is used by test modules, but not in this scope
#[allow(unused)]
#[derive(Debug)]
pub struct TestApp {
    pub server: TestServer,
    pub media_host: Arc<InMemoryMediaHost>,
}

#[allow(unused)]
impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config {
            dev_mode: true,
            ..Config::default()
        })
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self::with_config(Config {
            dev_mode: true,
            page_size,
            ..Config::default()
        })
    }

    pub fn with_policy(upload_policy: UploadPolicy) -> Self {
        Self::with_config(Config {
            dev_mode: true,
            upload_policy,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let media_host = Arc::new(InMemoryMediaHost::default());
        let state = AppState::in_memory(media_host.clone(), config);
        let server = TestServer::new(create_app(state)).unwrap();
        Self { server, media_host }
    }

    /// Uploads the named files in a single request and returns the first
    /// page from the response.
    pub async fn upload(&self, names: &[&str]) -> Page<Image> {
        let form = names.iter().fold(MultipartForm::new(), |form, name| {
            form.add_part("images", jpeg_part(name))
        });
        let response = self.server.post("/api/images").multipart(form).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Page<Image>>()
    }

    pub async fn create_album(&self, name: &str) {
        self.server
            .post("/api/albums")
            .json(&serde_json::json!({ "name": name }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }
}

#[allow(unused)]
pub fn jpeg_part(name: &str) -> Part {
    Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .file_name(name.to_string())
        .mime_type("image/jpeg")
}
