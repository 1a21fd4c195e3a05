use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::{MediaHost, StoredAsset, UploadFile};
use crate::error::Result;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    assets: BTreeMap<String, usize>,
    destroyed: Vec<String>,
}

/// Media host that keeps asset sizes in memory and hands out `memory://`
/// URLs. Used in dev mode and by tests.
#[derive(Debug)]
pub struct InMemoryMediaHost {
    folder: String,
    state: Mutex<State>,
}

impl Default for InMemoryMediaHost {
    fn default() -> Self {
        Self::new(super::cloudinary::DEFAULT_FOLDER)
    }
}

impl InMemoryMediaHost {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Public ids of assets currently held.
    pub fn asset_ids(&self) -> Vec<String> {
        self.state.lock().assets.keys().cloned().collect()
    }

    /// Public ids passed to [`MediaHost::destroy`], in call order.
    pub fn destroyed(&self) -> Vec<String> {
        self.state.lock().destroyed.clone()
    }
}

#[async_trait]
impl MediaHost for InMemoryMediaHost {
    async fn upload(&self, file: UploadFile) -> Result<StoredAsset> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let public_id = format!("{}/{}", self.folder, state.next_id);
        state.assets.insert(public_id.clone(), file.bytes.len());
        debug!(%public_id, file = %file.file_name, "stored asset in memory");

        Ok(StoredAsset {
            secure_url: format!("memory://{public_id}"),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.assets.remove(public_id);
        state.destroyed.push(public_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_destroy() {
        let host = InMemoryMediaHost::new("test");
        let asset = host
            .upload(UploadFile::new("a.png", None, vec![1, 2]))
            .await
            .unwrap();
        assert_eq!(asset.public_id, "test/1");
        assert_eq!(asset.secure_url, "memory://test/1");
        assert_eq!(host.asset_ids(), vec!["test/1".to_string()]);

        host.destroy("test/1").await.unwrap();
        assert!(host.asset_ids().is_empty());
        assert_eq!(host.destroyed(), vec!["test/1".to_string()]);
    }
}
