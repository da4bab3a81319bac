//! Read and delete access to stored content for one owner.

use std::sync::Arc;

use crate::content::ContentItem;
use crate::error::{CatalogError, StoreError};
use crate::storage::ArtifactStore;
use crate::store::ContentStore;

pub struct Catalog {
    store: Arc<dyn ContentStore>,
    artifacts: ArtifactStore,
    owner_id: String,
}

impl Catalog {
    pub fn new(
        store: Arc<dyn ContentStore>,
        artifacts: ArtifactStore,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            artifacts,
            owner_id: owner_id.into(),
        }
    }

    /// The owner's items, most recent first.
    pub async fn list(&self) -> Result<Vec<ContentItem>, StoreError> {
        self.store.list_by_owner(&self.owner_id).await
    }

    /// Items belonging to another owner are reported as absent.
    pub async fn get(&self, id: &str) -> Result<Option<ContentItem>, StoreError> {
        Ok(self
            .store
            .get(id)
            .await?
            .filter(|item| item.owner_id == self.owner_id))
    }

    /// Narration audio, or `None` when the item has none or the file is gone.
    pub async fn audio(&self, id: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let Some(locator) = self.get(id).await?.and_then(|item| item.audio_locator) else {
            return Ok(None);
        };

        let audio = self.artifacts.read(&locator).await?;
        if audio.is_none() {
            log::warn!("Audio artifact {} is missing for content {}", locator, id);
        }
        Ok(audio)
    }

    /// Deletes the record and its audio. Returns false when nothing matched.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let Some(item) = self.get(id).await? else {
            return Ok(false);
        };

        if !self.store.delete(&item.id).await? {
            return Ok(false);
        }

        if let Some(locator) = item.audio_locator {
            if let Err(e) = self.artifacts.remove(&locator).await {
                log::warn!("Failed to remove audio for deleted content {}: {}", id, e);
            }
        }

        log::info!("Deleted content {}", id);
        Ok(true)
    }
}
