use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::cloud::live::{CloudSettings, LiveCloud};
use crate::layout::WordCloudPacker;

/// In-memory registry of live clouds. Nothing is persisted: a restart drops
/// every cloud.
#[derive(Default)]
pub struct CloudStore {
    inner: RwLock<HashMap<Uuid, Arc<LiveCloud>>>,
}

impl CloudStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(
        &self,
        slide_index: usize,
        settings: CloudSettings,
        packer: WordCloudPacker,
    ) -> Arc<LiveCloud> {
        let cloud = LiveCloud::new(slide_index, settings, packer);
        self.inner.write().await.insert(cloud.id, Arc::clone(&cloud));
        info!(
            cloud_id = %cloud.id,
            slide_index,
            width = settings.container.width,
            height = settings.container.height,
            "Live cloud created"
        );
        cloud
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<LiveCloud>> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::layout::Container;

    fn settings() -> CloudSettings {
        let config = Config::default();
        CloudSettings {
            container: Container::new(640.0, 360.0),
            gaps: config.gaps(),
            scale: config.type_scale(),
            settle_delay: config.settle_delay(),
            max_term_chars: config.max_term_chars,
            max_terms: 100,
        }
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = CloudStore::new();
        let cloud = store.create(1, settings(), WordCloudPacker::default()).await;
        assert_eq!(store.len().await, 1);

        let found = store.get(cloud.id).await;
        assert_eq!(found.map(|c| c.slide_index), Some(1));

        assert!(store.remove(cloud.id).await);
        assert!(!store.remove(cloud.id).await);
        assert!(store.get(cloud.id).await.is_none());
    }
}
