use std::sync::Arc;

use shared::domain::TagSet;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::QuoteApi;

/// Session-scoped list of valid tags. Loaded once; reloaded only on an
/// explicit [`TagRegistry::refresh`].
pub struct TagRegistry {
    api: Arc<dyn QuoteApi>,
    loaded: Mutex<Option<TagSet>>,
}

impl TagRegistry {
    pub fn new(api: Arc<dyn QuoteApi>) -> Self {
        Self {
            api,
            loaded: Mutex::new(None),
        }
    }

    /// Issues one request. Failures are logged and yield an empty set, since
    /// free-text entry keeps working without tags.
    pub async fn fetch_tags(&self) -> TagSet {
        match self.api.fetch_tags().await {
            Ok(tags) => {
                let tags: TagSet = tags.into_iter().collect();
                info!(count = tags.len(), "tags: loaded");
                tags
            }
            Err(err) => {
                warn!(error = %err, "tags: load failed; continuing without tags");
                TagSet::empty()
            }
        }
    }

    pub async fn load_once(&self) -> TagSet {
        let mut loaded = self.loaded.lock().await;
        if let Some(tags) = loaded.as_ref() {
            return tags.clone();
        }
        let tags = self.fetch_tags().await;
        *loaded = Some(tags.clone());
        tags
    }

    pub async fn refresh(&self) -> TagSet {
        let mut loaded = self.loaded.lock().await;
        let tags = self.fetch_tags().await;
        *loaded = Some(tags.clone());
        tags
    }

    pub async fn current(&self) -> TagSet {
        self.loaded.lock().await.clone().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/tags_tests.rs"]
mod tests;
