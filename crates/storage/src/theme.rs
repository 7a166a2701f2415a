use std::sync::Arc;

use shared::domain::Theme;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::KeyValueStore;

pub const THEME_KEY: &str = "theme";

pub struct ThemeStore {
    kv: Arc<dyn KeyValueStore>,
    current: Mutex<Theme>,
}

impl ThemeStore {
    pub async fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let current = read_theme(kv.as_ref()).await;
        Self {
            kv,
            current: Mutex::new(current),
        }
    }

    pub async fn current(&self) -> Theme {
        *self.current.lock().await
    }

    pub async fn toggle(&self) -> Theme {
        let mut current = self.current.lock().await;
        let next = current.toggled();
        if let Err(err) = self.kv.put(THEME_KEY, next.as_str().to_string()).await {
            warn!(error = %format!("{err:#}"), "theme: toggle not persisted");
        }
        info!(theme = next.as_str(), "theme: switched");
        *current = next;
        next
    }
}

async fn read_theme(kv: &dyn KeyValueStore) -> Theme {
    match kv.get(THEME_KEY).await {
        Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "theme: unknown persisted value");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "theme: falling back to default");
            Theme::default()
        }
    }
}

#[cfg(test)]
#[path = "tests/theme_tests.rs"]
mod tests;
