use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

use crate::{listing::DEFAULT_LIST_LIMIT, sync::SyncOptions};

pub const SETTINGS_FILE: &str = "quotebox.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub database_url: String,
    pub request_timeout_ms: u64,
    pub list_limit: u32,
    pub refresh_delay_ms: u64,
    pub requestor: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            database_url: "sqlite://./data/quotebox.db".into(),
            request_timeout_ms: 15_000,
            list_limit: DEFAULT_LIST_LIMIT,
            refresh_delay_ms: 500,
            requestor: None,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            refresh_delay: Duration::from_millis(self.refresh_delay_ms),
            refresh_after_generate: true,
            list_limit: self.list_limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    database_url: Option<String>,
    request_timeout_ms: Option<u64>,
    list_limit: Option<u32>,
    refresh_delay_ms: Option<u64>,
    requestor: Option<String>,
}

/// Defaults, overlaid by `quotebox.toml` in the working directory, overlaid
/// by environment variables.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), error = %err, "config: ignoring settings file"),
        }
    }

    if let Some(v) = env("QUOTEBOX_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("QUOTEBOX_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_ms = parsed;
        }
    }
    if let Some(v) = env("APP__LIST_LIMIT") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.list_limit = parsed;
        }
    }
    if let Some(v) = env("APP__REFRESH_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.refresh_delay_ms = parsed;
        }
    }

    if let Some(v) = env("QUOTEBOX_REQUESTOR") {
        settings.requestor = Some(v).filter(|r| !r.trim().is_empty());
    }

    settings
}

fn apply_file(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = file_cfg.list_limit {
        settings.list_limit = v;
    }
    if let Some(v) = file_cfg.refresh_delay_ms {
        settings.refresh_delay_ms = v;
    }
    if let Some(v) = file_cfg.requestor {
        settings.requestor = Some(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
