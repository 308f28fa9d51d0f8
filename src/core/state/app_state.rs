use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::error::{StaticDataError, StaticDataResult};
use crate::core::http::DEFAULT_USER_AGENT;
use crate::core::language::Language;
use crate::core::manager::StaticDataManager;

const APP_DIR_NAME: &str = "static-data";
const SETTINGS_FILE: &str = "settings.json";
const DATA_DIR_NAME: &str = "data";
pub const DATA_DIR_ENV: &str = "STATIC_DATA_DIR";

/// Shared handle; holding the lock serializes every cache mutation.
pub type SharedState = Arc<Mutex<AppState>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    /// Language requested when a caller does not name one.
    pub language: Language,
    pub user_agent: String,
    pub download_concurrency: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            download_concurrency: 8,
        }
    }
}

pub struct AppState {
    pub app_dir: PathBuf,
    /// Cache root.
    pub data_dir: PathBuf,
    pub settings: CacheSettings,
    pub manager: StaticDataManager,
}

impl AppState {
    /// Build state rooted at `app_dir` (or the platform default) and load
    /// the cache index.
    pub async fn new(app_dir: Option<PathBuf>) -> StaticDataResult<Self> {
        let app_dir = app_dir.unwrap_or_else(default_app_dir);
        let data_dir = app_dir.join(DATA_DIR_NAME);
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(StaticDataError::io(&data_dir))?;

        let settings = load_settings_from_disk(&app_dir).unwrap_or_default();
        let mut manager = StaticDataManager::with_remote(
            data_dir.clone(),
            &settings.user_agent,
            settings.download_concurrency,
        )?;
        manager.load_index().await?;

        info!("Static data cache ready at {:?}", data_dir);
        Ok(Self {
            app_dir,
            data_dir,
            settings,
            manager,
        })
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.app_dir.join(SETTINGS_FILE)
    }

    pub fn save_settings(&self) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(self.settings_path(), json)
    }
}

fn load_settings_from_disk(app_dir: &Path) -> Option<CacheSettings> {
    let path = app_dir.join(SETTINGS_FILE);
    let raw = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!("Ignoring unreadable settings at {:?}: {}", path, e);
            None
        }
    }
}

fn default_app_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_directory_starts_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Some(dir.path().to_path_buf())).await.unwrap();

        assert_eq!(state.settings, CacheSettings::default());
        assert_eq!(state.data_dir, dir.path().join("data"));
        assert!(state.data_dir.is_dir());
        assert!(state.manager.context.bundles().is_empty());
    }

    #[tokio::test]
    async fn settings_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(Some(dir.path().to_path_buf())).await.unwrap();
        state.settings.language = Language::Fr;
        state.settings.download_concurrency = 2;
        state.save_settings().unwrap();

        let restarted = AppState::new(Some(dir.path().to_path_buf())).await.unwrap();
        assert_eq!(restarted.settings.language, Language::Fr);
        assert_eq!(restarted.settings.download_concurrency, 2);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{ "language": "de" }"#).unwrap();

        let settings = load_settings_from_disk(dir.path()).unwrap();
        assert_eq!(settings.language, Language::De);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    }
}
