//! Display settings persisted across sessions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::db::Database;

pub const DISPLAY_MODE_KEY: &str = "display_mode";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to persist settings: {0}")]
    Storage(String),
}

/// Key/value persistence for client settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, SettingsError>;
    async fn save(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

#[async_trait]
impl SettingsStore for Database {
    async fn load(&self, key: &str) -> Result<Option<String>, SettingsError> {
        self.get_app_state(key)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.set_app_state(key, value)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))
    }
}

/// Settings kept in memory only, for sessions without a database.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "dark")]
    Dark,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Light => "light",
            DisplayMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Light => DisplayMode::Dark,
            DisplayMode::Dark => DisplayMode::Light,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DisplayMode {
    fn from(value: &str) -> Self {
        match value {
            "dark" => DisplayMode::Dark,
            _ => DisplayMode::Light,
        }
    }
}

/// The light/dark flag. Starts as `light` on first run and is written back
/// on every change.
pub struct DisplaySettings {
    mode: DisplayMode,
    store: Arc<dyn SettingsStore>,
}

impl DisplaySettings {
    /// Read the persisted mode. A missing, unknown or unreadable value falls
    /// back to `light`.
    pub async fn load(store: Arc<dyn SettingsStore>) -> Self {
        let mode = match store.load(DISPLAY_MODE_KEY).await {
            Ok(Some(value)) => DisplayMode::from(value.as_str()),
            Ok(None) => DisplayMode::default(),
            Err(e) => {
                log::warn!("Failed to load display mode, using light: {}", e);
                DisplayMode::default()
            }
        };
        Self { mode, store }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Persist `mode`. The in-memory value only changes once the write succeeded.
    pub async fn set_mode(&mut self, mode: DisplayMode) -> Result<DisplayMode, SettingsError> {
        self.store.save(DISPLAY_MODE_KEY, mode.as_str()).await?;
        self.mode = mode;
        Ok(mode)
    }

    pub async fn toggle(&mut self) -> Result<DisplayMode, SettingsError> {
        self.set_mode(self.mode.toggled()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    #[async_trait]
    impl SettingsStore for FailingStore {
        async fn load(&self, _key: &str) -> Result<Option<String>, SettingsError> {
            Err(SettingsError::Storage("disk gone".into()))
        }

        async fn save(&self, _key: &str, _value: &str) -> Result<(), SettingsError> {
            Err(SettingsError::Storage("disk gone".into()))
        }
    }

    #[tokio::test]
    async fn first_run_defaults_to_light() {
        let settings = DisplaySettings::load(Arc::new(MemorySettingsStore::default())).await;
        assert_eq!(settings.mode(), DisplayMode::Light);
    }

    #[tokio::test]
    async fn toggle_persists_and_survives_reload() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::default());
        let mut settings = DisplaySettings::load(store.clone()).await;

        assert_eq!(settings.toggle().await.unwrap(), DisplayMode::Dark);
        assert_eq!(
            store.load(DISPLAY_MODE_KEY).await.unwrap().as_deref(),
            Some("dark")
        );

        let reloaded = DisplaySettings::load(store).await;
        assert_eq!(reloaded.mode(), DisplayMode::Dark);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_mode() {
        let mut settings = DisplaySettings::load(Arc::new(FailingStore)).await;
        assert_eq!(settings.mode(), DisplayMode::Light);
        assert!(settings.toggle().await.is_err());
        assert_eq!(settings.mode(), DisplayMode::Light);
    }

    #[test]
    fn unknown_values_fall_back_to_light() {
        assert_eq!(DisplayMode::from("dark"), DisplayMode::Dark);
        assert_eq!(DisplayMode::from("sepia"), DisplayMode::Light);
        assert_eq!(DisplayMode::Dark.toggled().to_string(), "light");
    }

    #[tokio::test]
    async fn database_backed_settings_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.db");

        {
            let db: Arc<dyn SettingsStore> = Arc::new(Database::open(&path).await.unwrap());
            let mut settings = DisplaySettings::load(db).await;
            settings.set_mode(DisplayMode::Dark).await.unwrap();
        }

        let db: Arc<dyn SettingsStore> = Arc::new(Database::open(&path).await.unwrap());
        assert_eq!(DisplaySettings::load(db).await.mode(), DisplayMode::Dark);
    }
}
