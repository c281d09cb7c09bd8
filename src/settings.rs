use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::config::Intensity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastSettings {
    pub default_intensity: Intensity,
    pub volume: f32,
    pub sounds_dir: Option<PathBuf>,
}

impl Default for RoastSettings {
    fn default() -> Self {
        Self {
            default_intensity: Intensity::default(),
            volume: 1.0,
            sounds_dir: None,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<RoastSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            RoastSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> RoastSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, settings: RoastSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    pub fn update_volume(&self, volume: f32) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.volume = volume.clamp(0.0, 1.0);
        self.persist(&guard)
    }

    pub fn update_sounds_dir(&self, dir: Option<PathBuf>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.sounds_dir = dir;
        self.persist(&guard)
    }

    fn persist(&self, data: &RoastSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("roast-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update(RoastSettings {
                default_intensity: Intensity::Spicy,
                volume: 0.4,
                sounds_dir: Some(PathBuf::from("/tmp/sounds")),
            })
            .unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap();
        let settings = reloaded.current();
        assert!(matches!(settings.default_intensity, Intensity::Spicy));
        assert!((settings.volume - 0.4).abs() < f32::EPSILON);
        assert_eq!(settings.sounds_dir, Some(PathBuf::from("/tmp/sounds")));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store =
            SettingsStore::new(PathBuf::from("/nonexistent/roast-settings.json")).unwrap();
        let settings = store.current();
        assert!(matches!(settings.default_intensity, Intensity::Medium));
        assert!((settings.volume - 1.0).abs() < f32::EPSILON);
        assert!(settings.sounds_dir.is_none());
    }
}
