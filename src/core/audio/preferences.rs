//=========================================================================
// Audio Preferences
//=========================================================================
//
// Volume and mute settings persisted under `audioPreferences` as
// `{"masterVolume":1,"sfxVolume":1,"musicVolume":0.7,"muted":false}`.
//
// Missing fields take their defaults; out-of-range values are clamped on
// load. A missing, unreadable or corrupt entry yields the defaults.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::storage::{KeyValueStore, StoreError};

//=========================================================================

pub const PREFERENCES_KEY: &str = "audioPreferences";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioPreferences {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioPreferences {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl AudioPreferences {
    /// Reads preferences from `store`, falling back to defaults with a
    /// warning on any problem.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(target: "audio", "Failed to read audio preferences: {}", err);
                return Self::default();
            }
        };

        match serde_json::from_str::<AudioPreferences>(&raw) {
            Ok(prefs) => prefs.clamped(),
            Err(err) => {
                warn!(target: "audio", "Ignoring corrupt audio preferences: {}", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let payload = serde_json::to_string(self)?;
        store.set(PREFERENCES_KEY, &payload)
    }

    /// Volumes forced into `[0, 1]`; non-finite values become defaults.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            master_volume: clamp_volume(self.master_volume, defaults.master_volume),
            sfx_volume: clamp_volume(self.sfx_volume, defaults.sfx_volume),
            music_volume: clamp_volume(self.music_volume, defaults.music_volume),
            muted: self.muted,
        }
    }
}

/// Clamps `volume` into `[0, 1]`, substituting `fallback` for NaN/inf.
pub(crate) fn clamp_volume(volume: f32, fallback: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::testing::BrokenStore;
    use crate::core::storage::MemoryStore;

    #[test]
    fn defaults_when_absent() {
        let store = MemoryStore::new();
        assert_eq!(AudioPreferences::load(&store), AudioPreferences::default());
    }

    #[test]
    fn round_trips_through_store_with_camel_case_keys() {
        let store = MemoryStore::new();
        let prefs = AudioPreferences {
            master_volume: 0.5,
            sfx_volume: 0.25,
            music_volume: 1.0,
            muted: true,
        };
        prefs.save(&store).unwrap();

        let raw = store.get(PREFERENCES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"masterVolume\":0.5"));
        assert_eq!(AudioPreferences::load(&store), prefs);
    }

    #[test]
    fn partial_entry_fills_missing_fields() {
        let store = MemoryStore::new();
        store.set(PREFERENCES_KEY, r#"{"muted":true}"#).unwrap();
        let prefs = AudioPreferences::load(&store);
        assert!(prefs.muted);
        assert_eq!(prefs.music_volume, 0.7);
    }

    #[test]
    fn corrupt_or_unreadable_entry_falls_back() {
        let store = MemoryStore::new();
        store.set(PREFERENCES_KEY, "not json").unwrap();
        assert_eq!(AudioPreferences::load(&store), AudioPreferences::default());
        assert_eq!(AudioPreferences::load(&BrokenStore), AudioPreferences::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let store = MemoryStore::new();
        store
            .set(PREFERENCES_KEY, r#"{"masterVolume":3,"sfxVolume":-1,"musicVolume":0.4}"#)
            .unwrap();
        let prefs = AudioPreferences::load(&store);
        assert_eq!(prefs.master_volume, 1.0);
        assert_eq!(prefs.sfx_volume, 0.0);
        assert_eq!(prefs.music_volume, 0.4);
    }
}
