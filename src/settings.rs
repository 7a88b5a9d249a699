//! Player preferences
//!
//! Persisted separately from the progression profile so a reset of progress
//! never touches audio or accessibility choices.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::SETTINGS_KEY;
use crate::persistence::{Record, salvage};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Audio ===
    /// Global mute (toggled with M)
    pub muted: bool,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no parallax shake, no flashes)
    pub reduced_motion: bool,
    /// Show the control prompts at the start of each run
    pub show_tutorial: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            music_volume: 0.5,
            sfx_volume: 0.8,
            reduced_motion: false,
            show_tutorial: true,
        }
    }
}

impl Settings {
    /// Flip mute. Returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Volume the audio collaborator should actually use
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume.clamp(0.0, 1.0)
        }
    }

    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.sfx_volume.clamp(0.0, 1.0)
        }
    }
}

impl Record for Settings {
    const KEY: &'static str = SETTINGS_KEY;

    fn repair(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let or = |name: &str, fallback: f32| -> f32 {
            fields
                .get(name)
                .and_then(Value::as_f64)
                .map(|v| v as f32)
                .unwrap_or(fallback)
        };
        Self {
            muted: salvage(fields, "muted"),
            music_volume: or("musicVolume", defaults.music_volume),
            sfx_volume: or("sfxVolume", defaults.sfx_volume),
            reduced_motion: salvage(fields, "reducedMotion"),
            show_tutorial: fields
                .get("showTutorial")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.show_tutorial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence;
    use crate::platform::storage::MemoryStore;

    #[test]
    fn test_mute_zeroes_volumes() {
        let mut settings = Settings::default();
        assert!(settings.effective_sfx_volume() > 0.0);
        assert!(settings.toggle_mute());
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
        assert!(!settings.toggle_mute());
    }

    #[test]
    fn test_volume_clamped() {
        let settings = Settings {
            music_volume: 3.0,
            ..Default::default()
        };
        assert_eq!(settings.effective_music_volume(), 1.0);
    }

    #[test]
    fn test_partial_record_repaired() {
        let store = MemoryStore::with_value(SETTINGS_KEY, r#"{"muted":true,"sfxVolume":"loud"}"#);
        let settings: Settings = persistence::load(&store);
        assert!(settings.muted);
        assert_eq!(settings.sfx_volume, Settings::default().sfx_volume);
        assert!(settings.show_tutorial);
    }
}
