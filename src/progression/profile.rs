//! The persisted cross-run profile

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{DEFAULT_SCENE, DEFAULT_SKIN, PROFILE_KEY};
use crate::persistence::{Record, salvage};
use crate::sim::state::RunStats;
use crate::tuning::Catalog;

/// Cumulative counters over every run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LifetimeStats {
    pub total_runs: u64,
    pub total_eco_points: u64,
    pub total_jumps: u64,
    pub total_powerup_choices: u64,
    pub total_stored_powerups_used: u64,
}

impl LifetimeStats {
    /// Fold one finished run in
    pub fn absorb(&mut self, run: &RunStats) {
        self.total_runs += 1;
        self.total_eco_points += u64::from(run.eco_points);
        self.total_jumps += u64::from(run.jumps);
        self.total_powerup_choices += u64::from(run.powerup_choices);
        self.total_stored_powerups_used += u64::from(run.stored_used);
    }

    fn repair(fields: &Map<String, Value>) -> Self {
        Self {
            total_runs: salvage(fields, "totalRuns"),
            total_eco_points: salvage(fields, "totalEcoPoints"),
            total_jumps: salvage(fields, "totalJumps"),
            total_powerup_choices: salvage(fields, "totalPowerupChoices"),
            total_stored_powerups_used: salvage(fields, "totalStoredPowerupsUsed"),
        }
    }
}

/// Everything that survives between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistentProfile {
    pub stats: LifetimeStats,
    /// Scene id → best whole score
    pub best_scores: BTreeMap<String, u64>,
    pub unlocked_scenes: Vec<String>,
    pub unlocked_skins: Vec<String>,
    /// Achievement ids, in unlock order
    pub achievements: Vec<String>,
    pub selected_scene: String,
    pub selected_skin: String,
}

impl Default for PersistentProfile {
    fn default() -> Self {
        Self {
            stats: LifetimeStats::default(),
            best_scores: BTreeMap::new(),
            unlocked_scenes: vec![DEFAULT_SCENE.to_string()],
            unlocked_skins: vec![DEFAULT_SKIN.to_string()],
            achievements: Vec::new(),
            selected_scene: DEFAULT_SCENE.to_string(),
            selected_skin: DEFAULT_SKIN.to_string(),
        }
    }
}

impl Record for PersistentProfile {
    const KEY: &'static str = PROFILE_KEY;

    fn repair(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let stats = match fields.get("stats") {
            Some(Value::Object(stats)) => LifetimeStats::repair(stats),
            _ => LifetimeStats::default(),
        };
        let best_scores = match fields.get("bestScores") {
            Some(Value::Object(scores)) => lenient_scores(scores),
            _ => BTreeMap::new(),
        };
        let or_default = |name: &str, fallback: Vec<String>| -> Vec<String> {
            match fields.get(name) {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => fallback,
            }
        };
        let text_or = |name: &str, fallback: String| -> String {
            fields
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(fallback)
        };

        Self {
            stats,
            best_scores,
            unlocked_scenes: or_default("unlockedScenes", defaults.unlocked_scenes),
            unlocked_skins: or_default("unlockedSkins", defaults.unlocked_skins),
            achievements: or_default("achievements", defaults.achievements),
            selected_scene: text_or("selectedScene", defaults.selected_scene),
            selected_skin: text_or("selectedSkin", defaults.selected_skin),
        }
    }
}

/// Keep every numeric score, flooring fractions and clamping negatives
fn lenient_scores(scores: &Map<String, Value>) -> BTreeMap<String, u64> {
    scores
        .iter()
        .filter_map(|(scene, v)| v.as_f64().map(|s| (scene.clone(), s.max(0.0).floor() as u64)))
        .collect()
}

impl PersistentProfile {
    /// Highest best score across all scenes (0 when none)
    pub fn max_best_score(&self) -> u64 {
        self.best_scores.values().copied().max().unwrap_or(0)
    }

    pub fn best_score(&self, scene: &str) -> u64 {
        self.best_scores.get(scene).copied().unwrap_or(0)
    }

    pub fn has_scene(&self, id: &str) -> bool {
        self.unlocked_scenes.iter().any(|s| s == id)
    }

    pub fn has_skin(&self, id: &str) -> bool {
        self.unlocked_skins.iter().any(|s| s == id)
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }

    /// Bring a loaded profile in line with the catalog. Returns whether
    /// anything changed.
    ///
    /// Every scene gets a best-score slot, free scenes and skins are owned,
    /// and a selection naming something locked falls back to the default.
    pub fn normalize(&mut self, catalog: &Catalog) -> bool {
        let before = self.clone();

        for scene in &catalog.scenes {
            self.best_scores.entry(scene.id.clone()).or_insert(0);
            if scene.is_free() && !self.has_scene(&scene.id) {
                self.unlocked_scenes.push(scene.id.clone());
            }
        }
        for skin in &catalog.skins {
            if skin.is_free() && !self.has_skin(&skin.id) {
                self.unlocked_skins.push(skin.id.clone());
            }
        }
        dedup_in_order(&mut self.unlocked_scenes);
        dedup_in_order(&mut self.unlocked_skins);
        dedup_in_order(&mut self.achievements);

        if !self.has_scene(&self.selected_scene) {
            self.selected_scene = first_free(
                catalog.scenes.iter().filter(|s| s.is_free()).map(|s| &s.id),
                DEFAULT_SCENE,
            );
        }
        if !self.has_skin(&self.selected_skin) {
            self.selected_skin = first_free(
                catalog.skins.iter().filter(|s| s.is_free()).map(|s| &s.id),
                DEFAULT_SKIN,
            );
        }

        *self != before
    }
}

fn first_free<'a>(mut ids: impl Iterator<Item = &'a String>, fallback: &str) -> String {
    ids.next().cloned().unwrap_or_else(|| fallback.to_string())
}

fn dedup_in_order(ids: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence;
    use crate::platform::storage::MemoryStore;

    fn load(json: &str) -> PersistentProfile {
        let store = MemoryStore::with_value(PROFILE_KEY, json);
        persistence::load(&store)
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(PersistentProfile::default()).unwrap();
        let obj = json.as_object().unwrap();
        for field in [
            "stats",
            "bestScores",
            "unlockedScenes",
            "unlockedSkins",
            "achievements",
            "selectedScene",
            "selectedSkin",
        ] {
            assert!(obj.contains_key(field), "missing {}", field);
        }
        assert!(json["stats"].get("totalStoredPowerupsUsed").is_some());
    }

    #[test]
    fn test_missing_achievements_is_empty() {
        let profile = load(
            r#"{"stats":{"totalRuns":4},"bestScores":{"botanico":900},
                "unlockedScenes":["botanico"],"unlockedSkins":["aventureira"],
                "selectedScene":"botanico","selectedSkin":"aventureira"}"#,
        );
        assert!(profile.achievements.is_empty());
        assert_eq!(profile.stats.total_runs, 4);
        assert_eq!(profile.best_score("botanico"), 900);
    }

    #[test]
    fn test_legacy_stats_merge_with_defaults() {
        let profile = load(r#"{"stats":{"totalEcoPoints":12}}"#);
        assert_eq!(profile.stats.total_eco_points, 12);
        assert_eq!(profile.stats.total_runs, 0);
        assert_eq!(profile.unlocked_skins, vec![DEFAULT_SKIN.to_string()]);
        assert_eq!(profile.selected_scene, DEFAULT_SCENE);
    }

    #[test]
    fn test_corrupt_json_is_default() {
        assert_eq!(load("{\"stats\": "), PersistentProfile::default());
    }

    #[test]
    fn test_mistyped_fields_repaired() {
        let profile = load(
            r#"{"stats":{"totalRuns":"many","totalJumps":30},
                "bestScores":{"botanico":1600.7,"tangua":-3,"barigui":"x"},
                "achievements":["A1",7],"selectedSkin":42}"#,
        );
        assert_eq!(profile.stats.total_runs, 0);
        assert_eq!(profile.stats.total_jumps, 30);
        assert_eq!(profile.best_score("botanico"), 1600);
        assert_eq!(profile.best_score("tangua"), 0);
        assert!(!profile.best_scores.contains_key("barigui"));
        assert_eq!(profile.achievements, vec!["A1".to_string()]);
        assert_eq!(profile.selected_skin, DEFAULT_SKIN);
    }

    #[test]
    fn test_normalize_against_catalog() {
        let catalog = Catalog::default();
        let mut profile = PersistentProfile {
            unlocked_scenes: vec!["tangua".into(), "tangua".into()],
            unlocked_skins: Vec::new(),
            selected_scene: "barigui".into(),
            selected_skin: "nope".into(),
            ..Default::default()
        };
        assert!(profile.normalize(&catalog));
        assert_eq!(profile.unlocked_scenes, vec!["tangua", "botanico"]);
        assert_eq!(profile.unlocked_skins, vec!["aventureira"]);
        assert_eq!(profile.selected_scene, "botanico");
        assert_eq!(profile.selected_skin, "aventureira");
        assert_eq!(profile.best_scores.len(), 3);

        assert!(!profile.normalize(&catalog), "normalizing twice is a no-op");
    }

    #[test]
    fn test_absorb_run() {
        let mut stats = LifetimeStats::default();
        let run = RunStats {
            jumps: 3,
            eco_points: 2,
            powerup_choices: 2,
            stored_used: 1,
            ..Default::default()
        };
        stats.absorb(&run);
        stats.absorb(&run);
        assert_eq!(stats.total_runs, 2);
        assert_eq!(stats.total_jumps, 6);
        assert_eq!(stats.total_stored_powerups_used, 2);
    }

    #[test]
    fn test_max_best_score_empty() {
        let profile = PersistentProfile::default();
        assert_eq!(profile.max_best_score(), 0);
    }
}
