//! Folds finished runs into the profile and keeps it on disk

use super::profile::PersistentProfile;
use super::rules::{Unlock, UnlockKind};
use crate::persistence;
use crate::platform::storage::SharedStore;
use crate::sim::state::RunStats;
use crate::tuning::Catalog;

/// Result of recording one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// The run beat the scene's previous best
    pub new_record: bool,
    /// Best score for the scene after this run
    pub best: u64,
    /// Newly unlocked items, in evaluation order
    pub unlocks: Vec<Unlock>,
}

/// Owner of the persistent profile.
///
/// Every mutation is written through immediately. A failed write is logged
/// and the in-memory profile stays authoritative.
pub struct Progression {
    profile: PersistentProfile,
    catalog: Catalog,
    store: SharedStore,
}

impl Progression {
    /// Load (or create) the profile and normalize it against the catalog
    pub fn load(store: SharedStore, catalog: Catalog) -> Self {
        let mut profile: PersistentProfile = persistence::load(&*store.borrow());
        let repaired = profile.normalize(&catalog);
        let progression = Self {
            profile,
            catalog,
            store,
        };
        if repaired {
            progression.persist();
        }
        log::info!(
            "Profile: {} runs, {} achievements, best {}",
            progression.profile.stats.total_runs,
            progression.profile.achievements.len(),
            progression.profile.max_best_score()
        );
        progression
    }

    fn persist(&self) {
        if let Err(e) = persistence::save(&mut *self.store.borrow_mut(), &self.profile) {
            log::warn!("Failed to save profile: {}", e);
        }
    }

    /// Everything that happens when a run ends
    pub fn record_run(&mut self, scene: &str, score: f32, run: &RunStats) -> RunOutcome {
        self.update_stats(run);
        let new_record = self.update_best_score(scene, score);
        let unlocks = self.evaluate_unlocks(run);
        RunOutcome {
            new_record,
            best: self.profile.best_score(scene),
            unlocks,
        }
    }

    pub fn update_stats(&mut self, run: &RunStats) {
        self.profile.stats.absorb(run);
        self.persist();
    }

    /// Keep the floored score if it beats the scene's best. Returns whether
    /// it did.
    pub fn update_best_score(&mut self, scene: &str, score: f32) -> bool {
        let whole = score.max(0.0).floor() as u64;
        let best = self.profile.best_scores.get(scene).copied();
        if best.is_some_and(|b| whole <= b) {
            return false;
        }
        self.profile.best_scores.insert(scene.to_string(), whole);
        self.persist();
        true
    }

    /// Achievements, then skins, then scenes
    pub fn evaluate_unlocks(&mut self, run: &RunStats) -> Vec<Unlock> {
        let mut unlocks = Vec::new();

        let earned: Vec<(String, String)> = self
            .catalog
            .achievements
            .iter()
            .filter(|a| !self.profile.has_achievement(&a.id))
            .filter(|a| a.condition.holds(&self.profile, run))
            .map(|a| (a.id.clone(), a.name.clone()))
            .collect();
        for (id, name) in earned {
            if self.unlock_achievement(&id) {
                unlocks.push(Unlock {
                    kind: UnlockKind::Achievement,
                    id,
                    name,
                });
            }
        }

        let earned: Vec<(String, String)> = self
            .catalog
            .skins
            .iter()
            .filter(|s| !self.profile.has_skin(&s.id))
            .filter(|s| s.earned(&self.profile.stats))
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();
        for (id, name) in earned {
            if self.unlock_skin(&id) {
                unlocks.push(Unlock {
                    kind: UnlockKind::Skin,
                    id,
                    name,
                });
            }
        }

        // Best score across every scene, not just the one played
        let max_score = self.profile.max_best_score();
        let earned: Vec<(String, String)> = self
            .catalog
            .scenes
            .iter()
            .filter(|s| !self.profile.has_scene(&s.id))
            .filter(|s| max_score >= s.unlock_score)
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();
        for (id, name) in earned {
            if self.unlock_scene(&id) {
                unlocks.push(Unlock {
                    kind: UnlockKind::Scene,
                    id,
                    name,
                });
            }
        }

        for unlock in &unlocks {
            log::info!("Unlocked {:?}: {}", unlock.kind, unlock.name);
        }
        unlocks
    }

    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        if self.profile.has_achievement(id) {
            return false;
        }
        self.profile.achievements.push(id.to_string());
        self.persist();
        true
    }

    pub fn unlock_skin(&mut self, id: &str) -> bool {
        if self.profile.has_skin(id) {
            return false;
        }
        self.profile.unlocked_skins.push(id.to_string());
        self.persist();
        true
    }

    pub fn unlock_scene(&mut self, id: &str) -> bool {
        if self.profile.has_scene(id) {
            return false;
        }
        self.profile.unlocked_scenes.push(id.to_string());
        self.persist();
        true
    }

    /// Ignored unless the scene is unlocked
    pub fn select_scene(&mut self, id: &str) -> bool {
        if !self.profile.has_scene(id) {
            log::debug!("Ignoring selection of locked scene {}", id);
            return false;
        }
        self.profile.selected_scene = id.to_string();
        self.persist();
        true
    }

    /// Ignored unless the skin is unlocked
    pub fn select_skin(&mut self, id: &str) -> bool {
        if !self.profile.has_skin(id) {
            log::debug!("Ignoring selection of locked skin {}", id);
            return false;
        }
        self.profile.selected_skin = id.to_string();
        self.persist();
        true
    }

    /// Wipe everything back to a first-launch profile
    pub fn reset_progress(&mut self) {
        log::info!("Resetting progress");
        self.profile = PersistentProfile::default();
        self.profile.normalize(&self.catalog);
        self.persist();
    }

    pub fn profile(&self) -> &PersistentProfile {
        &self.profile
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected_scene(&self) -> &str {
        &self.profile.selected_scene
    }

    pub fn selected_skin(&self) -> &str {
        &self.profile.selected_skin
    }

    pub fn is_scene_unlocked(&self, id: &str) -> bool {
        self.profile.has_scene(id)
    }

    pub fn is_skin_unlocked(&self, id: &str) -> bool {
        self.profile.has_skin(id)
    }
}
