//! Unlock rules: scenes, skins and achievements as catalog data

use serde::{Deserialize, Serialize};

use super::profile::{LifetimeStats, PersistentProfile};
use crate::sim::state::RunStats;

/// A cumulative counter in the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifetimeMetric {
    TotalRuns,
    TotalEcoPoints,
    TotalJumps,
    TotalPowerupChoices,
    TotalStoredPowerupsUsed,
}

impl LifetimeMetric {
    pub fn read(&self, stats: &LifetimeStats) -> f64 {
        let value = match self {
            LifetimeMetric::TotalRuns => stats.total_runs,
            LifetimeMetric::TotalEcoPoints => stats.total_eco_points,
            LifetimeMetric::TotalJumps => stats.total_jumps,
            LifetimeMetric::TotalPowerupChoices => stats.total_powerup_choices,
            LifetimeMetric::TotalStoredPowerupsUsed => stats.total_stored_powerups_used,
        };
        value as f64
    }
}

/// A counter of the run that just ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMetric {
    Jumps,
    EcoPoints,
    PowerupChoices,
    StoredUsed,
    ShieldTime,
    TurboDistance,
}

impl RunMetric {
    pub fn read(&self, run: &RunStats) -> f64 {
        match self {
            RunMetric::Jumps => run.jumps as f64,
            RunMetric::EcoPoints => run.eco_points as f64,
            RunMetric::PowerupChoices => run.powerup_choices as f64,
            RunMetric::StoredUsed => run.stored_used as f64,
            RunMetric::ShieldTime => run.shield_time as f64,
            RunMetric::TurboDistance => run.turbo_distance as f64,
        }
    }
}

/// Threshold predicate evaluated at run end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Condition {
    Lifetime { metric: LifetimeMetric, at_least: f64 },
    Run { metric: RunMetric, at_least: f64 },
    UnlockedScenes { at_least: usize },
}

impl Condition {
    pub fn holds(&self, profile: &PersistentProfile, run: &RunStats) -> bool {
        match self {
            Condition::Lifetime { metric, at_least } => metric.read(&profile.stats) >= *at_least,
            Condition::Run { metric, at_least } => metric.read(run) >= *at_least,
            Condition::UnlockedScenes { at_least } => profile.unlocked_scenes.len() >= *at_least,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub condition: Condition,
}

impl AchievementDef {
    fn new(id: &str, name: &str, description: &str, condition: Condition) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            condition,
        }
    }

    pub fn default_catalog() -> Vec<Self> {
        use Condition::*;
        vec![
            Self::new(
                "A1",
                "Primeira Corrida",
                "Complete sua primeira corrida",
                Lifetime { metric: LifetimeMetric::TotalRuns, at_least: 1.0 },
            ),
            Self::new(
                "A2",
                "Salto Seguro",
                "Pule 20 vezes em uma corrida",
                Run { metric: RunMetric::Jumps, at_least: 20.0 },
            ),
            Self::new(
                "A3",
                "Guardião",
                "Use um power-up guardado",
                Lifetime { metric: LifetimeMetric::TotalStoredPowerupsUsed, at_least: 1.0 },
            ),
            Self::new(
                "A4",
                "Escolha Sábia",
                "Escolha 10 power-ups",
                Lifetime { metric: LifetimeMetric::TotalPowerupChoices, at_least: 10.0 },
            ),
            Self::new(
                "A5",
                "Imune",
                "Fique 5s protegido em uma corrida",
                Run { metric: RunMetric::ShieldTime, at_least: 5.0 },
            ),
            Self::new(
                "A6",
                "Turbo!",
                "Percorra 500m em turbo em uma corrida",
                Run { metric: RunMetric::TurboDistance, at_least: 500.0 },
            ),
            Self::new(
                "A7",
                "Limpeza",
                "Colete 100 fragmentos eco",
                Lifetime { metric: LifetimeMetric::TotalEcoPoints, at_least: 100.0 },
            ),
            Self::new(
                "A8",
                "Curitiba Roots",
                "Desbloqueie todos os cenários",
                UnlockedScenes { at_least: 3 },
            ),
        ]
    }
}

/// A selectable backdrop with its own best score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Best score (any scene) needed to unlock; 0 means always available
    pub unlock_score: u64,
}

impl SceneDef {
    fn new(id: &str, name: &str, description: &str, unlock_score: u64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            unlock_score,
        }
    }

    pub fn default_catalog() -> Vec<Self> {
        vec![
            Self::new("botanico", "Jardim Botânico", "A estufa icônica", 0),
            Self::new("tangua", "Parque Tanguá", "Cascatas e túneis", 1500),
            Self::new("barigui", "Parque Barigui", "Capivaras e lagos", 3000),
        ]
    }

    pub fn is_free(&self) -> bool {
        self.unlock_score == 0
    }
}

/// How a skin becomes available
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SkinRequirement {
    /// Owned from the start
    Default,
    Lifetime { metric: LifetimeMetric, at_least: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinDef {
    pub id: String,
    pub name: String,
    pub requirement: SkinRequirement,
}

impl SkinDef {
    fn new(id: &str, name: &str, requirement: SkinRequirement) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            requirement,
        }
    }

    pub fn default_catalog() -> Vec<Self> {
        vec![
            Self::new("aventureira", "Aventureira", SkinRequirement::Default),
            Self::new(
                "ciclista",
                "Ciclista",
                SkinRequirement::Lifetime {
                    metric: LifetimeMetric::TotalEcoPoints,
                    at_least: 50.0,
                },
            ),
            Self::new(
                "turista",
                "Turista",
                SkinRequirement::Lifetime {
                    metric: LifetimeMetric::TotalStoredPowerupsUsed,
                    at_least: 10.0,
                },
            ),
        ]
    }

    pub fn is_free(&self) -> bool {
        self.requirement == SkinRequirement::Default
    }

    /// Whether lifetime stats meet the requirement
    pub fn earned(&self, stats: &LifetimeStats) -> bool {
        match self.requirement {
            SkinRequirement::Default => true,
            SkinRequirement::Lifetime { metric, at_least } => metric.read(stats) >= at_least,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnlockKind {
    Achievement,
    Skin,
    Scene,
}

/// A newly unlocked item, reported once for a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    pub kind: UnlockKind,
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_match_profile_fields() {
        let json = serde_json::to_string(&LifetimeMetric::TotalStoredPowerupsUsed).unwrap();
        assert_eq!(json, "\"totalStoredPowerupsUsed\"");
    }

    #[test]
    fn test_conditions() {
        let mut profile = PersistentProfile::default();
        let mut run = RunStats::default();
        let first_run = Condition::Lifetime {
            metric: LifetimeMetric::TotalRuns,
            at_least: 1.0,
        };
        assert!(!first_run.holds(&profile, &run));
        profile.stats.total_runs = 1;
        assert!(first_run.holds(&profile, &run));

        let shielded = Condition::Run {
            metric: RunMetric::ShieldTime,
            at_least: 5.0,
        };
        run.shield_time = 4.99;
        assert!(!shielded.holds(&profile, &run));
        run.shield_time = 5.0;
        assert!(shielded.holds(&profile, &run));

        let all_scenes = Condition::UnlockedScenes { at_least: 3 };
        assert!(!all_scenes.holds(&profile, &run));
        profile.unlocked_scenes = vec!["a".into(), "b".into(), "c".into()];
        assert!(all_scenes.holds(&profile, &run));
    }

    #[test]
    fn test_skin_requirement() {
        let skins = SkinDef::default_catalog();
        let mut stats = LifetimeStats::default();
        assert!(skins[0].earned(&stats));
        assert!(!skins[1].earned(&stats));
        stats.total_eco_points = 50;
        assert!(skins[1].earned(&stats));
    }

    #[test]
    fn test_catalog_roundtrips_through_json() {
        let achievements = AchievementDef::default_catalog();
        let json = serde_json::to_string(&achievements).unwrap();
        let back: Vec<AchievementDef> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, achievements);
    }
}
