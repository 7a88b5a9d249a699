//! Cross-run progression: lifetime stats, best scores, unlocks
//!
//! The simulation reports a finished run; this module folds it into the
//! persistent profile and decides what became available.

pub mod engine;
pub mod profile;
pub mod rules;

pub use engine::{Progression, RunOutcome};
pub use profile::{LifetimeStats, PersistentProfile};
pub use rules::{
    AchievementDef, Condition, LifetimeMetric, RunMetric, SceneDef, SkinDef, SkinRequirement,
    Unlock, UnlockKind,
};
