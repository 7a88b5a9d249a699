//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one `Pcg32` owned by `GameState`)
//! - Stable iteration order (spawn order)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod player;
pub mod powerup;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Rect, all_overlaps, first_overlap};
pub use player::{Player, PlayerIntent, PlayerPose, PlayerStep};
pub use powerup::{ActivePowerUp, PowerUpCategory, PowerUpDef, PowerUpManager};
pub use spawner::{Fragment, Obstacle, ObstacleCategory, ObstacleKind, SpawnReport, Spawner};
pub use state::{
    Decision, GameEvent, GamePhase, GameState, Loadout, MenuTab, RunStats, Tutorial, TutorialStep,
};
pub use tick::{TickInput, tick};
