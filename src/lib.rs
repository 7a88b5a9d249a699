//! Eco Dash - A side-scrolling arcade runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, spawning, collisions, power-ups)
//! - `progression`: Lifetime stats, best scores, unlock rules
//! - `persistence`: Lenient JSON records over a key-value store
//! - `platform`: Browser/native platform abstraction (input, storage, logging)
//! - `settings`: Player preferences
//! - `game`: Frame-level façade tying simulation and progression together
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::{Game, Snapshot};
pub use settings::Settings;
pub use tuning::Tuning;

/// Fixed identifiers
pub mod consts {
    /// Storage key of the progression profile
    pub const PROFILE_KEY: &str = "eco_dash_profile_v1";
    /// Storage key of the player preferences
    pub const SETTINGS_KEY: &str = "eco_dash_settings";

    /// Scene every new profile starts in
    pub const DEFAULT_SCENE: &str = "botanico";
    /// Skin every new profile owns
    pub const DEFAULT_SKIN: &str = "aventureira";

    /// Nominal frame step used by headless drivers (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}
