//! Data-driven game balance
//!
//! Every constant the simulation and progression read lives here. A `Tuning`
//! is built once and handed to each component at construction; nothing reads
//! it through a global. All structs use `#[serde(default)]` so a partial JSON
//! override only needs the fields it changes.

use serde::{Deserialize, Serialize};

use crate::progression::rules::{AchievementDef, SceneDef, SkinDef};
use crate::sim::powerup::PowerUpDef;

/// Playfield geometry and frame pacing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Logical playfield width (pixel art resolution)
    pub width: f32,
    /// Logical playfield height
    pub height: f32,
    /// Y coordinate of the ground line (screen space, y grows downward)
    pub ground_y: f32,
    /// Base scroll speed in px/s before difficulty and boosts
    pub base_scroll_speed: f32,
    /// Largest real-time step accepted per frame (absorbs tab stalls)
    pub max_frame_dt: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 270.0,
            ground_y: 230.0,
            base_scroll_speed: 180.0,
            max_frame_dt: 0.1,
        }
    }
}

/// Player body and animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Downward acceleration, px/s²
    pub gravity: f32,
    /// Upward launch speed, px/s
    pub jump_impulse: f32,
    pub width: f32,
    pub height: f32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
    /// Hitbox height multiplier while sliding
    pub slide_hitbox_scale: f32,
    pub start_x: f32,
    /// Frames in the run cycle
    pub run_frames: u32,
    /// Seconds per run-cycle frame
    pub run_frame_time: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            gravity: 1500.0,
            jump_impulse: 550.0,
            width: 24.0,
            height: 24.0,
            hitbox_width: 16.0,
            hitbox_height: 20.0,
            slide_hitbox_scale: 0.5,
            start_x: 40.0,
            run_frames: 4,
            run_frame_time: 0.1,
        }
    }
}

/// Obstacle and fragment spawning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Seconds between obstacles, drawn uniformly from [min, max]
    pub obstacle_interval_min: f32,
    pub obstacle_interval_max: f32,
    /// Seconds between eco fragments, drawn uniformly from [min, max]
    pub fragment_interval_min: f32,
    pub fragment_interval_max: f32,
    /// Probability that an obstacle is ground-level (rest are airborne)
    pub ground_share: f32,
    /// Airborne obstacles float this far above the ground line
    pub airborne_clearance: f32,
    pub fragment_size: f32,
    /// Fragments appear between `fragment_min_height` and
    /// `fragment_min_height + fragment_height_band` above the ground
    pub fragment_min_height: f32,
    pub fragment_height_band: f32,
    /// Entities are culled once their right edge passes x = -margin
    pub despawn_margin: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            obstacle_interval_min: 1.5,
            obstacle_interval_max: 3.0,
            fragment_interval_min: 12.0,
            fragment_interval_max: 20.0,
            ground_share: 0.6,
            airborne_clearance: 50.0,
            fragment_size: 16.0,
            fragment_min_height: 60.0,
            fragment_height_band: 40.0,
            despawn_margin: 50.0,
        }
    }
}

/// Power-up effects and the choice flow's time modulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    /// Seconds an activated effect lasts
    pub duration: f32,
    /// How many options a fragment pickup offers
    pub choice_count: usize,
    /// Time-scale while choosing or deciding
    pub slow_motion_scale: f32,
    /// Time-scale while SPEED is active
    pub turbo_time_scale: f32,
    /// Scroll and score multiplier while SPEED is active
    pub turbo_multiplier: f32,
    /// Jump impulse multiplier while JUMP is active
    pub jump_boost: f32,
    /// Score multiplier while a choice is pending
    pub pending_score_factor: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            duration: 5.0,
            choice_count: 3,
            slow_motion_scale: 0.3,
            turbo_time_scale: 1.5,
            turbo_multiplier: 2.0,
            jump_boost: 1.3,
            pending_score_factor: 0.1,
        }
    }
}

/// Difficulty ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub start: f32,
    /// Increase per second of (modulated) running time
    pub ramp_per_second: f32,
    pub ceiling: f32,
    /// Seconds before the tutorial prompts give up
    pub tutorial_duration: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            start: 1.0,
            ramp_per_second: 0.02,
            ceiling: 2.5,
            tutorial_duration: 10.0,
        }
    }
}

/// Immutable content tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub powerups: Vec<PowerUpDef>,
    pub scenes: Vec<SceneDef>,
    pub skins: Vec<SkinDef>,
    pub achievements: Vec<AchievementDef>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            powerups: PowerUpDef::default_catalog(),
            scenes: SceneDef::default_catalog(),
            skins: SkinDef::default_catalog(),
            achievements: AchievementDef::default_catalog(),
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub spawn: SpawnTuning,
    pub powerups: PowerUpTuning,
    pub difficulty: DifficultyTuning,
    pub catalog: Catalog,
}

impl Tuning {
    /// Parse a (possibly partial) tuning override. Malformed input falls back
    /// to the built-in defaults, unusable values are put back one by one.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Tuning>(json) {
            Ok(mut tuning) => {
                tuning.sanitize();
                tuning
            }
            Err(e) => {
                log::warn!("Invalid tuning override, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Restore defaults for steps, intervals and durations that are not
    /// positive, for negative multipliers and for inverted interval ranges.
    /// Returns whether anything was replaced.
    pub fn sanitize(&mut self) -> bool {
        let world = WorldTuning::default();
        let player = PlayerTuning::default();
        let spawn = SpawnTuning::default();
        let pu = PowerUpTuning::default();

        let mut fixed = false;
        fixed |= positive_or(
            "world.max_frame_dt",
            &mut self.world.max_frame_dt,
            world.max_frame_dt,
        );
        fixed |= positive_or(
            "player.run_frame_time",
            &mut self.player.run_frame_time,
            player.run_frame_time,
        );
        fixed |= positive_or(
            "spawn.obstacle_interval_min",
            &mut self.spawn.obstacle_interval_min,
            spawn.obstacle_interval_min,
        );
        fixed |= positive_or(
            "spawn.fragment_interval_min",
            &mut self.spawn.fragment_interval_min,
            spawn.fragment_interval_min,
        );
        fixed |= at_least_or(
            "spawn.obstacle_interval_max",
            &mut self.spawn.obstacle_interval_max,
            self.spawn.obstacle_interval_min,
        );
        fixed |= at_least_or(
            "spawn.fragment_interval_max",
            &mut self.spawn.fragment_interval_max,
            self.spawn.fragment_interval_min,
        );
        fixed |= positive_or("powerups.duration", &mut self.powerups.duration, pu.duration);

        let p = &mut self.powerups;
        let multipliers = [
            ("slow_motion_scale", &mut p.slow_motion_scale, pu.slow_motion_scale),
            ("turbo_time_scale", &mut p.turbo_time_scale, pu.turbo_time_scale),
            ("turbo_multiplier", &mut p.turbo_multiplier, pu.turbo_multiplier),
            ("jump_boost", &mut p.jump_boost, pu.jump_boost),
            ("pending_score_factor", &mut p.pending_score_factor, pu.pending_score_factor),
        ];
        for (name, value, default) in multipliers {
            if !value.is_finite() || *value < 0.0 {
                log::warn!(
                    "Tuning powerups.{} = {} is negative, using {}",
                    name,
                    value,
                    default
                );
                *value = default;
                fixed = true;
            }
        }
        fixed
    }
}

fn positive_or(name: &str, value: &mut f32, default: f32) -> bool {
    if value.is_finite() && *value > 0.0 {
        return false;
    }
    log::warn!("Tuning {} = {} must be positive, using {}", name, value, default);
    *value = default;
    true
}

/// Upper end of a range may not fall below its lower end
fn at_least_or(name: &str, value: &mut f32, min: f32) -> bool {
    if value.is_finite() && *value >= min {
        return false;
    }
    log::warn!("Tuning {} = {} is below its minimum, using {}", name, value, min);
    *value = min;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let tuning = Tuning::from_json(r#"{ "world": { "ground_y": 200.0 } }"#);
        assert_eq!(tuning.world.ground_y, 200.0);
        assert_eq!(tuning.world.width, 480.0);
        assert_eq!(tuning.player, PlayerTuning::default());
        assert_eq!(tuning.catalog.powerups.len(), 3);
    }

    #[test]
    fn test_malformed_override_falls_back() {
        let tuning = Tuning::from_json("not json at all");
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_unusable_values_are_repaired() {
        let tuning = Tuning::from_json(
            r#"{
                "world": { "max_frame_dt": -1.0, "ground_y": 200.0 },
                "spawn": {
                    "obstacle_interval_min": 0.0,
                    "fragment_interval_min": 5.0,
                    "fragment_interval_max": 2.0
                },
                "powerups": { "slow_motion_scale": -0.5, "duration": 0.0 }
            }"#,
        );
        assert_eq!(tuning.world.max_frame_dt, 0.1);
        assert_eq!(tuning.world.ground_y, 200.0);
        assert_eq!(tuning.spawn.obstacle_interval_min, 1.5);
        assert_eq!(tuning.spawn.obstacle_interval_max, 3.0);
        assert_eq!(tuning.spawn.fragment_interval_max, 5.0);
        assert_eq!(tuning.powerups.slow_motion_scale, 0.3);
        assert_eq!(tuning.powerups.duration, 5.0);
    }

    #[test]
    fn test_defaults_need_no_repair() {
        let mut tuning = Tuning::default();
        assert!(!tuning.sanitize());
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_default_catalog_shape() {
        let catalog = Catalog::default();
        assert_eq!(catalog.scenes.len(), 3);
        assert_eq!(catalog.skins.len(), 3);
        assert_eq!(catalog.achievements.len(), 8);
    }
}
