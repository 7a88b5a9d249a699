//! Per-frame simulation tick
//!
//! Advances the state machine by one variable-length frame. Real elapsed time
//! is clamped, then scaled by the current time-scale before it reaches any
//! gameplay system.

use super::player::PlayerIntent;
use super::powerup::PowerUpCategory;
use super::spawner::ObstacleCategory;
use super::state::{Decision, GameEvent, GamePhase, GameState, MenuTab};

/// Intents sampled for a single frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump held
    pub jump: bool,
    /// Slide held
    pub slide: bool,
    /// Start held (menu only)
    pub start: bool,
    /// Use-stored-slot held
    pub use_slot: bool,
    /// Option 1..3 pressed, as a 0-based index
    pub choice: Option<usize>,
    /// USE / STORE resolved by the UI
    pub decision: Option<Decision>,
    /// Mute key went down this frame
    pub mute: bool,
    /// Attract mode: the autopilot plays
    pub idle_mode: bool,
}

impl TickInput {
    fn intent(&self) -> PlayerIntent {
        PlayerIntent {
            jump: self.jump,
            slide: self.slide,
        }
    }
}

/// Advance the game state by one frame of `raw_dt` real seconds
pub fn tick(state: &mut GameState, input: &TickInput, raw_dt: f32) {
    // Garbage steps from the host count as no time passing
    let dt = if raw_dt.is_finite() {
        raw_dt.min(state.tuning.world.max_frame_dt).max(0.0)
    } else {
        0.0
    };

    let input = if input.idle_mode {
        autopilot(state, input)
    } else {
        input.clone()
    };

    match state.phase {
        GamePhase::Menu => {
            if input.start && state.menu_tab == MenuTab::Play {
                state.begin_run();
            }
            return;
        }
        GamePhase::GameOver => return,
        _ => {}
    }

    state.frame += 1;

    let pu = state.tuning.powerups;
    let diff = state.tuning.difficulty;
    let base_speed = state.tuning.world.base_scroll_speed;

    // Choosing always wins over turbo: it blocks normal running logic
    let speed_active = state.powerups.is_active(PowerUpCategory::Speed);
    state.time_scale = if state.phase.is_choice_pending() {
        pu.slow_motion_scale
    } else if speed_active {
        pu.turbo_time_scale
    } else {
        1.0
    };
    let game_dt = dt * state.time_scale;
    state.run_time += game_dt;

    if state.phase == GamePhase::Running {
        state.difficulty = (state.difficulty + diff.ramp_per_second * game_dt).min(diff.ceiling);
    }

    let boost = if speed_active { pu.turbo_multiplier } else { 1.0 };
    let current_speed = base_speed * state.difficulty * boost;
    state.scroll_distance += current_speed * game_dt;

    if speed_active {
        state.run_stats.turbo_distance += current_speed * game_dt / 100.0;
    }
    if state.powerups.is_active(PowerUpCategory::Shield) {
        state.run_stats.shield_time += game_dt;
    }

    match state.phase {
        GamePhase::Running => {
            if input.use_slot {
                state.use_stored();
            }
        }
        GamePhase::ChoosingPowerUp => {
            if let Some(index) = input.choice {
                state.choose(index);
            }
        }
        GamePhase::DecidingPowerUp { .. } => {
            if let Some(decision) = input.decision {
                state.decide(decision);
            }
        }
        _ => {}
    }

    let jump_multiplier = if state.powerups.is_active(PowerUpCategory::Jump) {
        pu.jump_boost
    } else {
        1.0
    };
    let step = state
        .player
        .update(game_dt, input.intent(), jump_multiplier);
    if step.jumped {
        state.run_stats.jumps += 1;
        let pos = state.player.pos;
        state.emit(GameEvent::Jumped { pos });
    }
    if step.landed {
        let pos = state.player.pos;
        state.emit(GameEvent::Landed { pos });
    }

    // Re-read: USE or the stored slot may have switched effects this frame
    let boost = if state.powerups.is_active(PowerUpCategory::Speed) {
        pu.turbo_multiplier
    } else {
        1.0
    };
    let spawned = state
        .spawner
        .update(game_dt, state.difficulty * boost, &mut state.rng);
    if spawned.obstacles_spawned + spawned.fragments_spawned + spawned.despawned > 0 {
        log::trace!("Frame {}: {:?}", state.frame, spawned);
    }

    if let Some(def) = state.powerups.tick(game_dt) {
        state.emit(GameEvent::PowerUpExpired { def });
    }

    if state.phase == GamePhase::Running {
        state.tutorial.update(dt, input.intent());
    }

    let score_mult = if state.phase.is_choice_pending() {
        pu.pending_score_factor
    } else {
        boost
    };
    state.score += base_speed * state.difficulty * game_dt * score_mult / 100.0;

    state.check_collisions();
}

/// Attract-mode pilot: hops ground obstacles, ducks airborne ones, takes the
/// first power-up offered and uses it on the spot.
fn autopilot(state: &GameState, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    match &state.phase {
        GamePhase::Menu => {
            input.start = state.menu_tab == MenuTab::Play;
        }
        GamePhase::ChoosingPowerUp => {
            input.choice = Some(0);
        }
        GamePhase::DecidingPowerUp { .. } => {
            input.decision = Some(Decision::Use);
        }
        GamePhase::Running => {
            let hitbox = state.player.hitbox();
            let speed = state.tuning.world.base_scroll_speed * state.difficulty;
            // Jump when the obstacle is about a quarter second away
            let lookahead = speed * 0.25;

            let threat = state
                .spawner
                .obstacles
                .iter()
                .filter(|o| o.rect.right() > hitbox.left())
                .filter(|o| o.rect.left() - hitbox.right() < lookahead)
                .min_by(|a, b| a.rect.left().total_cmp(&b.rect.left()));

            if let Some(obstacle) = threat {
                match obstacle.kind.category() {
                    ObstacleCategory::Airborne => input.slide = true,
                    ObstacleCategory::GroundRigid | ObstacleCategory::GroundShallow => {
                        input.jump = true
                    }
                }
            }

            if state.powerups.active().is_none() && state.powerups.stored().is_some() {
                input.use_slot = true;
            }
        }
        GamePhase::GameOver => {}
    }
    input
}
