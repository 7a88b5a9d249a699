//! Session façade: simulation, progression and settings behind one frame call
//!
//! The platform layer feeds a `TickInput` per frame and reads back a
//! `Snapshot` plus the drained events. Run results reach the profile here,
//! so the simulation never touches storage.

use serde::Serialize;

use crate::persistence;
use crate::platform::input::InputState;
use crate::platform::storage::SharedStore;
use crate::progression::{PersistentProfile, Progression};
use crate::settings::Settings;
use crate::sim::collision::Rect;
use crate::sim::player::PlayerPose;
use crate::sim::powerup::{ActivePowerUp, PowerUpDef};
use crate::sim::spawner::{Fragment, Obstacle};
use crate::sim::state::{
    Decision, GameEvent, GamePhase, GameState, Loadout, MenuTab, RunStats, TutorialStep,
};
use crate::sim::tick::{TickInput, tick};
use crate::tuning::Tuning;

/// Everything a renderer or HUD needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: GamePhase,
    pub menu_tab: MenuTab,
    pub loadout: Loadout,
    pub score: u64,
    pub difficulty: f32,
    pub time_scale: f32,
    pub scroll_distance: f32,
    pub player: Rect,
    pub pose: PlayerPose,
    pub anim_frame: u32,
    pub obstacles: Vec<Obstacle>,
    pub fragments: Vec<Fragment>,
    pub active: Option<ActivePowerUp>,
    /// Whole seconds left on `active`
    pub active_time_left: u32,
    pub stored: Option<PowerUpDef>,
    pub choices: Vec<PowerUpDef>,
    pub tutorial: TutorialStep,
    pub run_stats: RunStats,
    pub muted: bool,
}

pub struct Game {
    state: GameState,
    progression: Progression,
    settings: Settings,
    store: SharedStore,
    outbox: Vec<GameEvent>,
}

impl Game {
    /// Load profile and settings from `store` and open the menu
    pub fn new(seed: u64, tuning: Tuning, store: SharedStore) -> Self {
        let progression = Progression::load(store.clone(), tuning.catalog.clone());
        let settings: Settings = persistence::load(&*store.borrow());
        let mut state = GameState::new(seed, tuning);
        state.loadout = Loadout {
            scene: progression.selected_scene().to_string(),
            skin: progression.selected_skin().to_string(),
        };
        log::info!("Session seed {}", seed);
        Self {
            state,
            progression,
            settings,
            store,
            outbox: Vec::new(),
        }
    }

    /// Advance one frame of `dt` real seconds
    pub fn frame(&mut self, input: &TickInput, dt: f32) {
        if input.mute {
            let muted = self.settings.toggle_mute();
            self.save_settings();
            self.outbox.push(GameEvent::MuteToggled { muted });
        }

        if self.state.phase == GamePhase::Menu {
            self.sync_loadout();
        }

        tick(&mut self.state, input, dt);
        self.pump();
    }

    /// Sample `keys` and advance one frame. Every key is released when a run
    /// starts, so the start press never reaches the first running frame.
    pub fn frame_keys(&mut self, keys: &mut InputState, idle_mode: bool, dt: f32) {
        let mut input = keys.tick_input();
        input.idle_mode = idle_mode;
        let was_menu = self.state.phase == GamePhase::Menu;
        self.frame(&input, dt);
        if was_menu && self.state.phase.is_in_run() {
            keys.reset();
        }
    }

    /// Events since the last drain, in the order they happened
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn sync_loadout(&mut self) {
        let scene = self.progression.selected_scene();
        let skin = self.progression.selected_skin();
        if self.state.loadout.scene != scene || self.state.loadout.skin != skin {
            self.state.loadout = Loadout {
                scene: scene.to_string(),
                skin: skin.to_string(),
            };
        }
    }

    /// Move simulation events to the outbox, folding finished runs into the
    /// profile on the way
    fn pump(&mut self) {
        for event in self.state.drain_events() {
            match &event {
                GameEvent::RunStarted { .. } if !self.settings.show_tutorial => {
                    self.state.tutorial.step = TutorialStep::Done;
                    self.outbox.push(event);
                }
                GameEvent::RunEnded {
                    scene,
                    score,
                    stats,
                } => {
                    let outcome = self.progression.record_run(scene, *score, stats);
                    let scene = scene.clone();
                    self.outbox.push(event);
                    if outcome.new_record {
                        self.outbox.push(GameEvent::NewRecord {
                            scene,
                            score: outcome.best,
                        });
                    }
                    self.outbox
                        .extend(outcome.unlocks.into_iter().map(GameEvent::Unlocked));
                }
                _ => self.outbox.push(event),
            }
        }
    }

    fn save_settings(&self) {
        if let Err(e) = persistence::save(&mut *self.store.borrow_mut(), &self.settings) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    // === UI-driven interactions (invalid ones are ignored) ===

    /// Switch menu page. Only meaningful in the menu.
    pub fn set_menu_tab(&mut self, tab: MenuTab) -> bool {
        if self.state.phase != GamePhase::Menu {
            return false;
        }
        self.state.menu_tab = tab;
        true
    }

    /// Pick power-up option `index` (0-based)
    pub fn choose(&mut self, index: usize) -> bool {
        let ok = self.state.choose(index);
        self.pump();
        ok
    }

    /// USE or STORE the picked option
    pub fn decide(&mut self, decision: Decision) -> bool {
        let ok = self.state.decide(decision);
        self.pump();
        ok
    }

    pub fn return_to_menu(&mut self) -> bool {
        let ok = self.state.return_to_menu();
        self.pump();
        if ok {
            self.sync_loadout();
        }
        ok
    }

    pub fn select_scene(&mut self, id: &str) -> bool {
        let ok = self.progression.select_scene(id);
        if ok && self.state.phase == GamePhase::Menu {
            self.sync_loadout();
        }
        ok
    }

    pub fn select_skin(&mut self, id: &str) -> bool {
        let ok = self.progression.select_skin(id);
        if ok && self.state.phase == GamePhase::Menu {
            self.sync_loadout();
        }
        ok
    }

    /// Wipe the profile. Settings are kept.
    pub fn reset_progress(&mut self) {
        self.progression.reset_progress();
        if self.state.phase == GamePhase::Menu {
            self.sync_loadout();
        }
    }

    /// Replace preferences and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.save_settings();
    }

    // === Read accessors ===

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        Snapshot {
            phase: state.phase.clone(),
            menu_tab: state.menu_tab,
            loadout: state.loadout.clone(),
            score: state.score.max(0.0).floor() as u64,
            difficulty: state.difficulty,
            time_scale: state.time_scale,
            scroll_distance: state.scroll_distance,
            player: state.player.bounds(),
            pose: state.player.pose(),
            anim_frame: state.player.frame_index,
            obstacles: state.spawner.obstacles.clone(),
            fragments: state.spawner.fragments.clone(),
            active: state.powerups.active().cloned(),
            active_time_left: state.powerups.active_time_left(),
            stored: state.powerups.stored().cloned(),
            choices: state.powerups.choices().to_vec(),
            tutorial: state.tutorial.step,
            run_stats: state.run_stats.clone(),
            muted: self.settings.muted,
        }
    }

    pub fn phase(&self) -> &GamePhase {
        &self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for debugging tools and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn profile(&self) -> &PersistentProfile {
        self.progression.profile()
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
