//! Game state and core simulation types
//!
//! One `GameState` lives for the whole session; runs reset it in place.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{all_overlaps, first_overlap};
use super::player::{Player, PlayerIntent};
use super::powerup::{PowerUpCategory, PowerUpDef, PowerUpManager};
use super::spawner::{ObstacleKind, Spawner};
use crate::consts::{DEFAULT_SCENE, DEFAULT_SKIN};
use crate::progression::Unlock;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title / menu screens, nothing simulates
    Menu,
    /// Active gameplay
    Running,
    /// Run ended, waiting for the player to go back to the menu
    GameOver,
    /// Slow motion, options on the table (see `PowerUpManager::choices`)
    ChoosingPowerUp,
    /// Slow motion, one option picked, waiting for USE or STORE
    DecidingPowerUp { choice: PowerUpDef },
}

impl GamePhase {
    /// Choosing or deciding
    pub fn is_choice_pending(&self) -> bool {
        matches!(
            self,
            GamePhase::ChoosingPowerUp | GamePhase::DecidingPowerUp { .. }
        )
    }

    /// Any phase where the world moves
    pub fn is_in_run(&self) -> bool {
        matches!(self, GamePhase::Running) || self.is_choice_pending()
    }
}

/// Which menu page is showing. Only `Play` accepts the start intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MenuTab {
    #[default]
    Play,
    Scenes,
    Skins,
    Achievements,
}

/// What to do with the picked power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Activate now
    Use,
    /// Put in the stored slot for later
    Store,
}

/// Scene and skin the run is played with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub scene: String,
    pub skin: String,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            scene: DEFAULT_SCENE.to_string(),
            skin: DEFAULT_SKIN.to_string(),
        }
    }
}

/// Counters for a single run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub jumps: u32,
    /// Eco fragments collected
    pub eco_points: u32,
    pub powerup_choices: u32,
    pub stored_used: u32,
    /// Seconds spent shielded
    pub shield_time: f32,
    /// Metres scrolled while SPEED was active
    pub turbo_distance: f32,
}

/// First-run control prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorialStep {
    /// "Press jump"
    Jump,
    /// "Press slide"
    Slide,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tutorial {
    pub step: TutorialStep,
    pub elapsed: f32,
    duration: f32,
}

impl Tutorial {
    pub fn new(duration: f32) -> Self {
        Self {
            step: TutorialStep::Jump,
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance on real time. Prompts give up after the configured duration.
    pub fn update(&mut self, dt: f32, intent: PlayerIntent) {
        if self.step == TutorialStep::Done {
            return;
        }
        self.elapsed += dt;
        self.step = match self.step {
            TutorialStep::Jump if intent.jump => TutorialStep::Slide,
            TutorialStep::Slide if intent.slide => TutorialStep::Done,
            step => step,
        };
        if self.elapsed > self.duration {
            self.step = TutorialStep::Done;
        }
    }
}

/// Outbound notifications, drained once per frame by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    RunStarted { loadout: Loadout },
    Jumped { pos: Vec2 },
    Landed { pos: Vec2 },
    FragmentCollected { id: u32, pos: Vec2 },
    ChoicesOffered { options: Vec<PowerUpDef> },
    ChoiceMade { choice: PowerUpDef },
    PowerUpActivated { def: PowerUpDef },
    PowerUpStored { def: PowerUpDef, replaced: Option<PowerUpDef> },
    StoredPowerUpUsed { def: PowerUpDef },
    PowerUpExpired { def: PowerUpDef },
    ObstacleHit { id: u32, kind: ObstacleKind, pos: Vec2 },
    ShieldAbsorbed { id: u32, pos: Vec2 },
    RunEnded { scene: String, score: f32, stats: RunStats },
    NewRecord { scene: String, score: u64 },
    Unlocked(Unlock),
    ReturnedToMenu,
    MuteToggled { muted: bool },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// The only randomness source; lent to the spawner and power-ups
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub menu_tab: MenuTab,
    /// Applied at the next run start
    pub loadout: Loadout,
    pub player: Player,
    pub spawner: Spawner,
    pub powerups: PowerUpManager,
    pub score: f32,
    pub difficulty: f32,
    /// Time-scale applied during the last frame
    pub time_scale: f32,
    /// Total scrolled distance in px (parallax input)
    pub scroll_distance: f32,
    /// Modulated seconds since the run started
    pub run_time: f32,
    pub run_stats: RunStats,
    pub tutorial: Tutorial,
    /// Frames simulated this run
    pub frame: u64,
    /// Obstacle the shield last absorbed, reported once
    absorbed: Option<u32>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session in the menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let spawner = Spawner::new(tuning.spawn, tuning.world, &mut rng);
        let powerups = PowerUpManager::new(
            tuning.catalog.powerups.clone(),
            tuning.powerups.duration,
            tuning.powerups.choice_count,
        );
        Self {
            seed,
            rng,
            phase: GamePhase::Menu,
            menu_tab: MenuTab::Play,
            loadout: Loadout::default(),
            player: Player::new(tuning.player, tuning.world.ground_y),
            spawner,
            powerups,
            score: 0.0,
            difficulty: tuning.difficulty.start,
            time_scale: 1.0,
            scroll_distance: 0.0,
            run_time: 0.0,
            run_stats: RunStats::default(),
            tutorial: Tutorial::new(tuning.difficulty.tutorial_duration),
            frame: 0,
            absorbed: None,
            events: Vec::new(),
            tuning,
        }
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reinitialize all per-run state and start running
    pub fn begin_run(&mut self) {
        self.player = Player::new(self.tuning.player, self.tuning.world.ground_y);
        self.spawner.reset(&mut self.rng);
        self.powerups.reset();
        self.score = 0.0;
        self.difficulty = self.tuning.difficulty.start;
        self.time_scale = 1.0;
        self.scroll_distance = 0.0;
        self.run_time = 0.0;
        self.run_stats = RunStats::default();
        self.tutorial = Tutorial::new(self.tuning.difficulty.tutorial_duration);
        self.frame = 0;
        self.absorbed = None;
        self.phase = GamePhase::Running;
        log::info!(
            "Run started (scene {}, skin {})",
            self.loadout.scene,
            self.loadout.skin
        );
        self.emit(GameEvent::RunStarted {
            loadout: self.loadout.clone(),
        });
    }

    /// Open the power-up choice. Re-entering while already choosing just
    /// redraws the options.
    pub fn start_choice(&mut self) {
        self.phase = GamePhase::ChoosingPowerUp;
        let options = self.powerups.generate_choices(&mut self.rng).to_vec();
        self.emit(GameEvent::ChoicesOffered { options });
    }

    /// Pick option `index`. Ignored outside the choosing phase or for an
    /// index with nothing on offer.
    pub fn choose(&mut self, index: usize) -> bool {
        if self.phase != GamePhase::ChoosingPowerUp {
            return false;
        }
        let Some(choice) = self.powerups.take_choice(index) else {
            return false;
        };
        self.run_stats.powerup_choices += 1;
        self.phase = GamePhase::DecidingPowerUp {
            choice: choice.clone(),
        };
        self.emit(GameEvent::ChoiceMade { choice });
        true
    }

    /// Resolve the picked option. Ignored outside the deciding phase.
    pub fn decide(&mut self, decision: Decision) -> bool {
        let GamePhase::DecidingPowerUp { choice } = &self.phase else {
            return false;
        };
        let choice = choice.clone();
        match decision {
            Decision::Use => {
                self.powerups.activate(choice.clone());
                self.emit(GameEvent::PowerUpActivated { def: choice });
            }
            Decision::Store => {
                let replaced = self.powerups.stored().cloned();
                self.powerups.store(choice.clone());
                self.emit(GameEvent::PowerUpStored {
                    def: choice,
                    replaced,
                });
            }
        }
        self.phase = GamePhase::Running;
        true
    }

    /// Fire the stored power-up. Only while running.
    pub fn use_stored(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        let Some(def) = self.powerups.stored().cloned() else {
            return false;
        };
        if self.powerups.use_stored() {
            self.run_stats.stored_used += 1;
            self.emit(GameEvent::StoredPowerUpUsed { def });
            return true;
        }
        false
    }

    /// Terminal transition for the run
    pub fn end_run(&mut self) {
        self.phase = GamePhase::GameOver;
        log::info!(
            "Run over: score {:.0}, difficulty {:.2}",
            self.score,
            self.difficulty
        );
        self.emit(GameEvent::RunEnded {
            scene: self.loadout.scene.clone(),
            score: self.score,
            stats: self.run_stats.clone(),
        });
    }

    /// Leave the game-over screen. Ignored in any other phase.
    pub fn return_to_menu(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::Menu;
        self.emit(GameEvent::ReturnedToMenu);
        true
    }

    /// Player vs. obstacles, then player vs. fragments.
    ///
    /// An unshielded obstacle hit ends the run and skips fragment pickup.
    pub fn check_collisions(&mut self) {
        let hitbox = self.player.hitbox();

        let obstacles = self.spawner.obstacles.iter().map(|o| o.rect);
        if let Some(idx) = first_overlap(&hitbox, obstacles) {
            let obstacle = &self.spawner.obstacles[idx];
            let (id, kind) = (obstacle.id, obstacle.kind);
            let pos = self.player.pos;
            if !self.powerups.is_active(PowerUpCategory::Shield) {
                self.emit(GameEvent::ObstacleHit { id, kind, pos });
                self.end_run();
                return;
            }
            if self.absorbed != Some(id) {
                self.absorbed = Some(id);
                self.emit(GameEvent::ShieldAbsorbed { id, pos });
            }
        }

        let fragments = self.spawner.fragments.iter().map(|f| f.rect);
        let hits: Vec<u32> = all_overlaps(&hitbox, fragments)
            .into_iter()
            .map(|idx| self.spawner.fragments[idx].id)
            .collect();
        for id in hits {
            let Some(fragment) = self.spawner.take_fragment(id) else {
                continue;
            };
            self.run_stats.eco_points += 1;
            self.emit(GameEvent::FragmentCollected {
                id: fragment.id,
                pos: fragment.rect.pos,
            });
            self.start_choice();
        }
    }
}
