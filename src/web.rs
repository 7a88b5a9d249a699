//! JavaScript bindings
//!
//! The page owns the canvas, the audio and the DOM menus. It forwards key
//! events, calls `frame` from `requestAnimationFrame` and renders from the
//! JSON snapshot and events it gets back.

use wasm_bindgen::prelude::*;

use crate::game::Game;
use crate::platform::{InputState, default_store, init_logging};
use crate::sim::state::{Decision, MenuTab};
use crate::tuning::Tuning;

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    input: InputState,
    /// Attract mode: the built-in pilot plays
    idle: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// `seed` is usually `Date.now()`. `tuning_json` may be empty.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64, tuning_json: &str) -> WebGame {
        init_logging();
        log::info!("Eco Dash starting...");
        let tuning = if tuning_json.is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json)
        };
        WebGame {
            game: Game::new(seed as u64, tuning, default_store()),
            input: InputState::new(),
            idle: false,
        }
    }

    pub fn key_down(&mut self, code: &str) {
        self.input.key_down(code);
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    /// Window lost focus: drop every held key
    pub fn blur(&mut self) {
        self.input.reset();
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }

    /// Advance by `dt` seconds of real time
    pub fn frame(&mut self, dt: f32) {
        self.game.frame_keys(&mut self.input, self.idle, dt);
    }

    pub fn choose(&mut self, index: u32) -> bool {
        self.game.choose(index as usize)
    }

    /// `true` to USE the picked power-up, `false` to STORE it
    pub fn decide(&mut self, use_now: bool) -> bool {
        let decision = if use_now {
            Decision::Use
        } else {
            Decision::Store
        };
        self.game.decide(decision)
    }

    pub fn return_to_menu(&mut self) -> bool {
        self.game.return_to_menu()
    }

    /// One of `play`, `scenes`, `skins`, `achievements`
    pub fn set_menu_tab(&mut self, tab: &str) -> bool {
        let tab = match tab {
            "play" => MenuTab::Play,
            "scenes" => MenuTab::Scenes,
            "skins" => MenuTab::Skins,
            "achievements" => MenuTab::Achievements,
            _ => return false,
        };
        self.game.set_menu_tab(tab)
    }

    pub fn select_scene(&mut self, id: &str) -> bool {
        self.game.select_scene(id)
    }

    pub fn select_skin(&mut self, id: &str) -> bool {
        self.game.select_skin(id)
    }

    pub fn reset_progress(&mut self) {
        self.game.reset_progress();
    }

    pub fn snapshot_json(&self) -> String {
        to_json(&self.game.snapshot())
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> String {
        to_json(&self.game.drain_events())
    }

    pub fn profile_json(&self) -> String {
        to_json(self.game.profile())
    }

    pub fn catalog_json(&self) -> String {
        to_json(self.game.progression().catalog())
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::warn!("Serialization failed: {}", e);
        "null".to_string()
    })
}
