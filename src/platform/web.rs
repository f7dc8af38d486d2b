//! Browser binding
//!
//! Wraps one [`GameState`] for a JS host. Input arrives as plain numbers and
//! booleans once per frame; events and render snapshots leave as JSON.

use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::sim::{GameState, KeyState, Tilt, TickInput, tick};

/// Install the panic hook and console logger (idempotent)
#[wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

/// One play session owned by the page
#[wasm_bindgen]
pub struct WebSession {
    state: GameState,
    input: TickInput,
}

#[wasm_bindgen]
impl WebSession {
    /// `config_json` may be empty for defaults; `seed == 0` picks one from the clock
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, seed: u64) -> WebSession {
        let config = if config_json.trim().is_empty() {
            GameConfig::default()
        } else {
            GameConfig::from_json(config_json).unwrap_or_else(|e| {
                log::warn!("{e}; using default config");
                GameConfig::default()
            })
        };
        let seed = if seed == 0 {
            js_sys::Date::now() as u64
        } else {
            seed
        };
        log::info!("Game initialized with seed: {}", seed);
        WebSession {
            state: GameState::new(config, seed),
            input: TickInput::default(),
        }
    }

    pub fn start(&mut self) {
        self.state.start();
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn resume(&mut self) {
        self.state.resume();
    }

    pub fn end(&mut self) {
        self.state.end();
    }

    pub fn restart(&mut self) {
        self.state.restart();
    }

    /// Key state for the next tick
    pub fn set_keys(&mut self, up: bool, down: bool, left: bool, right: bool, jump: bool) {
        self.input.keys = KeyState {
            up,
            down,
            left,
            right,
            jump,
        };
    }

    /// Tilt reading for the next tick
    pub fn set_tilt(&mut self, x: f32, y: f32) {
        self.input.tilt = Some(Tilt { x, y });
    }

    /// Advance one frame; `dt` in seconds
    pub fn tick(&mut self, dt: f32) {
        tick(&mut self.state, &self.input, dt);
        // Jump is edge-triggered, the rest is held state
        self.input.keys.jump = false;
    }

    pub fn score(&self) -> i64 {
        self.state.score()
    }

    pub fn level(&self) -> u32 {
        self.state.level()
    }

    /// Drain pending events as a JSON array
    pub fn drain_events_json(&mut self) -> String {
        let events = self.state.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Current render snapshot as JSON
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.state.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}
