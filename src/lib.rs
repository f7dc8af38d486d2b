//! Ball Roller - simulation core for a 3D ball-rolling arcade mini-game
//!
//! Core modules:
//! - `sim`: Simulation (ball physics, obstacles, particle effects, game loop)
//! - `config`: Host-supplied session configuration
//! - `platform`: Browser host binding

pub mod config;
pub mod platform;
pub mod sim;

pub use config::{ConfigError, GameConfig, QualityPreset};

/// Game configuration constants
pub mod consts {
    /// Reference tick used by per-tick tuning values (60 Hz)
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
    /// Largest dt a single tick will integrate (stalls and tab switches)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena dimensions (x extent, z extent)
    pub const ARENA_WIDTH: f32 = 20.0;
    pub const ARENA_LENGTH: f32 = 20.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BALL_JUMP_FORCE: f32 = 6.0;
    /// Velocity retained when the ball surface hits the arena edge
    pub const ARENA_BOUNCE: f32 = -0.8;

    /// Physics defaults
    pub const GRAVITY: f32 = 20.0;
    pub const FRICTION: f32 = 0.98;
    pub const ACCELERATION: f32 = 0.6;
    pub const MAX_SPEED: f32 = 12.0;
    pub const BOUNCE_ENERGY: f32 = 0.6;

    /// Obstacle defaults
    pub const MAX_OBSTACLES: i32 = 12;
    pub const SPAWN_RATE: f32 = 0.8;
    pub const COLLECTIBLE_CHANCE: f32 = 0.2;

    /// Scoring
    pub const COLLISION_PENALTY: i64 = 50;
    pub const COLLECT_REWARD: i64 = 100;
    pub const LEVEL_UP_SCORE: i64 = 500;
    pub const MAX_LEVEL: u32 = 10;

    /// Effects alive at once before the oldest is retired
    pub const MAX_EFFECTS: usize = 32;
}

/// Clamp `value` into `[-limit, limit]`, treating a negative limit as zero
#[inline]
pub fn clamp_symmetric(value: f32, limit: f32) -> f32 {
    let limit = limit.max(0.0);
    value.clamp(-limit, limit)
}
