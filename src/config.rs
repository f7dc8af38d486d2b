//! Session configuration
//!
//! Supplied by the host once at session start. Every section defaults, so a
//! partial JSON document only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid configuration JSON.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Multiplier applied to each effect's base particle count
    pub fn particle_multiplier(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.5,
        }
    }
}

/// Arena floor dimensions, centered on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Extent along x
    pub width: f32,
    /// Extent along z
    pub length: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            length: ARENA_LENGTH,
        }
    }
}

impl ArenaConfig {
    #[inline]
    pub fn half_width(&self) -> f32 {
        (self.width / 2.0).max(0.0)
    }

    #[inline]
    pub fn half_length(&self) -> f32 {
        (self.length / 2.0).max(0.0)
    }
}

/// Integrator constants for a physics body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Horizontal velocity retained per tick, in (0, 1]
    pub friction: f32,
    /// Velocity added per unit of `apply_force` magnitude
    pub acceleration: f32,
    /// Hard clamp on each horizontal velocity axis
    pub max_speed: f32,
    /// Restitution on boundary reflection (0 = inelastic, 1 = elastic)
    pub bounce_energy: f32,
    /// Height at which a body rests
    pub ground_y: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            acceleration: ACCELERATION,
            max_speed: MAX_SPEED,
            bounce_energy: BOUNCE_ENERGY,
            ground_y: BALL_RADIUS,
        }
    }
}

/// Obstacle pool tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Active (uncollected) obstacle cap; `<= 0` disables spawning
    pub max_obstacles: i32,
    /// Base spawn rate in obstacles/second; `<= 0` never spawns
    pub spawn_rate: f32,
    /// Probability that a timer spawn is collectible
    pub collectible_chance: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            max_obstacles: MAX_OBSTACLES,
            spawn_rate: SPAWN_RATE,
            collectible_chance: COLLECTIBLE_CHANCE,
        }
    }
}

/// Score rules and level progression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Subtracted once per tick with at least one blocking hit
    pub collision_penalty: i64,
    /// Added once per tick with at least one pickup
    pub collect_reward: i64,
    /// Level `n` ends once the score reaches `n * level_up_score`
    pub level_up_score: i64,
    pub max_level: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            collision_penalty: COLLISION_PENALTY,
            collect_reward: COLLECT_REWARD,
            level_up_score: LEVEL_UP_SCORE,
            max_level: MAX_LEVEL,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub ball_radius: f32,
    pub jump_force: f32,
    pub physics: PhysicsConfig,
    pub obstacles: ObstacleConfig,
    pub scoring: ScoringConfig,
    /// Particle density preset
    pub quality: QualityPreset,
    /// Effects alive at once; `0` disables effects entirely
    pub max_effects: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            ball_radius: BALL_RADIUS,
            jump_force: BALL_JUMP_FORCE,
            physics: PhysicsConfig::default(),
            obstacles: ObstacleConfig::default(),
            scoring: ScoringConfig::default(),
            quality: QualityPreset::default(),
            max_effects: MAX_EFFECTS,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a config file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys cannot fail to serialize
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Settings that will degrade a feature rather than fail
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.obstacles.max_obstacles <= 0 {
            warnings.push(format!(
                "max_obstacles = {}: obstacle spawning disabled",
                self.obstacles.max_obstacles
            ));
        }
        if !(self.obstacles.spawn_rate > 0.0) {
            warnings.push(format!(
                "spawn_rate = {}: obstacles will never spawn",
                self.obstacles.spawn_rate
            ));
        }
        if !(self.ball_radius > 0.0) {
            warnings.push(format!(
                "ball_radius = {}: ball collisions disabled",
                self.ball_radius
            ));
        }
        if !(self.physics.friction > 0.0 && self.physics.friction <= 1.0) {
            warnings.push(format!(
                "friction = {} outside (0, 1]",
                self.physics.friction
            ));
        }
        if self.scoring.level_up_score <= 0 {
            warnings.push(format!(
                "level_up_score = {}: levels will not advance",
                self.scoring.level_up_score
            ));
        }
        if self.arena.width <= 0.0 || self.arena.length <= 0.0 {
            warnings.push(format!(
                "arena {}x{} is degenerate",
                self.arena.width, self.arena.length
            ));
        }
        warnings
    }
}
