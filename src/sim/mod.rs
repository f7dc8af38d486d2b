//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Host-supplied variable `dt`, everything scaled by it
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod obstacles;
pub mod particles;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::{is_colliding, sphere_overlap};
pub use difficulty::{kinds_for_level, level_threshold, spawn_rate_for_level};
pub use obstacles::{CollisionReport, Obstacle, ObstacleKind, ObstacleManager};
pub use particles::{ActiveEffect, EffectKind, EffectParams, EffectProfile, Particle, ParticleEngine};
pub use physics::{BodySnapshot, Bounds, Direction, PhysicsBody};
pub use state::{GameEvent, GamePhase, GameState, InputMode, RenderSnapshot};
pub use tick::{KeyState, Tilt, TickInput, tick};
