//! Game session state
//!
//! Everything one play session owns: the ball, the obstacle pool, running
//! effects, score/level and the event queue the host drains each frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::difficulty::{kinds_for_level, spawn_rate_for_level};
use super::obstacles::{Obstacle, ObstacleManager};
use super::particles::{ActiveEffect, EffectKind, ParticleEngine};
use super::physics::{BodySnapshot, Bounds, PhysicsBody};
use crate::config::GameConfig;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, waiting for the host to start it
    NotStarted,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Session ended (terminal)
    GameOver,
}

/// Which input source drives the ball this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    Keyboard,
    Tilt,
}

/// Events for the host UI, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    ScoreChanged {
        score: i64,
    },
    /// The ball hit one or more blocking obstacles this tick
    Collision {
        count: u32,
        obstacle_ids: Vec<u64>,
        position: Vec3,
    },
    /// The ball picked up one or more collectibles this tick
    Collect {
        count: u32,
        obstacle_ids: Vec<u64>,
        position: Vec3,
    },
    LevelUp {
        level: u32,
    },
    EffectSpawned {
        id: u64,
        kind: EffectKind,
        position: Vec3,
    },
    EffectComplete {
        id: u64,
    },
    PhaseChanged {
        phase: GamePhase,
    },
}

/// Render-ready copy of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub score: i64,
    pub level: u32,
    pub ball: BodySnapshot,
    pub ball_radius: f32,
    pub obstacles: Vec<Obstacle>,
    pub effects: Vec<ActiveEffect>,
}

/// Seed offsets so each subsystem draws from its own stream
const OBSTACLE_STREAM: u64 = 0x0b57_ac1e;
const EFFECT_STREAM: u64 = 0xeff3_c75;

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub config: GameConfig,
    pub(crate) phase: GamePhase,
    pub ball: PhysicsBody,
    pub obstacles: ObstacleManager,
    pub effects: ParticleEngine,
    pub(crate) score: i64,
    pub(crate) level: u32,
    /// Locked by the first input source used
    pub input_mode: Option<InputMode>,
    /// Simulated seconds while running
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Next tick ignores the host dt (set on resume)
    pub(crate) skip_host_dt: bool,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session with the given config and seed
    pub fn new(config: GameConfig, seed: u64) -> Self {
        for warning in config.warnings() {
            log::warn!("{warning}");
        }

        let ball = PhysicsBody::new(Self::spawn_point(&config), config.physics);
        let obstacles = ObstacleManager::new(
            config.obstacles,
            config.arena,
            seed.wrapping_add(OBSTACLE_STREAM),
        );
        let effects = ParticleEngine::new(
            config.quality.particle_multiplier(),
            config.max_effects,
            seed.wrapping_add(EFFECT_STREAM),
        );

        let mut state = Self {
            seed,
            config,
            phase: GamePhase::NotStarted,
            ball,
            obstacles,
            effects,
            score: 0,
            level: 1,
            input_mode: None,
            elapsed: 0.0,
            time_ticks: 0,
            skip_host_dt: false,
            events: Vec::new(),
        };
        state.apply_difficulty();
        state
    }

    /// Ball start position: arena center, resting on the ground
    fn spawn_point(config: &GameConfig) -> Vec3 {
        Vec3::new(0.0, config.physics.ground_y, 0.0)
    }

    /// Bounds for the generic physics clamp (ball center stays on the floor)
    pub fn arena_bounds(&self) -> Bounds {
        Bounds::floor(self.config.arena.half_width(), self.config.arena.half_length())
    }

    pub fn ball_radius(&self) -> f32 {
        self.config.ball_radius
    }

    /// NotStarted -> Running
    pub fn start(&mut self) {
        if self.phase == GamePhase::NotStarted {
            log::info!("Session started (seed {})", self.seed);
            self.set_phase(GamePhase::Running);
        }
    }

    /// Running -> Paused
    pub fn pause(&mut self) {
        if self.phase == GamePhase::Running {
            log::info!("Paused at {:.1}s", self.elapsed);
            self.set_phase(GamePhase::Paused);
        }
    }

    /// Paused -> Running
    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            log::info!("Resumed");
            self.skip_host_dt = true;
            self.set_phase(GamePhase::Running);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Any non-terminal phase -> GameOver
    pub fn end(&mut self) {
        if self.phase != GamePhase::GameOver {
            log::info!("Game over: score {} at level {}", self.score, self.level);
            self.set_phase(GamePhase::GameOver);
        }
    }

    /// Reset score, level, ball, obstacles and effects and keep playing.
    ///
    /// Only valid for a live session (Running or Paused).
    pub fn restart(&mut self) {
        if !matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            return;
        }
        log::info!("Restarting session");
        self.ball.reset_physics(Self::spawn_point(&self.config));
        self.obstacles.clear_obstacles();
        // The host has seen EffectSpawned for every live effect
        let mut finished = self.effects.drain_completed();
        finished.extend(self.effects.effects().iter().map(|effect| effect.id));
        self.effects.clear_all_effects();
        for id in finished {
            self.push_event(GameEvent::EffectComplete { id });
        }
        self.elapsed = 0.0;
        self.level = 1;
        self.apply_difficulty();
        self.set_score(0);
        if self.phase == GamePhase::Paused {
            self.skip_host_dt = true;
            self.set_phase(GamePhase::Running);
        }
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn score(&self) -> i64 {
        self.score
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Push the current level's spawn rate and obstacle kinds to the pool
    pub(crate) fn apply_difficulty(&mut self) {
        let rate = spawn_rate_for_level(self.config.obstacles.spawn_rate, self.level);
        self.obstacles.set_spawn_rate(rate);
        self.obstacles.set_allowed_kinds(kinds_for_level(self.level));
    }

    pub(crate) fn set_score(&mut self, score: i64) {
        let score = score.max(0);
        if score != self.score {
            self.score = score;
            self.push_event(GameEvent::ScoreChanged { score });
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.push_event(GameEvent::PhaseChanged { phase });
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.phase,
            score: self.score,
            level: self.level,
            ball: self.ball.snapshot(),
            ball_radius: self.config.ball_radius,
            obstacles: self.obstacles.obstacles().to_vec(),
            effects: self.effects.effects().to_vec(),
        }
    }
}
