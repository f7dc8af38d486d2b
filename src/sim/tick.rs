//! Per-frame simulation tick
//!
//! Core game loop: input, ball physics, obstacles, collisions, effects and
//! level progression, in that order.

use glam::Vec3;

use super::difficulty::level_threshold;
use super::particles::{EffectKind, EffectParams};
use super::physics::Direction;
use super::state::{GameEvent, GamePhase, GameState, InputMode};
use crate::consts::*;

/// Tilt below this magnitude is ignored
pub const TILT_DEAD_ZONE: f32 = 0.1;

/// Directional key state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl KeyState {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right || self.jump
    }
}

/// Device tilt, each axis nominally in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    /// Positive rolls the ball right (+x)
    pub x: f32,
    /// Positive rolls the ball toward the player (+z)
    pub y: f32,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: KeyState,
    /// Tilt sensor reading, if the device has one
    pub tilt: Option<Tilt>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the session by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        state.toggle_pause();
        if state.phase == GamePhase::Paused {
            return;
        }
    }

    // Don't tick unless running
    if state.phase != GamePhase::Running {
        return;
    }

    if !(dt > 0.0) || !dt.is_finite() {
        return;
    }
    // The first frame after a pause would carry the whole pause gap
    let dt = if state.skip_host_dt {
        state.skip_host_dt = false;
        REFERENCE_DT
    } else {
        dt.min(MAX_FRAME_DT)
    };

    state.time_ticks += 1;
    state.elapsed += dt;

    route_input(state, input);
    move_ball(state, dt);
    state.obstacles.update(dt);
    resolve_collisions(state);
    update_effects(state, dt);
    update_level(state);
}

/// Pick the session's input source and turn it into ball impulses
fn route_input(state: &mut GameState, input: &TickInput) {
    let mode = match state.input_mode {
        Some(mode) => mode,
        None => {
            let detected = if input.tilt.is_some_and(|t| tilt_magnitude(t) > TILT_DEAD_ZONE) {
                Some(InputMode::Tilt)
            } else if input.keys.any() {
                Some(InputMode::Keyboard)
            } else {
                None
            };
            let Some(mode) = detected else {
                return;
            };
            log::info!("Input mode locked to {:?}", mode);
            state.input_mode = Some(mode);
            mode
        }
    };

    match mode {
        InputMode::Keyboard => {
            let keys = input.keys;
            if keys.up {
                state.ball.apply_force(Direction::Forward, 1.0);
            }
            if keys.down {
                state.ball.apply_force(Direction::Backward, 1.0);
            }
            if keys.left {
                state.ball.apply_force(Direction::Left, 1.0);
            }
            if keys.right {
                state.ball.apply_force(Direction::Right, 1.0);
            }
            if keys.jump {
                state.ball.jump(state.config.jump_force);
            }
        }
        InputMode::Tilt => {
            let Some(tilt) = input.tilt else {
                return;
            };
            let x = dead_zone(tilt.x);
            let y = dead_zone(tilt.y);
            if x > 0.0 {
                state.ball.apply_force(Direction::Right, x);
            } else if x < 0.0 {
                state.ball.apply_force(Direction::Left, -x);
            }
            if y > 0.0 {
                state.ball.apply_force(Direction::Backward, y);
            } else if y < 0.0 {
                state.ball.apply_force(Direction::Forward, -y);
            }
        }
    }
}

fn tilt_magnitude(tilt: Tilt) -> f32 {
    let (x, y) = (dead_zone(tilt.x), dead_zone(tilt.y));
    x.abs().max(y.abs())
}

/// Zero inside the dead zone, clamped to [-1, 1], NaN reads as zero
fn dead_zone(value: f32) -> f32 {
    if !value.is_finite() || value.abs() < TILT_DEAD_ZONE {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}

/// Generic physics step, then the arena edge rule for the ball surface
fn move_ball(state: &mut GameState, dt: f32) {
    let bounds = state.arena_bounds();
    let snapshot = state.ball.update_physics(dt, Some(&bounds));

    let radius = state.ball_radius().max(0.0);
    let limits = [
        (0, (state.config.arena.half_width() - radius).max(0.0)),
        (2, (state.config.arena.half_length() - radius).max(0.0)),
    ];
    for (axis, limit) in limits {
        let value = snapshot.position[axis];
        if value > limit {
            state.ball.reflect_axis(axis, limit, 1.0, ARENA_BOUNCE);
        } else if value < -limit {
            state.ball.reflect_axis(axis, -limit, -1.0, ARENA_BOUNCE);
        }
    }
}

/// Ball vs obstacles, scoring and feedback effects
fn resolve_collisions(state: &mut GameState) {
    let ball_pos = state.ball.position();
    let report = state.obstacles.check_collisions(ball_pos, state.ball_radius());
    if report.is_empty() {
        return;
    }

    if report.collision_count > 0 {
        log::debug!("Hit {} obstacle(s) at {:?}", report.collision_count, ball_pos);
        state.push_event(GameEvent::Collision {
            count: report.collision_count,
            obstacle_ids: report.collided_ids.clone(),
            position: ball_pos,
        });
        let penalty = state.config.scoring.collision_penalty;
        state.set_score(state.score.saturating_sub(penalty));
        spawn_effect(state, EffectKind::Explosion, ball_pos);
    }

    if report.collected_count > 0 {
        log::debug!("Collected {} at {:?}", report.collected_count, ball_pos);
        state.push_event(GameEvent::Collect {
            count: report.collected_count,
            obstacle_ids: report.collected_ids.clone(),
            position: ball_pos,
        });
        let reward = state.config.scoring.collect_reward;
        state.set_score(state.score.saturating_add(reward));
        spawn_effect(state, EffectKind::Collect, ball_pos);
    }
}

fn spawn_effect(state: &mut GameState, kind: EffectKind, position: Vec3) {
    let id = state
        .effects
        .create_effect(kind, position, EffectParams::for_kind(kind));
    state.push_event(GameEvent::EffectSpawned { id, kind, position });
}

fn update_effects(state: &mut GameState, dt: f32) {
    state.effects.update(dt);
    for id in state.effects.drain_completed() {
        state.push_event(GameEvent::EffectComplete { id });
    }
}

/// Level up while the score has crossed the current level's threshold
fn update_level(state: &mut GameState) {
    let scoring = state.config.scoring;
    while state.level < scoring.max_level {
        let Some(threshold) = level_threshold(state.level, scoring.level_up_score) else {
            return;
        };
        if state.score < threshold {
            return;
        }
        state.level += 1;
        state.apply_difficulty();
        log::info!(
            "Level {} (spawn rate {:.2}/s)",
            state.level,
            state.obstacles.spawn_rate()
        );
        state.push_event(GameEvent::LevelUp { level: state.level });
    }
}
