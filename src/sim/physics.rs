//! Arcade ball integrator
//!
//! Approximate, per-tick physics for the player ball: directional impulses,
//! gravity with a flat ground plane, friction damping and bouncing off an
//! axis-aligned box.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::is_colliding;
use crate::clamp_symmetric;
use crate::config::PhysicsConfig;

/// Visual roll rate (radians per unit travelled)
const ROLL_RATE: f32 = 2.0;

/// Horizontal push directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// -x
    Left,
    /// +x
    Right,
    /// -z
    Forward,
    /// +z
    Backward,
}

/// Axis-aligned box a body is kept inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Floor rectangle centered on the origin, unbounded vertically
    pub fn floor(half_width: f32, half_length: f32) -> Self {
        Self {
            min: Vec3::new(-half_width, f32::NEG_INFINITY, -half_length),
            max: Vec3::new(half_width, f32::INFINITY, half_length),
        }
    }
}

/// Value copy of a body handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
    pub grounded: bool,
}

/// A dynamic actor driven by the arcade integrator
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    position: Vec3,
    velocity: Vec3,
    rotation: Vec3,
    grounded: bool,
    config: PhysicsConfig,
}

impl PhysicsBody {
    pub fn new(position: Vec3, config: PhysicsConfig) -> Self {
        let mut body = Self {
            position,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            grounded: false,
            config,
        };
        body.reset_physics(position);
        body
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position,
            velocity: self.velocity,
            rotation: self.rotation,
            grounded: self.grounded,
        }
    }

    /// Push along a horizontal axis, then clamp both horizontal axes
    pub fn apply_force(&mut self, direction: Direction, magnitude: f32) {
        let delta = self.config.acceleration * magnitude;
        match direction {
            Direction::Left => self.velocity.x -= delta,
            Direction::Right => self.velocity.x += delta,
            Direction::Forward => self.velocity.z -= delta,
            Direction::Backward => self.velocity.z += delta,
        }
        self.clamp_horizontal_speed();
    }

    /// Launch upward; ignored unless resting on the ground
    pub fn jump(&mut self, force: f32) {
        if !self.grounded {
            return;
        }
        self.velocity.y = force;
        self.grounded = false;
    }

    /// Advance one tick and return the resulting state
    pub fn update_physics(&mut self, dt: f32, bounds: Option<&Bounds>) -> BodySnapshot {
        let ground_y = self.config.ground_y;

        // Friction
        self.velocity.x *= self.config.friction;
        self.velocity.z *= self.config.friction;

        // Gravity, or rest on the ground. A body that has just jumped is
        // still at ground height but rising, so it must not be pinned.
        if self.position.y > ground_y || self.velocity.y > 0.0 {
            self.velocity.y -= self.config.gravity * dt;
            self.grounded = false;
        } else {
            self.settle(ground_y);
        }

        self.position += self.velocity * dt;

        // Landing
        if self.position.y <= ground_y {
            self.settle(ground_y);
        }

        if let Some(bounds) = bounds {
            self.bounce_within(bounds);
        }

        // Rolling illusion only, no effect on the simulation
        self.rotation.x += self.velocity.z * dt * ROLL_RATE;
        self.rotation.z -= self.velocity.x * dt * ROLL_RATE;

        self.snapshot()
    }

    /// Sphere test between this body and another position
    pub fn check_collision(&self, other_pos: Vec3, r1: f32, r2: f32) -> bool {
        is_colliding(self.position, r1, other_pos, r2)
    }

    /// Teleport to `new_position` with all motion cleared
    pub fn reset_physics(&mut self, new_position: Vec3) {
        self.position = new_position;
        self.velocity = Vec3::ZERO;
        self.rotation = Vec3::ZERO;
        self.grounded = new_position.y <= self.config.ground_y;
        if self.grounded {
            self.position.y = self.config.ground_y;
        }
    }

    /// Pin one axis to `edge`. Velocity heading past it (sign of `outward`)
    /// is scaled by `factor`; velocity already heading back is left alone.
    pub(crate) fn reflect_axis(&mut self, axis: usize, edge: f32, outward: f32, factor: f32) {
        self.position[axis] = edge;
        if self.velocity[axis] * outward > 0.0 {
            self.velocity[axis] *= factor;
        }
    }

    fn settle(&mut self, ground_y: f32) {
        self.position.y = ground_y;
        self.velocity.y = 0.0;
        self.grounded = true;
    }

    fn clamp_horizontal_speed(&mut self) {
        self.velocity.x = clamp_symmetric(self.velocity.x, self.config.max_speed);
        self.velocity.z = clamp_symmetric(self.velocity.z, self.config.max_speed);
    }

    fn bounce_within(&mut self, bounds: &Bounds) {
        for axis in 0..3 {
            let (min, max) = (bounds.min[axis], bounds.max[axis]);
            if self.position[axis] < min {
                self.position[axis] = min;
                self.velocity[axis] = -self.velocity[axis] * self.config.bounce_energy;
            } else if self.position[axis] > max {
                self.position[axis] = max;
                self.velocity[axis] = -self.velocity[axis] * self.config.bounce_energy;
            }
        }
    }
}
