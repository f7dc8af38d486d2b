//! Particle effects
//!
//! An effect is a burst of particles sharing spawn parameters and a single
//! lifetime. Each kind has its own particle count and launch pattern; every
//! particle then flies, spins and fades on its own until the effect's
//! duration runs out or all of its particles have faded.
//!
//! Completion is reported through a queue the game loop drains once per
//! tick ([`ParticleEngine::drain_completed`]).

use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Downward pull applied to explosion debris (units/s²)
pub const EXPLOSION_GRAVITY: f32 = 2.5;
/// Particle lifespan range as a fraction of effect duration
pub const LIFESPAN_MIN: f32 = 0.7;
pub const LIFESPAN_MAX: f32 = 1.3;
/// Fallback color when a scheme is empty
const DEFAULT_COLOR: u32 = 0xFFFFFF;

/// Effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Explosion,
    Sparkle,
    Trail,
    Collect,
}

/// Spawn parameters derived from an effect kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectProfile {
    /// Particles per effect at Medium quality
    pub count: usize,
    /// Base launch speed (units/s)
    pub speed: f32,
    /// Base particle scale
    pub size: f32,
    /// Launch direction jitter
    pub spread: f32,
    /// Max spin (radians/s per axis)
    pub spin: f32,
}

impl EffectKind {
    pub fn profile(&self) -> EffectProfile {
        match self {
            EffectKind::Explosion => EffectProfile {
                count: 35,
                speed: 4.0,
                size: 0.18,
                spread: 0.35,
                spin: 8.0,
            },
            EffectKind::Trail => EffectProfile {
                count: 8,
                speed: 1.2,
                size: 0.08,
                spread: 0.2,
                spin: 2.0,
            },
            EffectKind::Sparkle => EffectProfile {
                count: 15,
                speed: 0.8,
                size: 0.1,
                spread: 0.5,
                spin: 4.0,
            },
            EffectKind::Collect => EffectProfile {
                count: 20,
                speed: 2.0,
                size: 0.12,
                spread: 0.25,
                spin: 6.0,
            },
        }
    }

    /// Launch direction for particle `index` of `count` (before scaling)
    fn launch_direction(&self, index: usize, count: usize, rng: &mut Pcg32) -> Vec3 {
        match self {
            // Uniform over the sphere
            EffectKind::Explosion => {
                let theta = rng.random_range(0.0..TAU);
                let cos_phi: f32 = rng.random_range(-1.0..=1.0);
                let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
                Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin())
            }
            // Narrow upward cone
            EffectKind::Trail => {
                let spread = self.profile().spread;
                Vec3::new(
                    rng.random_range(-spread..=spread),
                    1.0,
                    rng.random_range(-spread..=spread),
                )
                .normalize_or_zero()
            }
            // Any direction, gently
            EffectKind::Sparkle => Vec3::new(
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
            )
            .normalize_or_zero(),
            // Rise while pulling in toward the vertical axis
            EffectKind::Collect => {
                let angle = index as f32 / count.max(1) as f32 * TAU;
                let inward = -Vec3::new(angle.cos(), 0.0, angle.sin()) * 0.4;
                (inward + Vec3::Y).normalize_or_zero()
            }
        }
    }

    /// Spawn offset from the effect origin
    fn spawn_offset(&self, index: usize, count: usize, scale: f32) -> Vec3 {
        match self {
            EffectKind::Collect => {
                let angle = index as f32 / count.max(1) as f32 * TAU;
                Vec3::new(angle.cos(), 0.0, angle.sin()) * 0.5 * scale
            }
            _ => Vec3::ZERO,
        }
    }
}

/// Host-tunable effect parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    /// Colors particles pick from (0xRRGGBB)
    pub color_scheme: Vec<u32>,
    /// Multiplies particle size, speed and spawn radius
    pub scale: f32,
    /// Seconds
    pub duration: f32,
}

impl EffectParams {
    /// Default look for each kind
    pub fn for_kind(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Explosion => Self {
                color_scheme: vec![0xFF4500, 0xFF8C00, 0xFFD700],
                scale: 1.0,
                duration: 1.0,
            },
            EffectKind::Sparkle => Self {
                color_scheme: vec![0xFFFFFF, 0xE0FFFF, 0x87CEFA],
                scale: 1.0,
                duration: 1.2,
            },
            EffectKind::Trail => Self {
                color_scheme: vec![0x4ECDC4, 0x45B7D1],
                scale: 1.0,
                duration: 0.5,
            },
            EffectKind::Collect => Self {
                color_scheme: vec![0xFFD700, 0xFFF176, 0xFFFFFF],
                scale: 1.0,
                duration: 0.8,
            },
        }
    }
}

/// A single particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Vec3,
    pub rotation_speed: Vec3,
    pub scale: f32,
    /// Scale lost per second
    pub scale_speed: f32,
    /// 0-1
    pub opacity: f32,
    /// Opacity lost per second
    pub opacity_speed: f32,
    pub color: u32,
    /// Seconds until fully faded
    pub lifespan: f32,
}

impl Particle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.opacity > 0.0 && self.scale > 0.0
    }
}

/// A running effect and its particles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: u64,
    pub kind: EffectKind,
    pub position: Vec3,
    pub color_scheme: Vec<u32>,
    pub scale: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub active: bool,
    pub particles: Vec<Particle>,
}

impl ActiveEffect {
    pub fn live_particles(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Advance one tick. Returns true on the tick the effect finishes.
    fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.active = false;
            return true;
        }

        let gravity = if self.kind == EffectKind::Explosion {
            EXPLOSION_GRAVITY
        } else {
            0.0
        };

        let mut any_alive = false;
        for p in self.particles.iter_mut().filter(|p| p.is_alive()) {
            p.velocity.y -= gravity * dt;
            p.position += p.velocity * dt;
            p.rotation += p.rotation_speed * dt;
            p.scale = (p.scale - p.scale_speed * dt).max(0.0);
            p.opacity = (p.opacity - p.opacity_speed * dt).max(0.0);
            any_alive |= p.is_alive();
        }

        // Everything faded early: retire now instead of idling out the duration
        if !any_alive {
            self.active = false;
            return true;
        }
        false
    }
}

/// Owns every running effect
#[derive(Debug, Clone)]
pub struct ParticleEngine {
    effects: Vec<ActiveEffect>,
    index: FxHashMap<u64, usize>,
    next_id: u64,
    completed: Vec<u64>,
    /// Particle count multiplier (quality preset)
    density: f32,
    max_effects: usize,
    rng: Pcg32,
}

impl ParticleEngine {
    pub fn new(density: f32, max_effects: usize, seed: u64) -> Self {
        Self {
            effects: Vec::new(),
            index: FxHashMap::default(),
            next_id: 1,
            completed: Vec::new(),
            density: density.max(0.0),
            max_effects,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn get(&self, id: u64) -> Option<&ActiveEffect> {
        self.index.get(&id).map(|&i| &self.effects[i])
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.effects.iter().map(|e| e.particles.len()).sum()
    }

    /// Start an effect and return its id.
    ///
    /// With `max_effects == 0` nothing is spawned and the effect is reported
    /// complete right away, so callers see the same lifecycle either way.
    pub fn create_effect(&mut self, kind: EffectKind, position: Vec3, params: EffectParams) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.max_effects == 0 {
            self.completed.push(id);
            return id;
        }
        while self.effects.len() >= self.max_effects {
            // Oldest first: ids only grow, so the smallest id is the oldest
            let Some(oldest) = self.effects.iter().map(|e| e.id).min() else {
                break;
            };
            log::debug!("Effect cap reached, retiring #{oldest}");
            self.take(oldest);
            self.completed.push(oldest);
        }

        let profile = kind.profile();
        let scale = if params.scale.is_finite() { params.scale.max(0.0) } else { 1.0 };
        let duration = if params.duration.is_finite() { params.duration.max(0.0) } else { 0.0 };
        let count = ((profile.count as f32) * self.density).round() as usize;

        let mut particles = Vec::with_capacity(count);
        for i in 0..count {
            particles.push(self.spawn_particle(kind, &profile, &params.color_scheme, i, count, scale, duration));
        }

        log::debug!(
            "Effect #{id} {:?} at {:?}: {} particles, {:.2}s",
            kind,
            position,
            particles.len(),
            duration
        );

        self.index.insert(id, self.effects.len());
        self.effects.push(ActiveEffect {
            id,
            kind,
            position,
            color_scheme: params.color_scheme,
            scale,
            duration,
            elapsed: 0.0,
            active: true,
            particles,
        });
        id
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_particle(
        &mut self,
        kind: EffectKind,
        profile: &EffectProfile,
        colors: &[u32],
        index: usize,
        count: usize,
        scale: f32,
        duration: f32,
    ) -> Particle {
        let rng = &mut self.rng;

        let jitter = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        ) * profile.spread;
        let direction = (kind.launch_direction(index, count, rng) + jitter * 0.5).normalize_or_zero();
        let speed = profile.speed * scale * rng.random_range(0.6..=1.2);

        let size = profile.size * scale * rng.random_range(0.7..=1.3);
        let lifespan = duration * rng.random_range(LIFESPAN_MIN..=LIFESPAN_MAX);
        // Zero lifespan fades instantly
        let rate = |amount: f32| {
            if lifespan > 0.0 { amount / lifespan } else { f32::INFINITY }
        };

        let color = if colors.is_empty() {
            DEFAULT_COLOR
        } else {
            colors[rng.random_range(0..colors.len())]
        };

        let spin = profile.spin;
        let rotation_speed = Vec3::new(
            rng.random_range(-spin..=spin),
            rng.random_range(-spin..=spin),
            rng.random_range(-spin..=spin),
        );

        Particle {
            id: index as u32,
            position: kind.spawn_offset(index, count, scale),
            velocity: direction * speed,
            rotation: Vec3::ZERO,
            rotation_speed,
            scale: size,
            scale_speed: rate(size),
            opacity: 1.0,
            opacity_speed: rate(1.0),
            color,
            lifespan,
        }
    }

    /// Advance every effect; finished ones move to the completed queue
    pub fn update(&mut self, dt: f32) {
        let mut finished = Vec::new();
        for effect in self.effects.iter_mut() {
            if effect.advance(dt) {
                finished.push(effect.id);
            }
        }
        for id in finished {
            log::debug!("Effect #{id} complete");
            self.take(id);
            self.completed.push(id);
        }
    }

    /// Ids completed since the last drain, each reported exactly once
    pub fn drain_completed(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.completed)
    }

    /// Drop an effect without reporting completion. Returns false if unknown.
    pub fn remove_effect(&mut self, id: u64) -> bool {
        self.take(id).is_some()
    }

    pub fn clear_all_effects(&mut self) {
        self.effects.clear();
        self.index.clear();
        self.completed.clear();
    }

    /// Swap-and-pop `id` out of the pool
    fn take(&mut self, id: u64) -> Option<ActiveEffect> {
        let i = self.index.remove(&id)?;
        let effect = self.effects.swap_remove(i);
        if let Some(moved) = self.effects.get(i) {
            self.index.insert(moved.id, i);
        }
        Some(effect)
    }
}
