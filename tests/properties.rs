//! Property-based tests for the simulation invariants.
//!
//! Run with: cargo test --test properties

use ball_roller::config::{ArenaConfig, ObstacleConfig, PhysicsConfig};
use ball_roller::sim::{
    Direction, EffectKind, EffectParams, ObstacleManager, ParticleEngine, PhysicsBody,
    is_colliding,
};
use glam::Vec3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    prop::array::uniform3(-50.0..50.0f32).prop_map(Vec3::from_array)
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Left),
        Just(Direction::Right),
        Just(Direction::Forward),
        Just(Direction::Backward),
    ]
}

fn arb_physics() -> impl Strategy<Value = PhysicsConfig> {
    (
        0.0..30.0f32,
        0.5..=1.0f32,
        0.001..2.0f32,
        0.01..20.0f32,
        0.0..=1.0f32,
    )
        .prop_map(|(gravity, friction, acceleration, max_speed, bounce_energy)| PhysicsConfig {
            gravity,
            friction,
            acceleration,
            max_speed,
            bounce_energy,
            ground_y: 0.5,
        })
}

fn arb_effect_kind() -> impl Strategy<Value = EffectKind> {
    prop_oneof![
        Just(EffectKind::Explosion),
        Just(EffectKind::Sparkle),
        Just(EffectKind::Trail),
        Just(EffectKind::Collect),
    ]
}

// =============================================================================
// Physics
// =============================================================================

proptest! {
    /// No sequence of pushes exceeds the horizontal speed clamp.
    #[test]
    fn velocity_never_exceeds_max_speed(
        config in arb_physics(),
        pushes in prop::collection::vec((arb_direction(), 0.0..50.0f32), 1..64),
    ) {
        let mut body = PhysicsBody::new(Vec3::ZERO, config);
        for (direction, magnitude) in pushes {
            body.apply_force(direction, magnitude);
            let v = body.velocity();
            prop_assert!(v.x.abs() <= config.max_speed);
            prop_assert!(v.z.abs() <= config.max_speed);
        }
    }

    /// A body at or below the ground after an update is resting.
    #[test]
    fn ground_invariant_holds(
        config in arb_physics(),
        start_y in -5.0..10.0f32,
        vy in -20.0..20.0f32,
        steps in prop::collection::vec(0.001..0.1f32, 1..60),
    ) {
        let mut body = PhysicsBody::new(Vec3::new(0.0, start_y, 0.0), config);
        body.jump(vy.max(0.0));
        for dt in steps {
            let snap = body.update_physics(dt, None);
            if snap.position.y <= config.ground_y {
                prop_assert!(snap.grounded);
                prop_assert_eq!(snap.velocity.y, 0.0);
            }
        }
    }

    /// Only the first of two jumps without landing has any effect.
    #[test]
    fn airborne_jump_is_ignored(config in arb_physics(), first in 0.1..10.0f32, second in 0.1..10.0f32) {
        let mut body = PhysicsBody::new(Vec3::ZERO, config);
        body.jump(first);
        let after_first = body.velocity();
        body.jump(second);
        prop_assert_eq!(body.velocity(), after_first);
    }
}

// =============================================================================
// Collision
// =============================================================================

proptest! {
    #[test]
    fn collision_is_symmetric(a in arb_vec3(), b in arb_vec3(), ra in -1.0..5.0f32, rb in -1.0..5.0f32) {
        prop_assert_eq!(is_colliding(a, ra, b, rb), is_colliding(b, rb, a, ra));
    }

    #[test]
    fn non_positive_reach_never_collides(a in arb_vec3(), ra in -5.0..0.0f32, rb in -5.0..0.0f32) {
        prop_assert!(!is_colliding(a, ra, a, rb));
    }
}

// =============================================================================
// Obstacles
// =============================================================================

proptest! {
    /// Uncollected obstacles never exceed the cap, whatever the tick sequence.
    #[test]
    fn obstacle_pool_respects_cap(
        max_obstacles in -2..8i32,
        spawn_rate in 0.0..50.0f32,
        seed in any::<u64>(),
        ticks in prop::collection::vec((0.001..0.2f32, any::<bool>()), 1..200),
    ) {
        let mut manager = ObstacleManager::new(
            ObstacleConfig { max_obstacles, spawn_rate, collectible_chance: 0.5 },
            ArenaConfig::default(),
            seed,
        );
        let cap = max_obstacles.max(0) as usize;
        for (dt, probe) in ticks {
            manager.update(dt);
            if probe {
                manager.check_collisions(Vec3::new(0.0, 0.5, 0.0), 4.0);
            }
            prop_assert!(manager.active_count() <= cap);
        }
    }
}

// =============================================================================
// Particles
// =============================================================================

proptest! {
    /// Every particle fades within 1.3x the duration and the effect
    /// completes exactly once.
    #[test]
    fn effects_terminate_exactly_once(
        kind in arb_effect_kind(),
        duration in 0.05..3.0f32,
        scale in 0.1..4.0f32,
        seed in any::<u64>(),
    ) {
        let mut engine = ParticleEngine::new(1.0, 8, seed);
        let params = EffectParams { duration, scale, ..EffectParams::for_kind(kind) };
        let id = engine.create_effect(kind, Vec3::ZERO, params);

        for p in &engine.get(id).unwrap().particles {
            // Linear decay reaches zero at the particle's lifespan
            prop_assert!(p.lifespan <= duration * 1.3 + 1e-4);
            prop_assert!((p.opacity_speed * p.lifespan - 1.0).abs() < 1e-3);
        }

        let dt = 1.0 / 60.0;
        let mut completions = 0;
        let mut t = 0.0;
        while t < duration * 1.3 + 0.5 {
            engine.update(dt);
            completions += engine.drain_completed().into_iter().filter(|&c| c == id).count();
            t += dt;
        }
        prop_assert_eq!(completions, 1);
        prop_assert!(engine.get(id).is_none());
    }
}
