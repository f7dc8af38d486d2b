//! Obstacle pool
//!
//! Obstacles enter from the arena edges on a spawn timer, drift inward,
//! and leave once they cross the far edge or after being collected.
//! The pool is a contiguous vector with an id -> index map; removals are
//! swap-and-pop so the vector never has holes.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::collision::{is_colliding, sphere_overlap};
use crate::config::{ArenaConfig, ObstacleConfig};
use crate::consts::REFERENCE_DT;

/// Size range of a spawned obstacle
pub const OBSTACLE_SIZE_MIN: f32 = 0.3;
pub const OBSTACLE_SIZE_MAX: f32 = 0.6;
/// Inbound speed range, per 60 Hz reference tick
pub const OBSTACLE_TICK_SPEED_MIN: f32 = 0.01;
pub const OBSTACLE_TICK_SPEED_MAX: f32 = 0.04;
/// Spin rate (radians/sec per axis)
pub const OBSTACLE_SPIN: Vec3 = Vec3::new(0.6, 1.2, 0.3);
/// Out-of-bounds margin as a multiple of obstacle size
const EXIT_MARGIN: f32 = 2.0;
/// Updates a collected obstacle survives before it is dropped
const COLLECTED_LINGER_TICKS: u32 = 1;

/// Collectible color (gold)
pub const COLLECTIBLE_COLOR: u32 = 0xFFD700;
/// Blocking obstacle colors
pub const ACCENT_COLORS: [u32; 3] = [0xFF6B6B, 0x4ECDC4, 0x45B7D1];

/// Obstacle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cube,
    Sphere,
    Cylinder,
    Ramp,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Cube,
        ObstacleKind::Sphere,
        ObstacleKind::Cylinder,
        ObstacleKind::Ramp,
    ];
}

/// Arena edge an obstacle enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    North,
    South,
    West,
    East,
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub kind: ObstacleKind,
    pub position: Vec3,
    /// Units/second
    pub velocity: Vec3,
    pub size: f32,
    pub rotation: Vec3,
    pub color: u32,
    pub collected: bool,
    pub is_collectible: bool,
    /// Updates seen since collection
    #[serde(default)]
    pub collected_age: u32,
}

impl Obstacle {
    /// True once the obstacle has left the arena by more than its margin
    pub fn is_out_of_bounds(&self, half_width: f32, half_length: f32) -> bool {
        let margin = self.size * EXIT_MARGIN;
        self.position.x.abs() > half_width + margin || self.position.z.abs() > half_length + margin
    }
}

/// Result of one ball-vs-pool collision pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionReport {
    pub collected_count: u32,
    pub collision_count: u32,
    /// Collected obstacle ids, deepest overlap first
    pub collected_ids: Vec<u64>,
    /// Blocking obstacle ids, deepest overlap first
    pub collided_ids: Vec<u64>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.collected_count == 0 && self.collision_count == 0
    }
}

/// Owns and advances every obstacle in the arena
#[derive(Debug, Clone)]
pub struct ObstacleManager {
    obstacles: Vec<Obstacle>,
    index: FxHashMap<u64, usize>,
    next_id: u64,
    spawn_timer: f32,
    config: ObstacleConfig,
    arena: ArenaConfig,
    allowed_kinds: Vec<ObstacleKind>,
    rng: Pcg32,
}

impl ObstacleManager {
    pub fn new(config: ObstacleConfig, arena: ArenaConfig, seed: u64) -> Self {
        Self {
            obstacles: Vec::new(),
            index: FxHashMap::default(),
            next_id: 1,
            spawn_timer: 0.0,
            config,
            arena,
            allowed_kinds: ObstacleKind::ALL.to_vec(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn get(&self, id: u64) -> Option<&Obstacle> {
        self.index.get(&id).map(|&i| &self.obstacles[i])
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Obstacles not yet collected
    pub fn active_count(&self) -> usize {
        self.obstacles.iter().filter(|o| !o.collected).count()
    }

    pub fn spawn_rate(&self) -> f32 {
        self.config.spawn_rate
    }

    pub fn set_spawn_rate(&mut self, spawn_rate: f32) {
        self.config.spawn_rate = spawn_rate;
    }

    pub fn allowed_kinds(&self) -> &[ObstacleKind] {
        &self.allowed_kinds
    }

    /// Restrict timer spawns to `kinds`; an empty set falls back to cubes
    pub fn set_allowed_kinds(&mut self, kinds: &[ObstacleKind]) {
        self.allowed_kinds = if kinds.is_empty() {
            vec![ObstacleKind::Cube]
        } else {
            kinds.to_vec()
        };
    }

    fn capacity(&self) -> usize {
        usize::try_from(self.config.max_obstacles).unwrap_or(0)
    }

    fn has_room(&self) -> bool {
        self.active_count() < self.capacity()
    }

    /// Build an obstacle on a random arena edge, heading inward.
    ///
    /// Allocates an id but does not insert it into the pool.
    pub fn create_obstacle(&mut self, kind: ObstacleKind, is_collectible: bool) -> Obstacle {
        let half_w = self.arena.half_width();
        let half_l = self.arena.half_length();

        let edge = match self.rng.random_range(0..4u8) {
            0 => Edge::North,
            1 => Edge::South,
            2 => Edge::West,
            _ => Edge::East,
        };
        let size = self.rng.random_range(OBSTACLE_SIZE_MIN..=OBSTACLE_SIZE_MAX);
        let speed = self
            .rng
            .random_range(OBSTACLE_TICK_SPEED_MIN..=OBSTACLE_TICK_SPEED_MAX)
            / REFERENCE_DT;

        let (position, velocity) = match edge {
            Edge::North => (
                Vec3::new(self.rng.random_range(-half_w..=half_w), size, -half_l),
                Vec3::new(0.0, 0.0, speed),
            ),
            Edge::South => (
                Vec3::new(self.rng.random_range(-half_w..=half_w), size, half_l),
                Vec3::new(0.0, 0.0, -speed),
            ),
            Edge::West => (
                Vec3::new(-half_w, size, self.rng.random_range(-half_l..=half_l)),
                Vec3::new(speed, 0.0, 0.0),
            ),
            Edge::East => (
                Vec3::new(half_w, size, self.rng.random_range(-half_l..=half_l)),
                Vec3::new(-speed, 0.0, 0.0),
            ),
        };

        let color = if is_collectible {
            COLLECTIBLE_COLOR
        } else {
            ACCENT_COLORS[self.rng.random_range(0..ACCENT_COLORS.len())]
        };

        Obstacle {
            id: self.next_obstacle_id(),
            kind,
            position,
            velocity,
            size,
            rotation: Vec3::ZERO,
            color,
            collected: false,
            is_collectible,
            collected_age: 0,
        }
    }

    /// Add an obstacle to the pool if the active cap allows it
    pub fn insert(&mut self, obstacle: Obstacle) -> Option<u64> {
        if !obstacle.collected && !self.has_room() {
            return None;
        }
        if self.index.contains_key(&obstacle.id) {
            return None;
        }
        // Keep ids unique even for obstacles built outside create_obstacle
        self.next_id = self.next_id.max(obstacle.id.saturating_add(1));

        let id = obstacle.id;
        self.index.insert(id, self.obstacles.len());
        self.obstacles.push(obstacle);
        Some(id)
    }

    /// Create and insert in one step
    pub fn spawn(&mut self, kind: ObstacleKind, is_collectible: bool) -> Option<u64> {
        if !self.has_room() {
            return None;
        }
        let obstacle = self.create_obstacle(kind, is_collectible);
        log::debug!(
            "Spawned {:?} #{} at {:?} (collectible: {})",
            obstacle.kind,
            obstacle.id,
            obstacle.position,
            obstacle.is_collectible
        );
        self.insert(obstacle)
    }

    /// Spawn timer, motion, then retirement
    pub fn update(&mut self, dt: f32) {
        self.spawn_timer += dt;
        let rate = self.config.spawn_rate;
        if rate > 0.0 && rate.is_finite() && self.spawn_timer > 1.0 / rate && self.has_room() {
            self.spawn_timer = 0.0;
            let kind = self.allowed_kinds[self.rng.random_range(0..self.allowed_kinds.len())];
            let chance = self.config.collectible_chance.clamp(0.0, 1.0) as f64;
            let is_collectible = self.rng.random_bool(chance);
            self.spawn(kind, is_collectible);
        }

        for obstacle in self.obstacles.iter_mut() {
            if obstacle.collected {
                obstacle.collected_age += 1;
                continue;
            }
            obstacle.position += obstacle.velocity * dt;
            obstacle.rotation += OBSTACLE_SPIN * dt;
        }

        let half_w = self.arena.half_width();
        let half_l = self.arena.half_length();
        self.remove_where(|o| {
            if o.collected {
                o.collected_age > COLLECTED_LINGER_TICKS
            } else {
                o.is_out_of_bounds(half_w, half_l)
            }
        });
    }

    /// Mark an obstacle collected; unknown ids and repeats are ignored
    pub fn collect_obstacle(&mut self, id: u64) {
        if let Some(&i) = self.index.get(&id) {
            let obstacle = &mut self.obstacles[i];
            if !obstacle.collected {
                obstacle.collected = true;
                obstacle.collected_age = 0;
            }
        }
    }

    /// Test the ball against every live obstacle.
    ///
    /// Collectibles that are hit get collected; blocking hits are only
    /// counted. Hits are gathered first and applied after the scan.
    pub fn check_collisions(&mut self, ball_pos: Vec3, ball_radius: f32) -> CollisionReport {
        let mut collected: Vec<(f32, u64)> = Vec::new();
        let mut collided: Vec<(f32, u64)> = Vec::new();

        for obstacle in self.obstacles.iter().filter(|o| !o.collected) {
            if !is_colliding(ball_pos, ball_radius, obstacle.position, obstacle.size) {
                continue;
            }
            let depth =
                sphere_overlap(ball_pos, ball_radius, obstacle.position, obstacle.size).unwrap_or(0.0);
            if obstacle.is_collectible {
                collected.push((depth, obstacle.id));
            } else {
                collided.push((depth, obstacle.id));
            }
        }

        // Deepest first, lower id wins ties
        let by_depth = |a: &(f32, u64), b: &(f32, u64)| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1));
        collected.sort_by(by_depth);
        collided.sort_by(by_depth);

        for &(_, id) in &collected {
            self.collect_obstacle(id);
        }

        CollisionReport {
            collected_count: collected.len() as u32,
            collision_count: collided.len() as u32,
            collected_ids: collected.into_iter().map(|(_, id)| id).collect(),
            collided_ids: collided.into_iter().map(|(_, id)| id).collect(),
        }
    }

    /// Empty the pool (game restart). Ids keep counting up.
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
        self.index.clear();
        self.spawn_timer = 0.0;
    }

    fn next_obstacle_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Swap-and-pop every obstacle matching `pred`, walking backwards so
    /// each moved element has already been visited
    fn remove_where(&mut self, pred: impl Fn(&Obstacle) -> bool) {
        let mut i = self.obstacles.len();
        while i > 0 {
            i -= 1;
            if !pred(&self.obstacles[i]) {
                continue;
            }
            let removed = self.obstacles.swap_remove(i);
            self.index.remove(&removed.id);
            if let Some(moved) = self.obstacles.get(i) {
                self.index.insert(moved.id, i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(max_obstacles: i32, spawn_rate: f32) -> ObstacleManager {
        ObstacleManager::new(
            ObstacleConfig {
                max_obstacles,
                spawn_rate,
                collectible_chance: 0.2,
            },
            ArenaConfig {
                width: 20.0,
                length: 20.0,
            },
            7,
        )
    }

    fn placed(m: &mut ObstacleManager, kind: ObstacleKind, collectible: bool, pos: Vec3) -> u64 {
        let mut obstacle = m.create_obstacle(kind, collectible);
        obstacle.position = pos;
        obstacle.size = 0.5;
        obstacle.velocity = Vec3::ZERO;
        m.insert(obstacle).unwrap()
    }

    #[test]
    fn test_create_obstacle_on_edge_heading_inward() {
        let mut m = manager(10, 1.0);
        for _ in 0..100 {
            let o = m.create_obstacle(ObstacleKind::Sphere, false);
            assert!((OBSTACLE_SIZE_MIN..=OBSTACLE_SIZE_MAX).contains(&o.size));
            let on_x_edge = o.position.x.abs() == 10.0;
            let on_z_edge = o.position.z.abs() == 10.0;
            assert!(on_x_edge || on_z_edge);

            // Inward: velocity opposes the edge coordinate
            let speed = o.velocity.length();
            assert!(speed >= 0.6 - 1e-4 && speed <= 2.4 + 1e-4);
            if on_x_edge && o.velocity.x != 0.0 {
                assert!(o.velocity.x * o.position.x < 0.0);
            }
            if on_z_edge && o.velocity.z != 0.0 {
                assert!(o.velocity.z * o.position.z < 0.0);
            }
            assert!(ACCENT_COLORS.contains(&o.color));
        }
        assert!(m.is_empty());
    }

    #[test]
    fn test_collectible_color_and_unique_ids() {
        let mut m = manager(10, 1.0);
        let a = m.create_obstacle(ObstacleKind::Cube, true);
        let b = m.create_obstacle(ObstacleKind::Cube, true);
        assert_eq!(a.color, COLLECTIBLE_COLOR);
        assert!(b.id > a.id);
    }

    #[test]
    fn test_blocking_hit_is_counted_not_collected() {
        let mut m = manager(10, 1.0);
        let id = placed(&mut m, ObstacleKind::Cube, false, Vec3::new(0.0, 1.0, 0.0));
        let report = m.check_collisions(Vec3::new(0.0, 1.0, 0.0), 1.0);
        assert_eq!(report.collision_count, 1);
        assert_eq!(report.collected_count, 0);
        assert_eq!(report.collided_ids, vec![id]);
        assert!(!m.get(id).unwrap().collected);
    }

    #[test]
    fn test_collectible_hit_is_collected_once() {
        let mut m = manager(10, 1.0);
        let id = placed(&mut m, ObstacleKind::Sphere, true, Vec3::ZERO);
        let report = m.check_collisions(Vec3::ZERO, 0.5);
        assert_eq!(report.collected_count, 1);
        assert!(m.get(id).unwrap().collected);

        let again = m.check_collisions(Vec3::ZERO, 0.5);
        assert!(again.is_empty());
    }

    #[test]
    fn test_hits_ordered_by_depth() {
        let mut m = manager(10, 1.0);
        let shallow = placed(&mut m, ObstacleKind::Cube, false, Vec3::new(1.2, 0.0, 0.0));
        let deep = placed(&mut m, ObstacleKind::Cube, false, Vec3::new(0.1, 0.0, 0.0));
        let report = m.check_collisions(Vec3::ZERO, 1.0);
        assert_eq!(report.collided_ids, vec![deep, shallow]);
    }

    #[test]
    fn test_collect_obstacle_idempotent_and_unknown() {
        let mut m = manager(10, 1.0);
        let id = placed(&mut m, ObstacleKind::Cube, true, Vec3::ZERO);
        m.collect_obstacle(id);
        m.collect_obstacle(id);
        m.collect_obstacle(9999);
        assert!(m.get(id).unwrap().collected);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_collected_lingers_one_tick() {
        let mut m = manager(10, 0.0);
        let id = placed(&mut m, ObstacleKind::Cube, true, Vec3::ZERO);
        m.collect_obstacle(id);

        m.update(1.0 / 60.0);
        assert!(m.get(id).is_some());
        m.update(1.0 / 60.0);
        assert!(m.get(id).is_none());
    }

    #[test]
    fn test_out_of_bounds_removed() {
        let mut m = manager(10, 0.0);
        let keep = placed(&mut m, ObstacleKind::Cube, false, Vec3::new(10.5, 0.5, 0.0));
        let gone = placed(&mut m, ObstacleKind::Cube, false, Vec3::new(11.5, 0.5, 0.0));
        let also_gone = placed(&mut m, ObstacleKind::Cube, false, Vec3::new(0.0, 0.5, -12.0));
        m.update(0.0);
        assert!(m.get(keep).is_some());
        assert!(m.get(gone).is_none());
        assert!(m.get(also_gone).is_none());
        assert_eq!(m.obstacles()[0].id, keep);
    }

    #[test]
    fn test_update_moves_in_units_per_second() {
        let mut m = manager(10, 0.0);
        let mut o = m.create_obstacle(ObstacleKind::Cube, false);
        o.position = Vec3::ZERO;
        o.velocity = Vec3::new(1.2, 0.0, 0.0);
        let id = m.insert(o).unwrap();

        for _ in 0..60 {
            m.update(1.0 / 60.0);
        }
        let moved = m.get(id).unwrap();
        assert!((moved.position.x - 1.2).abs() < 1e-3);
        assert!(moved.rotation.y > 0.0);
    }

    #[test]
    fn test_spawn_timer_respects_rate_and_cap() {
        let mut m = manager(3, 2.0);
        // 0.5s interval, strict comparison: nothing at exactly 0.5s
        m.update(0.25);
        m.update(0.25);
        assert_eq!(m.len(), 0);
        m.update(0.01);
        assert_eq!(m.len(), 1);

        for _ in 0..20 {
            m.update(0.6);
            for o in &mut m.obstacles {
                o.velocity = Vec3::ZERO;
            }
        }
        assert_eq!(m.active_count(), 3);
    }

    #[test]
    fn test_disabled_spawning() {
        for (max, rate) in [(0, 1.0), (-4, 1.0), (5, 0.0), (5, -3.0), (5, f32::NAN)] {
            let mut m = manager(max, rate);
            for _ in 0..600 {
                m.update(1.0 / 60.0);
            }
            assert!(m.is_empty());
        }
    }

    #[test]
    fn test_insert_respects_cap() {
        let mut m = manager(1, 0.0);
        assert!(m.spawn(ObstacleKind::Cube, false).is_some());
        assert!(m.spawn(ObstacleKind::Cube, false).is_none());
    }

    #[test]
    fn test_allowed_kinds_drive_timer_spawns() {
        let mut m = manager(50, 100.0);
        m.set_allowed_kinds(&[ObstacleKind::Ramp]);
        for _ in 0..20 {
            m.update(0.02);
        }
        assert!(!m.is_empty());
        assert!(m.obstacles().iter().all(|o| o.kind == ObstacleKind::Ramp));
    }

    #[test]
    fn test_clear_obstacles_keeps_ids_increasing() {
        let mut m = manager(10, 0.0);
        let first = m.spawn(ObstacleKind::Cube, false).unwrap();
        m.clear_obstacles();
        assert!(m.is_empty());
        let second = m.spawn(ObstacleKind::Cube, false).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_index_stays_consistent_after_removals() {
        let mut m = manager(10, 0.0);
        let ids: Vec<u64> = (0..6)
            .map(|i| {
                let x = if i % 2 == 0 { 50.0 } else { 0.0 };
                placed(&mut m, ObstacleKind::Cube, false, Vec3::new(x, 0.5, i as f32))
            })
            .collect();
        m.update(0.0);
        assert_eq!(m.len(), 3);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(m.get(*id).is_some(), i % 2 == 1);
            if let Some(o) = m.get(*id) {
                assert_eq!(o.id, *id);
            }
        }
    }
}
