//! Level progression
//!
//! Spawn rate and the obstacle kinds in play are pure functions of the
//! level, and never get easier as the level rises.

use super::obstacles::ObstacleKind;

/// Extra spawn rate per level above 1, as a fraction of the base rate
const SPAWN_RATE_STEP: f32 = 0.25;

/// Spawn rate (obstacles/second) for a level
pub fn spawn_rate_for_level(base_rate: f32, level: u32) -> f32 {
    if !(base_rate > 0.0) {
        return 0.0;
    }
    let steps = level.saturating_sub(1) as f32;
    base_rate * (1.0 + steps * SPAWN_RATE_STEP)
}

/// Obstacle kinds that may spawn at a level
pub fn kinds_for_level(level: u32) -> &'static [ObstacleKind] {
    use ObstacleKind::*;
    match level {
        0 | 1 => &[Cube, Sphere],
        2 => &[Cube, Sphere, Cylinder],
        _ => &[Cube, Sphere, Cylinder, Ramp],
    }
}

/// Score needed to leave `level`, `None` when levelling is disabled
pub fn level_threshold(level: u32, level_up_score: i64) -> Option<i64> {
    if level_up_score <= 0 {
        return None;
    }
    (level as i64).checked_mul(level_up_score)
}
