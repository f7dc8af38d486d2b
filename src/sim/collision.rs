//! Sphere-sphere collision tests
//!
//! Stateless predicates shared by ball-vs-obstacle checks and any other
//! entity pair. Both work on squared distances, so no square root is taken
//! unless a penetration depth is requested.

use glam::Vec3;

/// True iff the spheres overlap (`distance < radius_a + radius_b`).
///
/// Degenerate input never collides: a non-positive radius sum or any
/// non-finite coordinate returns `false`.
#[inline]
pub fn is_colliding(pos_a: Vec3, radius_a: f32, pos_b: Vec3, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    if !(reach > 0.0) || !pos_a.is_finite() || !pos_b.is_finite() {
        return false;
    }
    pos_a.distance_squared(pos_b) < reach * reach
}

/// Penetration depth of two overlapping spheres, `None` when apart
pub fn sphere_overlap(pos_a: Vec3, radius_a: f32, pos_b: Vec3, radius_b: f32) -> Option<f32> {
    if !is_colliding(pos_a, radius_a, pos_b, radius_b) {
        return None;
    }
    Some(radius_a + radius_b - pos_a.distance(pos_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_is_not_colliding() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        assert!(!is_colliding(a, 1.0, b, 1.0));
        assert!(is_colliding(a, 1.0, b, 1.01));
    }

    #[test]
    fn test_coincident_centers() {
        let p = Vec3::new(0.0, 1.0, 0.0);
        assert!(is_colliding(p, 1.0, p, 0.5));
        assert!(!is_colliding(p, 0.0, p, 0.0));
    }

    #[test]
    fn test_negative_and_nan_inputs() {
        let p = Vec3::ZERO;
        assert!(!is_colliding(p, -1.0, p, 0.5));
        assert!(!is_colliding(p, f32::NAN, p, 1.0));
        assert!(!is_colliding(Vec3::new(f32::NAN, 0.0, 0.0), 1.0, p, 1.0));
        assert!(!is_colliding(Vec3::new(f32::INFINITY, 0.0, 0.0), 1.0, p, 1.0));
    }

    #[test]
    fn test_symmetry() {
        let a = Vec3::new(0.3, -1.2, 4.0);
        let b = Vec3::new(1.0, -0.5, 3.1);
        for (ra, rb) in [(0.5, 0.7), (0.1, 0.2), (2.0, 0.0)] {
            assert_eq!(is_colliding(a, ra, b, rb), is_colliding(b, rb, a, ra));
        }
    }

    #[test]
    fn test_sphere_overlap_depth() {
        let depth = sphere_overlap(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0).unwrap();
        assert!((depth - 0.5).abs() < 1e-6);
        assert!(sphere_overlap(Vec3::ZERO, 1.0, Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
    }
}
