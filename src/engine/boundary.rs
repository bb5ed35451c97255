// Invisible boundary box. Agents never collide with it; only wall rays do.

use glam::Vec3;
use serde::Deserialize;

use super::context::{RayCaster, RayHit};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundaryConfig {
    /// Full size of the box, centered on the origin.
    pub bounds: Vec3,
}

/// Axis-aligned box whose walls are hit from the inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundaryBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    pub fn from_config(config: &BoundaryConfig) -> Self {
        let half_bounds = config.bounds.abs() / 2.0;
        Self::new(-half_bounds, half_bounds)
    }
}

impl RayCaster for BoundaryBox {
    /// Nearest wall the ray reaches within `max_distance`. Walls are one-sided:
    /// a ray only hits a face it is travelling towards, and the reported
    /// normal points back into the box.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let mut best: Option<(f32, Vec3)> = None;

        for axis in 0..3 {
            let d = direction[axis];
            let (plane, normal) = if d > 0.0 {
                (self.max[axis], -Vec3::AXES[axis])
            } else if d < 0.0 {
                (self.min[axis], Vec3::AXES[axis])
            } else {
                continue;
            };

            let t = (plane - origin[axis]) / d;
            if t < 0.0 || t > max_distance {
                continue;
            }
            if best.is_none_or(|(best_t, _)| t < best_t) {
                best = Some((t, normal));
            }
        }

        best.map(|(t, normal)| RayHit { point: origin + direction * t, normal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn arena() -> BoundaryBox {
        BoundaryBox::from_config(&BoundaryConfig { bounds: Vec3::new(20.0, 10.0, 20.0) })
    }

    #[test]
    fn hits_the_face_ahead() {
        let hit = arena().cast_ray(Vec3::new(0.0, 0.0, 7.0), Vec3::Z, 5.0).unwrap();
        assert_abs_diff_eq!(hit.point, Vec3::new(0.0, 0.0, 10.0), epsilon = 1e-6);
        assert_eq!(hit.normal, Vec3::NEG_Z);
    }

    #[test]
    fn misses_when_wall_is_out_of_reach() {
        assert!(arena().cast_ray(Vec3::ZERO, Vec3::X, 5.0).is_none());
    }

    #[test]
    fn picks_the_nearest_face() {
        let dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let hit = arena().cast_ray(Vec3::new(0.0, -4.0, 0.0), dir, 10.0).unwrap();
        // Floor at y = -5 is one unit away, the x wall is ten.
        assert_eq!(hit.normal, Vec3::Y);
        assert_abs_diff_eq!(hit.point.y, -5.0, epsilon = 1e-5);
    }
}
