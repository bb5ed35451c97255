// Free-roaming policy: wander, but turn back at invisible boundaries.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use super::context::SteeringContext;
use super::error::SteeringError;
use super::flocker::{budgeted, check_weight, SteeringPolicy};
use super::vehicle::Vehicle;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WanderWeights {
    pub wander: f32,
    pub wall: f32,
}

impl Default for WanderWeights {
    fn default() -> Self {
        Self { wander: 1.0, wall: 3.0 }
    }
}

impl WanderWeights {
    pub fn validate(&self) -> Result<(), SteeringError> {
        check_weight("wander", self.wander)?;
        check_weight("wall", self.wall)
    }
}

/// Each wanderer owns its random stream so runs replay from a seed.
#[derive(Debug, Clone)]
pub struct Wanderer {
    weights: WanderWeights,
    rng: StdRng,
}

impl Wanderer {
    pub fn new(weights: WanderWeights, seed: u64) -> Result<Self, SteeringError> {
        weights.validate()?;
        Ok(Self { weights, rng: StdRng::seed_from_u64(seed) })
    }
}

impl SteeringPolicy for Wanderer {
    fn apply_steering(&mut self, vehicle: &mut Vehicle, ctx: &SteeringContext<'_>) -> Vec3 {
        // Walls first: a hit resets the wander rotation before it is stepped.
        let wall = match ctx.walls {
            Some(walls) => vehicle.avoid_wall(walls),
            None => Vec3::ZERO,
        };
        let wander = vehicle.wander(&mut self.rng);

        let force = budgeted(vehicle, wall * self.weights.wall + wander * self.weights.wander);
        vehicle.apply_force(force);
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::{RayCaster, RayHit};
    use crate::engine::vehicle::VehicleParams;
    use approx::assert_abs_diff_eq;

    struct WallAhead;

    impl RayCaster for WallAhead {
        fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
            Some(RayHit { point: origin + direction * max_distance, normal: -direction })
        }
    }

    #[test]
    fn same_seed_same_path() {
        let run = |seed| {
            let mut vehicle = Vehicle::new(VehicleParams::default(), Vec3::ZERO, Vec3::Z).unwrap();
            let mut policy = Wanderer::new(WanderWeights::default(), seed).unwrap();
            for _ in 0..50 {
                let ctx = SteeringContext::new(&[], Vec3::ZERO);
                policy.apply_steering(&mut vehicle, &ctx);
                vehicle.update_position(0.1);
            }
            vehicle.position()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn force_respects_budget() {
        let params = VehicleParams::default();
        let mut vehicle = Vehicle::new(params, Vec3::ZERO, Vec3::Z).unwrap();
        let mut policy = Wanderer::new(WanderWeights::default(), 3).unwrap();
        let ctx = SteeringContext::new(&[], Vec3::ZERO).with_walls(&WallAhead);

        let force = policy.apply_steering(&mut vehicle, &ctx);
        assert_abs_diff_eq!(force.length(), params.max_force, epsilon = 1e-4);
        // Wall pushes back along -Z; wander alone never points backwards at rest.
        assert!(force.z < 0.0);
    }
}
