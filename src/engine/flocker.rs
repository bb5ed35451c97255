// Force composition policies.
//
// A policy decides which behaviors run for an agent and how they are
// weighted. It applies the composed force to the vehicle itself; the
// caller then integrates with `Vehicle::update_position`.

use glam::Vec3;
use log::trace;
use serde::Deserialize;

use super::context::SteeringContext;
use super::error::SteeringError;
use super::vehicle::Vehicle;

/// Per-tick force composition strategy.
pub trait SteeringPolicy {
    /// Compose, apply and return this tick's steering force.
    fn apply_steering(&mut self, vehicle: &mut Vehicle, ctx: &SteeringContext<'_>) -> Vec3;
}

/// Compose forces, then integrate one tick.
pub fn step_agent<P: SteeringPolicy + ?Sized>(
    vehicle: &mut Vehicle,
    policy: &mut P,
    ctx: &SteeringContext<'_>,
    dt: f32,
) -> Vec3 {
    let force = policy.apply_steering(vehicle, ctx);
    vehicle.update_position(dt);
    force
}

/// Clamp a composed force to the vehicle's force budget.
///
/// Only the direction of `force` survives: the result always has length
/// `max_force` (or is zero), whatever the relative sizes of its parts were.
pub(super) fn budgeted(vehicle: &Vehicle, force: Vec3) -> Vec3 {
    force.normalize_or_zero() * vehicle.params().max_force
}

pub(super) fn check_weight(field: &'static str, value: f32) -> Result<(), SteeringError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SteeringError::InvalidConfiguration { field, value })
    }
}

// ============================================================================
// FLOCKING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlockWeights {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    /// Pull towards the aggregation target.
    pub seek: f32,
}

impl Default for FlockWeights {
    fn default() -> Self {
        Self {
            separation: 2.0,
            alignment: 1.0,
            cohesion: 1.0,
            seek: 0.5,
        }
    }
}

impl FlockWeights {
    pub fn validate(&self) -> Result<(), SteeringError> {
        check_weight("separation", self.separation)?;
        check_weight("alignment", self.alignment)?;
        check_weight("cohesion", self.cohesion)?;
        check_weight("seek", self.seek)
    }
}

/// Separation + alignment + cohesion + seek towards the aggregation target.
#[derive(Debug, Clone)]
pub struct Flocker {
    weights: FlockWeights,
}

impl Flocker {
    pub fn new(weights: FlockWeights) -> Result<Self, SteeringError> {
        weights.validate()?;
        Ok(Self { weights })
    }
}

impl SteeringPolicy for Flocker {
    fn apply_steering(&mut self, vehicle: &mut Vehicle, ctx: &SteeringContext<'_>) -> Vec3 {
        let w = &self.weights;
        let composed = vehicle.separation(ctx.neighbors) * w.separation
            + vehicle.alignment(ctx.neighbors) * w.alignment
            + vehicle.cohesion(ctx.neighbors) * w.cohesion
            + vehicle.seek(ctx.target) * w.seek;

        let force = budgeted(vehicle, composed);
        trace!("flocker force {force:?} from {} neighbors", ctx.neighbors.len());
        vehicle.apply_force(force);
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::vehicle::VehicleParams;
    use approx::assert_abs_diff_eq;

    fn params() -> VehicleParams {
        VehicleParams {
            mass: 2.0,
            max_speed: 5.0,
            max_force: 10.0,
            radius: 0.5,
            reaction_distance: 5.0,
        }
    }

    #[test]
    fn rejects_non_finite_weights() {
        let weights = FlockWeights { cohesion: f32::INFINITY, ..FlockWeights::default() };
        assert!(matches!(
            Flocker::new(weights),
            Err(SteeringError::InvalidConfiguration { field: "cohesion", .. })
        ));
    }

    #[test]
    fn lone_flocker_only_seeks_at_full_force() {
        let mut vehicle = Vehicle::new(params(), Vec3::ZERO, Vec3::Z).unwrap();
        let mut flocker = Flocker::new(FlockWeights::default()).unwrap();
        let neighbors = [vehicle.snapshot()];
        let ctx = SteeringContext::new(&neighbors, Vec3::new(0.0, 0.0, 30.0));

        let force = flocker.apply_steering(&mut vehicle, &ctx);
        assert_abs_diff_eq!(force, Vec3::new(0.0, 0.0, 10.0), epsilon = 1e-5);
        // mass 2
        assert_abs_diff_eq!(vehicle.acceleration(), Vec3::new(0.0, 0.0, 5.0), epsilon = 1e-5);
    }

    #[test]
    fn composed_force_is_direction_only() {
        let mut vehicle = Vehicle::new(params(), Vec3::ZERO, Vec3::Z).unwrap();
        let others = [
            vehicle.snapshot(),
            Vehicle::new(params(), Vec3::new(3.0, 1.0, 2.0), Vec3::X).unwrap().with_velocity(Vec3::X).snapshot(),
            Vehicle::new(params(), Vec3::new(-4.0, 0.0, 1.0), Vec3::Z).unwrap().with_velocity(Vec3::Z).snapshot(),
        ];
        let mut flocker = Flocker::new(FlockWeights { seek: 100.0, ..FlockWeights::default() }).unwrap();
        let ctx = SteeringContext::new(&others, Vec3::new(50.0, 0.0, 0.0));

        let force = flocker.apply_steering(&mut vehicle, &ctx);
        assert_abs_diff_eq!(force.length(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn balanced_forces_apply_nothing() {
        let mut vehicle = Vehicle::new(params(), Vec3::ZERO, Vec3::Z).unwrap();
        let neighbors = [vehicle.snapshot()];
        let mut flocker = Flocker::new(FlockWeights::default()).unwrap();
        let ctx = SteeringContext::new(&neighbors, Vec3::ZERO);

        assert_eq!(flocker.apply_steering(&mut vehicle, &ctx), Vec3::ZERO);
        assert_eq!(vehicle.acceleration(), Vec3::ZERO);
    }

    #[test]
    fn step_agent_integrates_after_steering() {
        let mut vehicle = Vehicle::new(params(), Vec3::ZERO, Vec3::Z).unwrap();
        let neighbors = [vehicle.snapshot()];
        let mut flocker = Flocker::new(FlockWeights::default()).unwrap();
        let ctx = SteeringContext::new(&neighbors, Vec3::new(10.0, 0.0, 0.0));

        step_agent(&mut vehicle, &mut flocker, &ctx, 0.5);
        // a = 10 / 2 = 5, v = 2.5, x = 1.25
        assert_abs_diff_eq!(vehicle.velocity(), Vec3::new(2.5, 0.0, 0.0), epsilon = 1e-5);
        assert_abs_diff_eq!(vehicle.position(), Vec3::new(1.25, 0.0, 0.0), epsilon = 1e-5);
        assert_abs_diff_eq!(vehicle.direction(), Vec3::X, epsilon = 1e-6);
        assert_eq!(vehicle.acceleration(), Vec3::ZERO);
    }
}
