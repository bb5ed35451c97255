// Vehicle: kinematic state plus the discrete-time integration step.
//
// Force-producing behaviors live in steering.rs as a second impl block;
// this file only owns state, configuration and the motion update.

use glam::Vec3;
use log::warn;
use serde::Deserialize;

use super::error::SteeringError;

/// Above this |dot(forward, Y)| the right axis is built against +Z instead,
/// so a vehicle flying straight up or down still has a usable lateral axis.
const VERTICAL_FORWARD_DOT: f32 = 0.97;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Physical parameters of one agent. Fixed for the agent's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    pub mass: f32,
    /// Upper bound on |velocity| after every integration step.
    pub max_speed: f32,
    /// Magnitude of the composed steering force a policy applies per tick.
    pub max_force: f32,
    /// Collision radius in world units.
    pub radius: f32,
    /// Look-ahead used by obstacle avoidance, wall probing and separation.
    pub reaction_distance: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            max_speed: 5.0,
            max_force: 10.0,
            radius: 0.5,
            reaction_distance: 5.0,
        }
    }
}

impl VehicleParams {
    /// Reject parameters that would turn into NaN/Inf during integration.
    pub fn validate(&self) -> Result<(), SteeringError> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(invalid("mass", self.mass));
        }
        let non_negative = [
            ("max_speed", self.max_speed),
            ("max_force", self.max_force),
            ("radius", self.radius),
            ("reaction_distance", self.reaction_distance),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, value));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: f32) -> SteeringError {
    warn!("rejecting vehicle configuration: {field} = {value}");
    SteeringError::InvalidConfiguration { field, value }
}

// ============================================================================
// NEIGHBOR SNAPSHOT
// ============================================================================

/// Read-only view of another agent, as published at the end of the last tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
}

// ============================================================================
// VEHICLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct Vehicle {
    position: Vec3,
    /// Unit facing. Only replaced when the vehicle is actually moving.
    direction: Vec3,
    velocity: Vec3,
    /// Force / mass accumulated since the last integration step.
    acceleration: Vec3,
    params: VehicleParams,
    /// Wander heading offset in degrees, kept in (-360, 360].
    pub(super) wander_rotation: i32,
    /// Index of the waypoint currently being sought by path following.
    pub(super) waypoint_num: usize,
}

impl Vehicle {
    /// Build a vehicle at rest. `direction` falls back to +Z when zero.
    pub fn new(params: VehicleParams, position: Vec3, direction: Vec3) -> Result<Self, SteeringError> {
        params.validate()?;
        Ok(Self {
            position,
            direction: direction.try_normalize().unwrap_or(Vec3::Z),
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            params,
            wander_rotation: 0,
            waypoint_num: 0,
        })
    }

    /// Initial velocity at spawn time, clamped to `max_speed`.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity.clamp_length_max(self.params.max_speed);
        self
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn wander_rotation(&self) -> i32 {
        self.wander_rotation
    }

    pub fn waypoint_num(&self) -> usize {
        self.waypoint_num
    }

    /// Re-read the position from the host transform. Lets the scene move an
    /// agent between ticks; velocity and heading are left alone.
    pub fn sync_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// The state other agents see of this one.
    pub fn snapshot(&self) -> NeighborState {
        NeighborState {
            position: self.position,
            velocity: self.velocity,
            radius: self.params.radius,
        }
    }

    /// Forward axis of the local frame.
    pub fn forward(&self) -> Vec3 {
        self.direction
    }

    /// Right axis of the local frame: `up × forward` with +Y as up.
    pub fn right(&self) -> Vec3 {
        let up = if self.direction.dot(Vec3::Y).abs() > VERTICAL_FORWARD_DOT {
            Vec3::Z
        } else {
            Vec3::Y
        };
        up.cross(self.direction).normalize_or_zero()
    }

    /// Accumulate a force for this tick. Multiple calls add up.
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force / self.params.mass;
    }

    /// Advance one tick of `dt` seconds and clear the accumulated acceleration.
    pub fn update_position(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.velocity = self.velocity.clamp_length_max(self.params.max_speed);
        self.position += self.velocity * dt;
        if let Some(direction) = self.velocity.try_normalize() {
            self.direction = direction;
        }
        self.acceleration = Vec3::ZERO;
    }

    /// Overlap test against another agent. Touching exactly is not a collision.
    pub fn circle_collision(&self, other: &NeighborState) -> bool {
        let reach = self.params.radius + other.radius;
        self.position.distance_squared(other.position) < reach * reach
    }
}
