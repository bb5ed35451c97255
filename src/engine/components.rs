// ECS components for agents hosted in a bevy_ecs World.
// The steering core itself knows nothing about entities; these wrap it.

use bevy_ecs::prelude::*;
use glam::Vec3;

use super::context::SteeringContext;
use super::flocker::{Flocker, SteeringPolicy};
use super::vehicle::Vehicle;
use super::wanderer::Wanderer;

/// Published pose of an entity. Read before steering, written after.
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }
}

/// Velocity of an entity in 3D space (units per second), as of the last tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

/// Group an agent belongs to. Neighbor queries return every agent sharing it.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct FlockTag {
    pub name: String,
}

impl FlockTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The policies an agent can be driven by.
#[derive(Debug, Clone)]
pub enum AgentPolicy {
    Flock(Flocker),
    Wander(Wanderer),
}

impl SteeringPolicy for AgentPolicy {
    fn apply_steering(&mut self, vehicle: &mut Vehicle, ctx: &SteeringContext<'_>) -> Vec3 {
        match self {
            Self::Flock(flocker) => flocker.apply_steering(vehicle, ctx),
            Self::Wander(wanderer) => wanderer.apply_steering(vehicle, ctx),
        }
    }
}

/// Kinematic state plus the policy composing its forces.
#[derive(Component, Debug, Clone)]
pub struct Agent {
    pub vehicle: Vehicle,
    pub policy: AgentPolicy,
}
