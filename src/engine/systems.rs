// Per-tick passes over the agent World.
//
// Order within a tick: read poses -> capture snapshot -> steer and
// integrate every agent against that snapshot -> write poses. Nobody
// observes another agent's half-finished update, so iteration order
// does not matter.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use glam::Vec3;

use super::components::*;
use super::context::{NeighborProvider, RayCaster, SteeringContext};
use super::flocker::step_agent;
use super::vehicle::NeighborState;

/// The forward axis is only republished when the new direction is at least
/// this long (squared), so a stalled agent keeps its last facing.
pub const FORWARD_UPDATE_MIN_SQ: f32 = 0.1;

/// Every tagged agent's state as of the start of the tick.
#[derive(Debug, Default, Clone)]
pub struct FlockSnapshot {
    members: Vec<(String, NeighborState)>,
}

impl FlockSnapshot {
    pub fn capture(world: &mut World) -> Self {
        let mut query = world.query::<(&FlockTag, &Agent)>();
        let members = query
            .iter(world)
            .map(|(tag, agent)| (tag.name.clone(), agent.vehicle.snapshot()))
            .collect();
        Self { members }
    }
}

impl NeighborProvider for FlockSnapshot {
    fn neighbors(&self, tag: &str) -> Vec<NeighborState> {
        self.members
            .iter()
            .filter(|(name, _)| name == tag)
            .map(|(_, state)| *state)
            .collect()
    }
}

/// Pull externally edited positions back into the vehicles.
pub fn pose_read_system(world: &mut World) {
    let mut query = world.query::<(&Transform, &mut Agent)>();
    for (transform, mut agent) in query.iter_mut(world) {
        if agent.vehicle.position() != transform.position {
            agent.vehicle.sync_position(transform.position);
        }
    }
}

/// Compose, apply and integrate forces for every agent.
pub fn steering_system(
    world: &mut World,
    snapshot: &FlockSnapshot,
    target: Vec3,
    walls: Option<&dyn RayCaster>,
    delta_time: f32,
) {
    let mut groups: HashMap<String, Vec<NeighborState>> = HashMap::new();
    let mut query = world.query::<(&FlockTag, &mut Agent)>();

    for (tag, mut agent) in query.iter_mut(world) {
        let neighbors = groups
            .entry(tag.name.clone())
            .or_insert_with(|| snapshot.neighbors(&tag.name));

        let mut ctx = SteeringContext::new(neighbors.as_slice(), target);
        if let Some(walls) = walls {
            ctx = ctx.with_walls(walls);
        }

        let Agent { vehicle, policy } = &mut *agent;
        step_agent(vehicle, policy, &ctx, delta_time);
    }
}

/// Publish the new pose and velocity of every agent.
pub fn pose_write_system(world: &mut World) {
    let mut query = world.query::<(&Agent, &mut Transform, &mut Velocity)>();
    for (agent, mut transform, mut velocity) in query.iter_mut(world) {
        transform.position = agent.vehicle.position();
        let direction = agent.vehicle.direction();
        if direction.length_squared() > FORWARD_UPDATE_MIN_SQ {
            transform.forward = direction;
        }
        velocity.linear = agent.vehicle.velocity();
    }
}

/// Remove every entity carrying `tag`. Returns how many were despawned.
pub fn despawn_tagged(world: &mut World, tag: &str) -> usize {
    let mut query = world.query::<(Entity, &FlockTag)>();
    let doomed: Vec<Entity> = query
        .iter(world)
        .filter(|(_, t)| t.name == tag)
        .map(|(entity, _)| entity)
        .collect();
    doomed.into_iter().filter(|&entity| world.despawn(entity)).count()
}
