// Capabilities the steering core consumes from its host.
//
// The core never looks anything up on its own: neighbors, the flock's seek
// target and wall rays are all handed in through these traits, once per tick.

use glam::Vec3;

use super::vehicle::NeighborState;

/// Supplies the current members of a group, including the asking agent.
pub trait NeighborProvider {
    fn neighbors(&self, tag: &str) -> Vec<NeighborState>;
}

/// Position the flock is drawn towards (the "centerpiece").
pub trait AggregationTarget {
    fn target_position(&self) -> Vec3;
}

/// Where a wall ray struck an invisible boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Surface normal at `point`, facing back towards the ray origin.
    pub normal: Vec3,
}

/// Boundary ray cast. `direction` is expected to be unit length.
pub trait RayCaster {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

/// Everything a policy may read while composing one agent's force.
#[derive(Clone, Copy)]
pub struct SteeringContext<'a> {
    /// Flat neighbor list for this tick. Contains the agent itself.
    pub neighbors: &'a [NeighborState],
    /// Aggregation target for this tick.
    pub target: Vec3,
    pub walls: Option<&'a dyn RayCaster>,
}

impl<'a> SteeringContext<'a> {
    pub fn new(neighbors: &'a [NeighborState], target: Vec3) -> Self {
        Self { neighbors, target, walls: None }
    }

    pub fn with_walls(mut self, walls: &'a dyn RayCaster) -> Self {
        self.walls = Some(walls);
        self
    }
}
