// Engine module - steering core plus the bevy_ecs host that drives it

pub mod boundary;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod flocker;
pub mod simulation;
pub mod steering;
pub mod systems;
pub mod vehicle;
pub mod wanderer;

// Re-export commonly used items
pub use boundary::{BoundaryBox, BoundaryConfig};
pub use components::*;
pub use config::{ScenarioConfig, SimulationConfig};
pub use context::{AggregationTarget, NeighborProvider, RayCaster, RayHit, SteeringContext};
pub use error::SteeringError;
pub use flocker::{step_agent, FlockWeights, Flocker, SteeringPolicy};
pub use simulation::{FlockStats, Simulation};
pub use vehicle::{NeighborState, Vehicle, VehicleParams};
pub use wanderer::{WanderWeights, Wanderer};
