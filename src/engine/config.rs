// Scenario configuration loaded from YAML (see scenarios/flock.yaml).
// Every section and field is optional and falls back to its default.

use glam::Vec3;
use serde::Deserialize;

use super::boundary::BoundaryConfig;
use super::error::SteeringError;
use super::flocker::FlockWeights;
use super::vehicle::VehicleParams;
use super::wanderer::WanderWeights;

pub const DEFAULT_FLOCK_TAG: &str = "Flocker";
pub const DEFAULT_WANDER_TAG: &str = "Wanderer";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_flockers: usize,
    pub num_wanderers: usize,
    /// Seeds spawn positions and every wanderer's random stream.
    pub seed: u64,
    /// Fixed time step in seconds.
    pub dt: f32,
    /// Ticks run by the headless binary.
    pub ticks: u64,
    /// Aggregation target the flock seeks.
    pub centerpiece: Vec3,
    /// Agents spawn at integer coordinates in [-spawn_extent, spawn_extent).
    pub spawn_extent: i32,
    pub flock_tag: String,
    pub wander_tag: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_flockers: 20,
            num_wanderers: 0,
            seed: 42,
            dt: 1.0 / 60.0,
            ticks: 600,
            centerpiece: Vec3::ZERO,
            spawn_extent: 10,
            flock_tag: DEFAULT_FLOCK_TAG.to_string(),
            wander_tag: DEFAULT_WANDER_TAG.to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SteeringError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SteeringError::InvalidConfiguration { field: "dt", value: self.dt });
        }
        if self.spawn_extent <= 0 {
            return Err(SteeringError::InvalidConfiguration {
                field: "spawn_extent",
                value: self.spawn_extent as f32,
            });
        }
        if !self.centerpiece.is_finite() {
            return Err(SteeringError::InvalidConfiguration {
                field: "centerpiece",
                value: self.centerpiece.length(),
            });
        }
        Ok(())
    }
}

/// Top-level scenario.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    pub vehicle: VehicleParams,
    pub flock: FlockWeights,
    pub wanderer: WanderWeights,
    pub boundary: Option<BoundaryConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn validate(&self) -> Result<(), SteeringError> {
        self.simulation.validate()?;
        self.vehicle.validate()?;
        self.flock.validate()?;
        self.wanderer.validate()
    }
}
