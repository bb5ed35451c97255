// Simulation host: owns the agent World and plays every external role the
// steering core expects (spawning, neighbor snapshots, the centerpiece,
// boundary rays and pose sync).

use std::fmt;

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::boundary::BoundaryBox;
use super::components::*;
use super::config::ScenarioConfig;
use super::context::{AggregationTarget, RayCaster};
use super::error::SteeringError;
use super::flocker::Flocker;
use super::systems::{self, FlockSnapshot};
use super::vehicle::Vehicle;
use super::wanderer::Wanderer;

/// Aggregate view of the flock after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockStats {
    pub count: usize,
    pub centroid: Vec3,
    pub mean_speed: f32,
    /// Pairs of flockers currently overlapping (detection only).
    pub colliding_pairs: usize,
}

impl fmt::Display for FlockStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flockers: {} | centroid: ({:.2}, {:.2}, {:.2}) | mean speed: {:.2} | overlaps: {}",
            self.count, self.centroid.x, self.centroid.y, self.centroid.z, self.mean_speed, self.colliding_pairs,
        )
    }
}

pub struct Simulation {
    world: World,
    config: ScenarioConfig,
    rng: StdRng,
    centerpiece: Vec3,
    boundary: Option<BoundaryBox>,
    enabled: bool,
    tick_count: u64,
}

impl Simulation {
    pub fn new(config: ScenarioConfig) -> Result<Self, SteeringError> {
        config.validate()?;
        Ok(Self {
            world: World::new(),
            rng: StdRng::seed_from_u64(config.simulation.seed),
            centerpiece: config.simulation.centerpiece,
            boundary: config.boundary.as_ref().map(BoundaryBox::from_config),
            enabled: false,
            tick_count: 0,
            config,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn centerpiece(&self) -> Vec3 {
        self.centerpiece
    }

    pub fn set_centerpiece(&mut self, position: Vec3) {
        self.centerpiece = position;
    }

    pub fn boundary(&self) -> Option<&BoundaryBox> {
        self.boundary.as_ref()
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Spawn the configured flockers and wanderers at random integer
    /// positions. Does nothing if already enabled.
    pub fn enable(&mut self) -> Result<usize, SteeringError> {
        if self.enabled {
            return Ok(0);
        }
        let sim = &self.config.simulation;
        let (flockers, wanderers) = (sim.num_flockers, sim.num_wanderers);

        for _ in 0..flockers {
            let position = self.random_spawn_position();
            self.spawn_flocker(position)?;
        }
        for _ in 0..wanderers {
            let position = self.random_spawn_position();
            self.spawn_wanderer(position)?;
        }

        self.enabled = true;
        info!("spawned {flockers} flockers and {wanderers} wanderers");
        Ok(flockers + wanderers)
    }

    /// Despawn every flocker and wanderer.
    pub fn disable(&mut self) -> usize {
        let sim = &self.config.simulation;
        let removed = systems::despawn_tagged(&mut self.world, &sim.flock_tag)
            + systems::despawn_tagged(&mut self.world, &sim.wander_tag);
        self.enabled = false;
        info!("despawned {removed} agents");
        removed
    }

    pub fn spawn_flocker(&mut self, position: Vec3) -> Result<Entity, SteeringError> {
        let policy = AgentPolicy::Flock(Flocker::new(self.config.flock)?);
        let tag = FlockTag::new(self.config.simulation.flock_tag.clone());
        self.spawn_agent(position, tag, policy)
    }

    pub fn spawn_wanderer(&mut self, position: Vec3) -> Result<Entity, SteeringError> {
        let seed = self.rng.next_u64();
        let policy = AgentPolicy::Wander(Wanderer::new(self.config.wanderer, seed)?);
        let tag = FlockTag::new(self.config.simulation.wander_tag.clone());
        self.spawn_agent(position, tag, policy)
    }

    fn spawn_agent(&mut self, position: Vec3, tag: FlockTag, policy: AgentPolicy) -> Result<Entity, SteeringError> {
        // Identity rotation: facing +Z.
        let transform = Transform::from_position(position);
        let vehicle = Vehicle::new(self.config.vehicle, position, transform.forward)?;
        let entity = self
            .world
            .spawn((transform, Velocity::default(), tag, Agent { vehicle, policy }))
            .id();
        debug!("spawned {entity:?} at {position}");
        Ok(entity)
    }

    fn random_spawn_position(&mut self) -> Vec3 {
        let extent = self.config.simulation.spawn_extent;
        Vec3::new(
            self.rng.gen_range(-extent..extent) as f32,
            self.rng.gen_range(-extent..extent) as f32,
            self.rng.gen_range(-extent..extent) as f32,
        )
    }

    // ========================================================================
    // STEPPING
    // ========================================================================

    /// Advance every agent by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        systems::pose_read_system(&mut self.world);
        let snapshot = FlockSnapshot::capture(&mut self.world);
        let target = self.target_position();
        let walls = self.boundary.as_ref().map(|b| b as &dyn RayCaster);
        systems::steering_system(&mut self.world, &snapshot, target, walls, dt);
        systems::pose_write_system(&mut self.world);
        self.tick_count += 1;
    }

    /// Advance `ticks` steps of the configured `dt`.
    pub fn run(&mut self, ticks: u64) {
        let dt = self.config.simulation.dt;
        for _ in 0..ticks {
            self.tick(dt);
        }
    }

    pub fn stats(&mut self) -> FlockStats {
        let tag = &self.config.simulation.flock_tag;
        let mut query = self.world.query::<(&FlockTag, &Agent)>();
        let members: Vec<&Vehicle> = query
            .iter(&self.world)
            .filter(|(t, _)| &t.name == tag)
            .map(|(_, agent)| &agent.vehicle)
            .collect();

        let count = members.len();
        if count == 0 {
            return FlockStats { count, centroid: Vec3::ZERO, mean_speed: 0.0, colliding_pairs: 0 };
        }

        let centroid = members.iter().map(|v| v.position()).sum::<Vec3>() / count as f32;
        let mean_speed = members.iter().map(|v| v.velocity().length()).sum::<f32>() / count as f32;
        let colliding_pairs = members
            .iter()
            .enumerate()
            .map(|(i, a)| members[i + 1..].iter().filter(|b| a.circle_collision(&b.snapshot())).count())
            .sum();

        FlockStats { count, centroid, mean_speed, colliding_pairs }
    }
}

impl AggregationTarget for Simulation {
    fn target_position(&self) -> Vec3 {
        self.centerpiece
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::boundary::BoundaryConfig;
    use approx::assert_abs_diff_eq;

    fn scenario(flockers: usize, wanderers: usize) -> ScenarioConfig {
        let mut config = ScenarioConfig::default();
        config.simulation.num_flockers = flockers;
        config.simulation.num_wanderers = wanderers;
        config
    }

    #[test]
    fn enable_spawns_inside_the_spawn_cube() {
        let mut sim = Simulation::new(scenario(25, 0)).unwrap();
        assert_eq!(sim.enable().unwrap(), 25);
        assert_eq!(sim.enable().unwrap(), 0);

        let mut query = sim.world_mut().query::<&Transform>();
        for transform in query.iter(sim.world()) {
            let p = transform.position;
            assert!(p.cmpge(Vec3::splat(-10.0)).all() && p.cmplt(Vec3::splat(10.0)).all());
            assert_eq!(p, p.round());
            assert_eq!(transform.forward, Vec3::Z);
        }
    }

    #[test]
    fn disable_despawns_everything() {
        let mut sim = Simulation::new(scenario(5, 2)).unwrap();
        sim.enable().unwrap();
        assert_eq!(sim.disable(), 7);
        assert_eq!(sim.stats().count, 0);
        assert!(!sim.is_enabled());
    }

    #[test]
    fn invalid_scenario_is_rejected() {
        let mut config = scenario(1, 0);
        config.vehicle.max_force = -1.0;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn spawn_order_does_not_change_the_outcome() {
        let positions = [Vec3::ZERO, Vec3::new(1.0, 0.0, 2.0), Vec3::new(-1.0, 1.0, 1.0)];

        let run = |order: [usize; 3]| {
            let mut sim = Simulation::new(scenario(0, 0)).unwrap();
            let entities: Vec<(usize, Entity)> = order
                .iter()
                .map(|&i| (i, sim.spawn_flocker(positions[i]).unwrap()))
                .collect();
            for _ in 0..5 {
                sim.tick(0.1);
            }
            let mut states = [(Vec3::ZERO, Vec3::ZERO); 3];
            for (i, entity) in entities {
                let vehicle = &sim.world().get::<Agent>(entity).unwrap().vehicle;
                states[i] = (vehicle.position(), vehicle.velocity());
            }
            states
        };

        let forward = run([0, 1, 2]);
        let reversed = run([2, 1, 0]);
        for (a, b) in forward.iter().zip(reversed.iter()) {
            assert_abs_diff_eq!(a.0, b.0, epsilon = 1e-4);
            assert_abs_diff_eq!(a.1, b.1, epsilon = 1e-4);
        }
    }

    #[test]
    fn stats_count_overlapping_pairs() {
        let mut sim = Simulation::new(scenario(0, 0)).unwrap();
        sim.spawn_flocker(Vec3::ZERO).unwrap();
        sim.spawn_flocker(Vec3::new(0.5, 0.0, 0.0)).unwrap();
        sim.spawn_flocker(Vec3::new(8.0, 0.0, 0.0)).unwrap();

        let stats = sim.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.colliding_pairs, 1);
        assert_eq!(stats.centroid, Vec3::new(8.5 / 3.0, 0.0, 0.0));
    }

    #[test]
    fn wanderer_facing_a_wall_turns_back() {
        let mut config = scenario(0, 0);
        config.boundary = Some(BoundaryConfig { bounds: Vec3::splat(30.0) });
        let mut sim = Simulation::new(config).unwrap();
        let entity = sim.spawn_wanderer(Vec3::new(0.0, 0.0, 12.0)).unwrap();

        sim.tick(1.0 / 60.0);

        let velocity = sim.world().get::<Velocity>(entity).unwrap().linear;
        assert!(velocity.z < 0.0, "still heading into the wall: {velocity}");
    }

    #[test]
    fn moved_transforms_are_read_back() {
        let mut sim = Simulation::new(scenario(0, 0)).unwrap();
        let entity = sim.spawn_flocker(Vec3::ZERO).unwrap();
        sim.world_mut().get_mut::<Transform>(entity).unwrap().position = Vec3::new(3.0, 0.0, 0.0);

        sim.tick(0.1);

        let agent = sim.world().get::<Agent>(entity).unwrap();
        // Lone flocker seeks the origin from x = 3.
        assert!(agent.vehicle.position().x < 3.0);
        assert!(agent.vehicle.velocity().x < 0.0);
    }
}
