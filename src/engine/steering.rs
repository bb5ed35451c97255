// Steering behaviors.
//
// Every behavior returns a steering force: a desired velocity minus the
// current velocity. Nothing here touches acceleration; callers weight, sum
// and hand the result to `Vehicle::apply_force`.
//
// Degenerate inputs (zero-length offsets, empty neighborhoods, missed rays)
// produce a zero desired velocity or a zero force, never NaN.

use glam::{Quat, Vec3};
use log::{debug, trace};
use rand::Rng;

use super::context::RayCaster;
use super::error::SteeringError;
use super::vehicle::{NeighborState, Vehicle};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Largest heading change, in degrees, a single wander call may add.
pub const WANDER_STEP_DEG: i32 = 30;
/// Wander rotation is kept in (-WANDER_WRAP_DEG, WANDER_WRAP_DEG].
pub const WANDER_WRAP_DEG: i32 = 360;
/// How far ahead of the wander circle the forward axis pulls.
const WANDER_FORWARD_BIAS: f32 = 2.0;

/// Distance along the wall normal of the point seeked after a wall hit.
pub const WALL_NORMAL_OFFSET: f32 = 20.0;

/// Neighbors are treated as obstacles of this radius by separation.
pub const SEPARATION_NEIGHBOR_RADIUS: f32 = 1.0;
/// Squared distance within which a neighbor's velocity counts for alignment.
pub const ALIGNMENT_RANGE_SQ: f32 = 100.0;
/// Each qualifying neighbor's velocity is accumulated this many times.
pub const ALIGNMENT_VELOCITY_REPEAT: f32 = 2.0;
/// Squared distance within which a neighbor counts towards the flock center.
pub const COHESION_RANGE_SQ: f32 = 90_000.0;

/// Squared distance at which the current waypoint counts as reached.
pub const WAYPOINT_ARRIVAL_SQ: f32 = 100.0;

impl Vehicle {
    // ========================================================================
    // TARGETING
    // ========================================================================

    /// Steer straight at `target` at full speed. Seeking the vehicle's own
    /// position has no direction, so the result is pure braking (`-velocity`).
    pub fn seek(&self, target: Vec3) -> Vec3 {
        let desired = (target - self.position()).normalize_or_zero() * self.params().max_speed;
        desired - self.velocity()
    }

    /// Steer directly away from `threat` at full speed.
    pub fn flee(&self, threat: Vec3) -> Vec3 {
        let desired = (self.position() - threat).normalize_or_zero() * self.params().max_speed;
        desired - self.velocity()
    }

    /// Seek where `target` will be one time unit from now.
    pub fn pursue(&self, target: &NeighborState) -> Vec3 {
        self.seek(target.position + target.velocity)
    }

    /// Flee from where `target` will be one time unit from now.
    pub fn evade(&self, target: &NeighborState) -> Vec3 {
        self.flee(target.position + target.velocity)
    }

    // ========================================================================
    // AVOIDANCE
    // ========================================================================

    /// Hard left/right swerve around a spherical obstacle.
    ///
    /// Zero unless the obstacle is ahead, inside `reaction_distance`, and its
    /// lateral offset is within the combined radii. Obstacles on the right
    /// push the vehicle left and vice versa; the swerve is full speed either way.
    pub fn avoid_obstacle(&self, obstacle_pos: Vec3, obstacle_radius: f32) -> Vec3 {
        let to_obstacle = obstacle_pos - self.position();
        if to_obstacle.dot(self.forward()) < 0.0 {
            return Vec3::ZERO;
        }

        let reaction = self.params().reaction_distance;
        if to_obstacle.length_squared() > reaction * reaction {
            return Vec3::ZERO;
        }

        let right = self.right();
        let lateral = to_obstacle.dot(right);
        if lateral.abs() > self.params().radius + obstacle_radius {
            return Vec3::ZERO;
        }

        let swerve = if lateral > 0.0 { -right } else { right };
        swerve * self.params().max_speed - self.velocity()
    }

    /// Cast a ray forward at the invisible boundary and head back inside on a hit.
    ///
    /// A hit also zeroes the wander rotation so a wandering vehicle does not
    /// immediately turn back towards the wall.
    pub fn avoid_wall<C: RayCaster + ?Sized>(&mut self, walls: &C) -> Vec3 {
        let Some(hit) = walls.cast_ray(self.position(), self.forward(), self.params().reaction_distance)
        else {
            return Vec3::ZERO;
        };
        trace!("wall hit at {:?}, normal {:?}", hit.point, hit.normal);
        self.wander_rotation = 0;
        self.seek(hit.point + hit.normal * WALL_NORMAL_OFFSET)
    }

    // ========================================================================
    // WANDER
    // ========================================================================

    /// Random walk of the heading: one uniform step in
    /// `[-WANDER_STEP_DEG, WANDER_STEP_DEG]` per call.
    pub fn wander<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec3 {
        let step = rng.gen_range(-WANDER_STEP_DEG..=WANDER_STEP_DEG);
        self.wander_by(step)
    }

    /// Wander with a caller-chosen rotation step, in degrees.
    pub fn wander_by(&mut self, step_deg: i32) -> Vec3 {
        self.wander_rotation = wrap_wander_rotation(self.wander_rotation.saturating_add(step_deg));

        let angle = ((90 + self.wander_rotation) as f32).to_radians();
        let offset = Quat::from_rotation_y(angle) * Vec3::new(1.0, 0.0, 1.0).normalize();
        let desired = (self.forward() * WANDER_FORWARD_BIAS + offset).normalize_or_zero()
            * self.params().max_speed;
        desired - self.velocity()
    }

    // ========================================================================
    // GROUP BEHAVIORS
    // ========================================================================

    /// Swerve away from crowding neighbors, nearer ones weighted more.
    ///
    /// The neighborhood test compares *squared* distance against
    /// `reaction_distance` itself, so the effective radius is
    /// `sqrt(reaction_distance)`. This is deliberate and kept as-is.
    pub fn separation(&self, neighbors: &[NeighborState]) -> Vec3 {
        if neighbors.len() < 2 {
            return Vec3::ZERO;
        }

        let threshold = self.params().reaction_distance;
        let mut desired = Vec3::ZERO;
        for neighbor in neighbors {
            let dist_sq = self.position().distance_squared(neighbor.position);
            if dist_sq == 0.0 || dist_sq > threshold {
                continue;
            }
            desired += self.avoid_obstacle(neighbor.position, SEPARATION_NEIGHBOR_RADIUS)
                * (1.0 / dist_sq.sqrt());
        }

        self.steer_towards(desired)
    }

    /// Match the heading of nearby neighbors.
    ///
    /// Each neighbor inside `ALIGNMENT_RANGE_SQ` contributes its velocity
    /// `ALIGNMENT_VELOCITY_REPEAT` times. The sum is normalized afterwards, so
    /// the repeat scales every contribution equally.
    pub fn alignment(&self, neighbors: &[NeighborState]) -> Vec3 {
        if neighbors.len() < 2 {
            return Vec3::ZERO;
        }

        let mut desired = Vec3::ZERO;
        for neighbor in neighbors {
            let dist_sq = self.position().distance_squared(neighbor.position);
            if dist_sq == 0.0 || dist_sq > ALIGNMENT_RANGE_SQ {
                continue;
            }
            desired += neighbor.velocity * ALIGNMENT_VELOCITY_REPEAT;
        }

        self.steer_towards(desired)
    }

    /// Seek the mean position of neighbors inside `COHESION_RANGE_SQ`.
    pub fn cohesion(&self, neighbors: &[NeighborState]) -> Vec3 {
        if neighbors.len() < 2 {
            return Vec3::ZERO;
        }

        let mut center = Vec3::ZERO;
        let mut nearby = 0usize;
        for neighbor in neighbors {
            let dist_sq = self.position().distance_squared(neighbor.position);
            if dist_sq == 0.0 || dist_sq > COHESION_RANGE_SQ {
                continue;
            }
            center += neighbor.position;
            nearby += 1;
        }

        if nearby == 0 {
            return Vec3::ZERO;
        }
        self.seek(center / nearby as f32)
    }

    // ========================================================================
    // PATHS AND DAMPING
    // ========================================================================

    /// Seek the current waypoint, moving on to the next (and wrapping to the
    /// first) once inside `WAYPOINT_ARRIVAL_SQ` of it.
    ///
    /// The force still targets the waypoint that was just reached; the new
    /// index takes effect on the next call.
    pub fn path_follow(&mut self, waypoints: &[Vec3]) -> Result<Vec3, SteeringError> {
        let target = *waypoints
            .get(self.waypoint_num)
            .ok_or(SteeringError::OutOfRange { index: self.waypoint_num, len: waypoints.len() })?;

        if self.position().distance_squared(target) < WAYPOINT_ARRIVAL_SQ {
            self.waypoint_num = if self.waypoint_num + 1 >= waypoints.len() {
                0
            } else {
                self.waypoint_num + 1
            };
            debug!("waypoint reached, now seeking #{}", self.waypoint_num);
        }

        Ok(self.seek(target))
    }

    /// Drag towards a speed of `coeff` opposite the current motion.
    pub fn friction(&self, coeff: f32) -> Vec3 {
        let desired = (-self.velocity()).normalize_or_zero() * coeff;
        desired - self.velocity()
    }

    /// Full-speed desired velocity along `heading`, or no force at all when
    /// the heading is degenerate.
    fn steer_towards(&self, heading: Vec3) -> Vec3 {
        let desired = heading.normalize_or_zero() * self.params().max_speed;
        if desired.length_squared() == 0.0 {
            return Vec3::ZERO;
        }
        desired - self.velocity()
    }
}

/// Bring a wander rotation back into (-360, 360] by whole turns of 360.
pub fn wrap_wander_rotation(mut rotation: i32) -> i32 {
    while rotation > WANDER_WRAP_DEG {
        rotation -= WANDER_WRAP_DEG;
    }
    while rotation <= -WANDER_WRAP_DEG {
        rotation += WANDER_WRAP_DEG;
    }
    rotation
}
