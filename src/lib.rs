// Steering behaviors and flocking for autonomous agents in 3D space.
// See engine/steering.rs for the behavior library and engine/flocker.rs
// for how forces are composed each tick.

pub mod engine;

pub use engine::*;
