//! Core data types shared by the reward, buffer and learning stages.

pub mod thrusters;
pub mod transition;
pub mod vehicle;

pub use thrusters::ThrusterCommand;
pub use transition::{Transition, ACTION_SIZE, OBS_SIZE, THRUSTER_COUNT};
pub use vehicle::{SensorBundle, VehicleState, LASER_COUNT};
