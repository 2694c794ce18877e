//! Episode storage for on-policy learning.
//!
//! Trajectories are collected purely on-policy: one episode is appended to a
//! [`TrajectoryBuffer`], consumed once by the update stage and discarded.
//! There is no replay.

pub mod trajectory_buffer;

pub use trajectory_buffer::{BufferError, TrajectoryBatch, TrajectoryBuffer};
