//! # AUV PPO: Proximal Policy Optimization for underwater navigation
//!
//! Trains an autonomous underwater vehicle to visit a sequence of 3-D
//! targets inside a bounded box while avoiding obstacles, using a
//! single-agent, episode-at-a-time PPO loop.
//!
//! ## Architecture Overview
//!
//! ```text
//!  observation [36]
//!        │
//!        ▼
//!  PolicyNet ──raw [5]──► ThrusterCommand ──[8]──► Simulator
//!        ▲                                            │
//!        │                                      SensorBundle
//!        │                                            ▼
//!        └──────────── VehicleState ◄─────────────────┘
//!                           │
//!                           ▼
//!                      RewardShaper ──► TrajectoryBuffer
//!                                             │ episode end
//!                                             ▼
//!              ValueNet → advantages → policy step → value step
//!                                             │
//!                                             ├──► TrainingLog
//!                                             └──► Checkpointer
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auv_ppo::{AuvEnvironment, Trainer, TrainerConfig};
//!
//! type B = burn::backend::Autodiff<burn::backend::NdArray>;
//!
//! let config = TrainerConfig::from_json_file("train.json")?;
//! let mut env = AuvEnvironment::with_random_targets(my_simulator, config.n_targets, 42)?;
//!
//! let mut trainer = Trainer::<B>::new(config, &Default::default())?;
//! trainer.resume()?;
//! trainer.run(&mut env)?;
//! ```

pub mod algorithms;
pub mod buffers;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod nn;
pub mod reward;
pub mod runners;

pub use algorithms::{ActionSelection, PPOAgent, UpdateStats};
pub use buffers::{BufferError, TrajectoryBatch, TrajectoryBuffer};
pub use checkpoint::{CheckpointError, Checkpointer, NetworkRole};
pub use config::{ConfigError, PPOConfig, RewardConfig, TrainerConfig};
pub use core::{
    SensorBundle, ThrusterCommand, Transition, VehicleState, ACTION_SIZE, LASER_COUNT, OBS_SIZE,
    THRUSTER_COUNT,
};
pub use environment::{AuvEnvironment, EnvError, Simulator, TargetSelector};
pub use error::TrainError;
pub use metrics::{EpisodeRecord, TrainingLog};
pub use nn::{PolicyNet, ValueNet};
pub use reward::{RewardComponents, RewardInput, RewardOutcome, RewardShaper};
pub use runners::{CollectedEpisode, EpisodeSummary, Termination, Trainer};
