//! Training metrics.
//!
//! - [`TrainingLog`]: Append-only per-episode log of losses, targets and reward

pub mod training_log;

pub use training_log::{EpisodeRecord, TrainingLog};
