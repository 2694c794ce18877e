//! Training runners.
//!
//! - [`Trainer`]: Single-agent episode loop (collect, learn, log, checkpoint)

pub mod trainer;

pub use trainer::{CollectedEpisode, EpisodeSummary, Termination, Trainer};
