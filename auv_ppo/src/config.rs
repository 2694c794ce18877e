//! Configuration for AUV PPO training.
//!
//! Three layers, aggregated by [`TrainerConfig`]:
//! - [`PPOConfig`]: learning hyperparameters (discount, clipping, optimiser)
//! - [`RewardConfig`]: geometry, thresholds and weights of the shaped reward
//! - [`TrainerConfig`]: episode loop limits, checkpoint cadence and paths
//!
//! All layers round-trip through serde, so a full run can be described by a
//! single JSON file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration validation error.
#[derive(Debug)]
pub enum ConfigError {
    /// A count parameter must be positive.
    InvalidCount {
        field: &'static str,
        value: usize,
    },
    /// A parameter is outside its valid range.
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    /// Config file could not be read.
    Io(io::Error),
    /// Config file is not valid JSON for this schema.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCount { field, value } => {
                write!(f, "{} must be > 0, got {}", field, value)
            }
            ConfigError::OutOfRange { field, value, min, max } => {
                write!(f, "{} must be in [{}, {}], got {}", field, min, max, value)
            }
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

// ============================================================================
// PPOConfig
// ============================================================================

/// Learning hyperparameters for the policy and value update rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PPOConfig {
    /// Discount factor for Monte-Carlo returns.
    pub gamma: f32,
    /// Clipping ratio ε for the surrogate objective.
    pub clip_ratio: f32,
    /// Adam learning rate for the policy network.
    pub policy_lr: f64,
    /// Adam learning rate for the value network.
    pub value_lr: f64,
    /// Gain applied when expanding the raw action into thruster commands.
    pub action_gain: f32,
    /// Additive epsilon guarding divisions (old probability, advantage std).
    pub epsilon: f32,
    /// Optional gradient norm clipping for both optimisers.
    pub max_grad_norm: Option<f32>,
}

impl Default for PPOConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            clip_ratio: 0.2,
            policy_lr: 1e-3,
            value_lr: 1e-3,
            action_gain: 50.0,
            epsilon: 1e-8,
            max_grad_norm: None,
        }
    }
}

impl PPOConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_clip_ratio(mut self, clip_ratio: f32) -> Self {
        self.clip_ratio = clip_ratio;
        self
    }

    pub fn with_policy_lr(mut self, lr: f64) -> Self {
        self.policy_lr = lr;
        self
    }

    pub fn with_value_lr(mut self, lr: f64) -> Self {
        self.value_lr = lr;
        self
    }

    pub fn with_action_gain(mut self, gain: f32) -> Self {
        self.action_gain = gain;
        self
    }

    pub fn with_max_grad_norm(mut self, max_norm: Option<f32>) -> Self {
        self.max_grad_norm = max_norm;
        self
    }

    /// Validate hyperparameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::OutOfRange {
                field: "gamma",
                value: self.gamma,
                min: 0.0,
                max: 1.0,
            });
        }
        if !(self.clip_ratio > 0.0 && self.clip_ratio < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "clip_ratio",
                value: self.clip_ratio,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.policy_lr <= 0.0 || self.value_lr <= 0.0 {
            let value = self.policy_lr.min(self.value_lr) as f32;
            return Err(ConfigError::OutOfRange {
                field: "learning_rate",
                value,
                min: 0.0,
                max: f32::INFINITY,
            });
        }
        Ok(())
    }
}

// ============================================================================
// RewardConfig
// ============================================================================

/// Geometry, thresholds and weights of the shaped navigation reward.
///
/// Defaults describe a 120 m cube centred on the spawn point with the
/// standard penalty weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Centre of the allowed operating box.
    pub box_center: [f32; 3],
    /// Full side lengths of the box on each axis.
    pub box_extent: [f32; 3],
    /// Minimum decrease in target distance that counts as progress.
    pub progress_threshold: f32,
    /// Range at or below which a laser reading is a collision.
    pub collision_range: f32,
    /// Range below which a laser reading is a near miss.
    pub near_miss_range: f32,
    /// Per-step displacement below which the vehicle counts as static.
    pub stagnation_displacement: f32,
    /// Consecutive static steps before the stagnation flag fires.
    pub stagnation_window: u32,
    /// Distance to target under which the target counts as reached.
    pub target_radius: f32,
    /// Scale applied to the accumulated roll/pitch deviation in degrees.
    pub incline_scale: f32,

    pub outside_box_weight: f32,
    pub collision_weight: f32,
    pub near_miss_weight: f32,
    pub incline_weight: f32,
    pub stagnation_weight: f32,
    pub progress_weight: f32,
    pub target_weight: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            box_center: [200.0, 200.0, -250.0],
            box_extent: [120.0, 120.0, 120.0],
            progress_threshold: 0.02,
            collision_range: 0.0,
            near_miss_range: 1.0,
            stagnation_displacement: 0.01,
            stagnation_window: 50,
            target_radius: 2.0,
            incline_scale: 0.001,
            outside_box_weight: 100.0,
            collision_weight: 30.0,
            near_miss_weight: 5.0,
            incline_weight: 1.0,
            stagnation_weight: 1.0,
            progress_weight: 1.0,
            target_weight: 100.0,
        }
    }
}

impl RewardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stagnation_window == 0 {
            return Err(ConfigError::InvalidCount {
                field: "stagnation_window",
                value: 0,
            });
        }
        for &extent in &self.box_extent {
            if extent <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "box_extent",
                    value: extent,
                    min: 0.0,
                    max: f32::INFINITY,
                });
            }
        }
        if self.target_radius <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "target_radius",
                value: self.target_radius,
                min: 0.0,
                max: f32::INFINITY,
            });
        }
        Ok(())
    }
}

// ============================================================================
// TrainerConfig
// ============================================================================

/// Episode loop, checkpoint and logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub ppo: PPOConfig,
    pub reward: RewardConfig,
    /// Targets to reach before an episode counts as complete.
    pub n_targets: usize,
    /// Step budget per episode.
    pub max_steps: usize,
    /// Cumulative reward below which the episode is aborted.
    pub reward_floor: f32,
    /// Extra reward granted on the step that completes the target sequence.
    pub completion_bonus: f32,
    /// Episodes between checkpoints.
    pub checkpoint_interval: usize,
    /// Episode to resume from (0 = fresh start).
    pub start_episode: usize,
    /// Episode index at which training stops (exclusive).
    pub n_episodes: usize,
    /// Directory for policy/value checkpoints.
    pub checkpoint_dir: PathBuf,
    /// Directory for the training log.
    pub log_dir: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            ppo: PPOConfig::default(),
            reward: RewardConfig::default(),
            n_targets: 10,
            max_steps: 10_000,
            reward_floor: -1000.0,
            completion_bonus: 1000.0,
            checkpoint_interval: 20,
            start_episode: 0,
            n_episodes: 100_000,
            checkpoint_dir: PathBuf::from("model_checkpoints"),
            log_dir: PathBuf::from("."),
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ppo(mut self, ppo: PPOConfig) -> Self {
        self.ppo = ppo;
        self
    }

    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_n_targets(mut self, n: usize) -> Self {
        self.n_targets = n;
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_reward_floor(mut self, floor: f32) -> Self {
        self.reward_floor = floor;
        self
    }

    pub fn with_completion_bonus(mut self, bonus: f32) -> Self {
        self.completion_bonus = bonus;
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    pub fn with_start_episode(mut self, episode: usize) -> Self {
        self.start_episode = episode;
        self
    }

    pub fn with_n_episodes(mut self, n: usize) -> Self {
        self.n_episodes = n;
        self
    }

    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Load and validate a config from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every layer of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ppo.validate()?;
        self.reward.validate()?;

        for (field, value) in [
            ("n_targets", self.n_targets),
            ("max_steps", self.max_steps),
            ("checkpoint_interval", self.checkpoint_interval),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidCount { field, value });
            }
        }
        Ok(())
    }
}
