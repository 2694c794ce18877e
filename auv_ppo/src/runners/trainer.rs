//! Episode-driving loop.
//!
//! ```text
//! for episode in start_episode..n_episodes {
//!     collect:  act -> simulator tick -> reward -> record, until
//!               all targets reached | reward floor | step budget
//!     learn:    values -> advantages -> policy step -> value step
//!     report:   training log (4 lines), then checkpoint on cadence
//! }
//! ```

use burn::tensor::backend::AutodiffBackend;

use crate::algorithms::{PPOAgent, UpdateStats};
use crate::buffers::{TrajectoryBatch, TrajectoryBuffer};
use crate::checkpoint::Checkpointer;
use crate::config::TrainerConfig;
use crate::core::Transition;
use crate::environment::{AuvEnvironment, Simulator};
use crate::error::TrainError;
use crate::metrics::{EpisodeRecord, TrainingLog};
use crate::reward::{RewardInput, RewardShaper};

/// Upper bound on the buffer pre-allocation per episode.
const MAX_PREALLOCATED_STEPS: usize = 4096;

/// Why an episode stopped collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every target of the sequence was reached.
    Completed,
    /// Cumulative reward fell below the floor.
    RewardFloor,
    /// Step budget exhausted.
    StepBudget,
}

/// Trajectory of one episode, before learning.
#[derive(Debug, Clone)]
pub struct CollectedEpisode {
    pub batch: TrajectoryBatch,
    pub total_reward: f32,
    pub achieved_targets: usize,
    pub termination: Termination,
}

/// Outcome of one episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f32,
    pub achieved_targets: usize,
    pub termination: Termination,
    pub stats: UpdateStats,
    /// A new checkpoint was written after this episode. False when the
    /// pair for this episode already existed.
    pub checkpointed: bool,
}

impl EpisodeSummary {
    fn record(&self) -> EpisodeRecord {
        EpisodeRecord {
            episode: self.episode,
            policy_loss: self.stats.policy_loss,
            value_loss: self.stats.value_loss,
            achieved_targets: self.achieved_targets,
            total_reward: self.total_reward,
        }
    }
}

/// Single-agent PPO trainer.
pub struct Trainer<B: AutodiffBackend> {
    config: TrainerConfig,
    agent: PPOAgent<B>,
    shaper: RewardShaper,
    checkpointer: Checkpointer,
    log: TrainingLog,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// Build a trainer with fresh networks and a new timestamped log in
    /// `config.log_dir`.
    pub fn new(config: TrainerConfig, device: &B::Device) -> Result<Self, TrainError> {
        config.validate()?;
        let log = TrainingLog::create_in(&config.log_dir)?;
        Self::with_log(config, log, device)
    }

    /// Build a trainer writing to an existing log.
    pub fn with_log(
        config: TrainerConfig,
        log: TrainingLog,
        device: &B::Device,
    ) -> Result<Self, TrainError> {
        config.validate()?;
        let agent = PPOAgent::new(config.ppo.clone(), device);
        let shaper = RewardShaper::new(config.reward.clone());
        let checkpointer =
            Checkpointer::new(&config.checkpoint_dir).with_interval(config.checkpoint_interval);

        log::info!(
            "PPO trainer: {} parameters, episodes {}..{}, {} targets",
            agent.num_params(),
            config.start_episode,
            config.n_episodes,
            config.n_targets
        );

        Ok(Self {
            config,
            agent,
            shaper,
            checkpointer,
            log,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn agent(&self) -> &PPOAgent<B> {
        &self.agent
    }

    pub fn checkpointer(&self) -> &Checkpointer {
        &self.checkpointer
    }

    pub fn log(&self) -> &TrainingLog {
        &self.log
    }

    /// Restore the networks saved at `start_episode`.
    ///
    /// Returns whether a checkpoint was loaded. A missing checkpoint keeps
    /// the freshly initialized networks.
    pub fn resume(&mut self) -> Result<bool, TrainError> {
        let episode = self.config.start_episode;
        match self.checkpointer.load::<B>(episode, self.agent.device())? {
            Some((policy, value)) => {
                self.agent.set_networks(policy, value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Roll the current policy until every target is reached, the reward
    /// floor is crossed or the step budget runs out.
    ///
    /// Ticks with missing sensor channels still record a transition built
    /// from the stale vehicle state.
    pub fn collect_episode<S: Simulator>(
        &mut self,
        env: &mut AuvEnvironment<S>,
    ) -> Result<CollectedEpisode, TrainError> {
        env.reset()?;
        self.shaper.reset();

        let mut buffer =
            TrajectoryBuffer::with_capacity(self.config.max_steps.min(MAX_PREALLOCATED_STEPS));
        let mut state = env.observation();
        let mut total_reward = 0.0f32;
        let mut achieved_targets = 0usize;
        let mut termination = Termination::StepBudget;

        for _ in 0..self.config.max_steps {
            let selection = self.agent.select_action(&state)?;
            env.step(&selection.command)?;
            let next_state = env.observation();

            let target = env.current_target();
            let vehicle = env.vehicle();
            let outcome = self.shaper.evaluate(&RewardInput {
                prev_location: &vehicle.prev_location,
                location: &vehicle.location,
                target: &target,
                rotation: &vehicle.rotation,
                lasers: &vehicle.lasers,
            });
            env.vehicle_mut().commit_location();

            let mut reward = outcome.reward;
            let mut done = false;
            if outcome.target_reached() {
                achieved_targets += 1;
                if achieved_targets >= self.config.n_targets {
                    done = true;
                    reward += self.config.completion_bonus;
                } else {
                    let next = env.advance_target();
                    log::debug!("Target {:?} reached, next target {:?}", target, next);
                }
            }

            buffer.push(Transition::new(
                state,
                selection.raw,
                reward,
                done,
                selection.distribution,
            ))?;
            total_reward += reward;
            state = next_state;

            if done {
                termination = Termination::Completed;
                break;
            }
            if total_reward < self.config.reward_floor {
                termination = Termination::RewardFloor;
                break;
            }
        }

        Ok(CollectedEpisode {
            batch: buffer.consume(),
            total_reward,
            achieved_targets,
            termination,
        })
    }

    /// Collect one episode, learn from it, log it and checkpoint on cadence.
    pub fn run_episode<S: Simulator>(
        &mut self,
        env: &mut AuvEnvironment<S>,
        episode: usize,
    ) -> Result<EpisodeSummary, TrainError> {
        let collected = self.collect_episode(env)?;
        let stats = self.agent.learn(&collected.batch)?;

        let mut summary = EpisodeSummary {
            episode,
            steps: collected.batch.len(),
            total_reward: collected.total_reward,
            achieved_targets: collected.achieved_targets,
            termination: collected.termination,
            stats,
            checkpointed: false,
        };
        self.log.log_episode(&summary.record())?;

        if self.checkpointer.should_save(episode) {
            summary.checkpointed = self
                .checkpointer
                .save(episode, self.agent.policy(), self.agent.value())?
                .is_some();
        }

        log::info!(
            "Episode {}: {} steps, reward {:.2}, targets {}/{}, {:?}",
            episode,
            summary.steps,
            summary.total_reward,
            summary.achieved_targets,
            self.config.n_targets,
            summary.termination
        );

        Ok(summary)
    }

    /// Train from `start_episode` up to (not including) `n_episodes`.
    pub fn run<S: Simulator>(
        &mut self,
        env: &mut AuvEnvironment<S>,
    ) -> Result<Vec<EpisodeSummary>, TrainError> {
        let episodes = self.config.start_episode..self.config.n_episodes;
        let mut summaries = Vec::with_capacity(episodes.len());
        for episode in episodes {
            summaries.push(self.run_episode(env, episode)?);
        }
        Ok(summaries)
    }
}
