//! Shaped navigation reward.
//!
//! Converts one tick of kinematic and range-finder observations into a scalar
//! learning signal and a terminal "target reached" flag.
//!
//! # Formula
//!
//! ```text
//! r = - 100 * outside_box
//!     -  30 * collision
//!     -   5 * near_miss
//!     -   1 * incline_penalty
//!     -   1 * stagnation
//!     +   1 * distance_progress
//!     + 100 * target_reached
//! ```
//!
//! Weights and thresholds come from [`RewardConfig`]; the values above are
//! its defaults.
//!
//! # State
//!
//! Only the stagnation counter persists between ticks. It lives inside the
//! [`RewardShaper`], so each rollout owns an independent shaper and parallel
//! or repeated runs never share it.

pub mod components;

pub use components::{
    collision, distance, distance_progress, incline_deviation, incline_penalty, near_miss,
    reach_target, BoundingBox, StagnationTracker,
};

use crate::config::RewardConfig;

/// Observations needed to score one tick.
#[derive(Debug, Clone, Copy)]
pub struct RewardInput<'a> {
    pub prev_location: &'a [f32; 3],
    pub location: &'a [f32; 3],
    pub target: &'a [f32; 3],
    /// Roll, pitch, yaw in degrees, already offset by +180.
    pub rotation: &'a [f32; 3],
    pub lasers: &'a [f32],
}

/// Per-tick reward terms. Transient: recomputed every tick, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardComponents {
    pub outside_box: bool,
    pub collision: bool,
    pub near_miss: bool,
    pub incline_penalty: f32,
    pub stagnation: bool,
    pub distance_progress: bool,
    pub target_reached: bool,
}

#[inline]
fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl RewardComponents {
    /// Weighted sum of all terms.
    pub fn total(&self, config: &RewardConfig) -> f32 {
        -config.outside_box_weight * flag(self.outside_box)
            - config.collision_weight * flag(self.collision)
            - config.near_miss_weight * flag(self.near_miss)
            - config.incline_weight * self.incline_penalty
            - config.stagnation_weight * flag(self.stagnation)
            + config.progress_weight * flag(self.distance_progress)
            + config.target_weight * flag(self.target_reached)
    }
}

/// Result of scoring one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardOutcome {
    pub reward: f32,
    pub components: RewardComponents,
}

impl RewardOutcome {
    pub fn target_reached(&self) -> bool {
        self.components.target_reached
    }
}

/// Stateful reward evaluator for a single agent.
#[derive(Debug, Clone)]
pub struct RewardShaper {
    config: RewardConfig,
    bounds: BoundingBox,
    stagnation: StagnationTracker,
}

impl RewardShaper {
    pub fn new(config: RewardConfig) -> Self {
        let bounds = BoundingBox::new(config.box_center, config.box_extent);
        let stagnation =
            StagnationTracker::new(config.stagnation_displacement, config.stagnation_window);
        Self {
            config,
            bounds,
            stagnation,
        }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Compute every term for one tick. Advances the stagnation counter.
    pub fn components(&mut self, input: &RewardInput<'_>) -> RewardComponents {
        let cfg = &self.config;
        RewardComponents {
            outside_box: self.bounds.is_outside(input.location),
            collision: collision(input.lasers, cfg.collision_range),
            near_miss: near_miss(input.lasers, cfg.near_miss_range),
            incline_penalty: incline_penalty(input.rotation, cfg.incline_scale),
            stagnation: self.stagnation.update(input.prev_location, input.location),
            distance_progress: distance_progress(
                input.prev_location,
                input.location,
                input.target,
                cfg.progress_threshold,
            ),
            target_reached: reach_target(input.location, input.target, cfg.target_radius),
        }
    }

    /// Score one tick.
    pub fn evaluate(&mut self, input: &RewardInput<'_>) -> RewardOutcome {
        let components = self.components(input);
        RewardOutcome {
            reward: components.total(&self.config),
            components,
        }
    }

    /// Whether `location` is outside the operating box. Stateless.
    pub fn outside_box(&self, location: &[f32; 3]) -> bool {
        self.bounds.is_outside(location)
    }

    /// Whether `location` is within the target radius. Stateless.
    pub fn reach_target(&self, location: &[f32; 3], target: &[f32; 3]) -> bool {
        reach_target(location, target, self.config.target_radius)
    }

    /// Current stagnation counter.
    pub fn stagnation_counter(&self) -> u32 {
        self.stagnation.counter()
    }

    /// Clear per-episode state.
    pub fn reset(&mut self) {
        self.stagnation.reset();
    }
}

impl Default for RewardShaper {
    fn default() -> Self {
        Self::new(RewardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: [f32; 3] = [200.0, 200.0, -250.0];
    const LEVEL: [f32; 3] = [0.0, 180.0, 0.0];
    const CLEAR: [f32; 4] = [10.0, 10.0, 10.0, 10.0];

    fn input<'a>(
        prev: &'a [f32; 3],
        loc: &'a [f32; 3],
        target: &'a [f32; 3],
        lasers: &'a [f32],
    ) -> RewardInput<'a> {
        RewardInput {
            prev_location: prev,
            location: loc,
            target,
            rotation: &LEVEL,
            lasers,
        }
    }

    #[test]
    fn test_outside_box() {
        let shaper = RewardShaper::default();
        assert!(shaper.outside_box(&[400.0, 400.0, -250.0]));
        assert!(!shaper.outside_box(&CENTER));
        // Half extent is 60 on every axis
        assert!(!shaper.outside_box(&[260.0, 140.0, -310.0]));
        assert!(shaper.outside_box(&[200.0, 200.0, -311.0]));
    }

    #[test]
    fn test_reach_target_threshold() {
        let shaper = RewardShaper::default();
        let target = [210.0, 200.0, -250.0];
        assert!(shaper.reach_target(&[209.0, 200.0, -250.0], &target));
        assert!(!shaper.reach_target(&[207.0, 200.0, -250.0], &target));
    }

    #[test]
    fn test_stagnation_window_and_reset() {
        let mut shaper = RewardShaper::default();
        let target = [250.0, 250.0, -250.0];
        let mut prev = CENTER;

        for step in 1..=50 {
            let loc = [prev[0] + 0.005, prev[1], prev[2]];
            let c = shaper.components(&input(&prev, &loc, &target, &CLEAR));
            assert_eq!(c.stagnation, step == 50, "step {}", step);
            prev = loc;
        }
        assert_eq!(shaper.stagnation_counter(), 50);

        let loc = [prev[0] + 0.02, prev[1], prev[2]];
        let c = shaper.components(&input(&prev, &loc, &target, &CLEAR));
        assert!(!c.stagnation);
        assert_eq!(shaper.stagnation_counter(), 0);
    }

    #[test]
    fn test_shapers_do_not_share_state() {
        let mut a = RewardShaper::default();
        let b = RewardShaper::default();
        let target = [250.0, 250.0, -250.0];
        for _ in 0..10 {
            a.components(&input(&CENTER, &CENTER, &target, &CLEAR));
        }
        assert_eq!(a.stagnation_counter(), 10);
        assert_eq!(b.stagnation_counter(), 0);
    }

    #[test]
    fn test_total_reward_all_penalties() {
        let mut shaper = RewardShaper::default();
        let prev = [400.0, 400.0, -250.0];
        let loc = [400.0, 400.0, -250.0];
        let target = [200.0, 200.0, -250.0];
        let lasers = [0.0, 5.0];
        let rotation = [45.0, 180.0, 0.0];

        let outcome = shaper.evaluate(&RewardInput {
            prev_location: &prev,
            location: &loc,
            target: &target,
            rotation: &rotation,
            lasers: &lasers,
        });

        let c = outcome.components;
        assert!(c.outside_box && c.collision && c.near_miss);
        assert!(!c.stagnation && !c.distance_progress && !c.target_reached);
        // -100 - 30 - 5 - 0.03
        assert!((outcome.reward - (-135.03)).abs() < 1e-4, "{}", outcome.reward);
    }

    #[test]
    fn test_total_reward_reaching_target() {
        let mut shaper = RewardShaper::default();
        let prev = [205.0, 200.0, -250.0];
        let loc = [201.0, 200.0, -250.0];
        let target = [200.0, 200.0, -250.0];

        let outcome = shaper.evaluate(&input(&prev, &loc, &target, &CLEAR));
        assert!(outcome.target_reached());
        assert!(outcome.components.distance_progress);
        assert!((outcome.reward - 101.0).abs() < 1e-5);
    }
}
