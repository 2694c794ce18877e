//! Environment abstraction for AUV navigation.
//!
//! The physics simulator is an external collaborator behind the
//! [`Simulator`] trait: it accepts an 8-channel thruster command and returns
//! whatever sensor channels arrived on that tick. [`AuvEnvironment`] wraps a
//! simulator with the learner-side view of the world: the vehicle state built
//! from sensor bundles, the candidate targets and the current target.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::core::{SensorBundle, ThrusterCommand, VehicleState};

/// Error raised by a simulator backend.
pub type EnvError = Box<dyn std::error::Error + Send + Sync>;

/// Target coordinates are drawn on an integer grid inside the operating box.
const TARGET_X: (i32, i32) = (150, 250);
const TARGET_Y: (i32, i32) = (150, 250);
const TARGET_Z: (i32, i32) = (-290, -200);

/// External physics simulator.
pub trait Simulator {
    /// Restart the scenario. Vehicle pose is whatever the simulator reports
    /// on the next tick.
    fn reset(&mut self) -> Result<(), EnvError>;

    /// Apply a thruster command and advance one tick.
    fn step(&mut self, command: &ThrusterCommand) -> Result<SensorBundle, EnvError>;
}

/// Candidate targets plus the run-wide history of targets already chosen.
#[derive(Debug, Clone)]
pub struct TargetSelector {
    targets: Vec<[f32; 3]>,
    chosen: Vec<usize>,
}

impl TargetSelector {
    pub fn new(targets: Vec<[f32; 3]>) -> Self {
        Self {
            targets,
            chosen: Vec::new(),
        }
    }

    /// Draw `n` targets uniformly from the integer grid inside the box.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let targets = (0..n)
            .map(|_| {
                [
                    rng.gen_range(TARGET_X.0..=TARGET_X.1) as f32,
                    rng.gen_range(TARGET_Y.0..=TARGET_Y.1) as f32,
                    rng.gen_range(TARGET_Z.0..=TARGET_Z.1) as f32,
                ]
            })
            .collect();
        Self::new(targets)
    }

    pub fn targets(&self) -> &[[f32; 3]] {
        &self.targets
    }

    /// Targets chosen so far, in order.
    pub fn chosen(&self) -> Vec<[f32; 3]> {
        self.chosen.iter().map(|&i| self.targets[i]).collect()
    }

    pub fn remaining(&self) -> usize {
        self.targets.len() - self.chosen.len()
    }

    /// Pick uniformly among targets not chosen yet and record the choice.
    ///
    /// Returns `None` once every target has been chosen.
    pub fn choose_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<[f32; 3]> {
        let available: Vec<usize> = (0..self.targets.len())
            .filter(|i| !self.chosen.contains(i))
            .collect();
        let &index = available.choose(rng)?;
        self.chosen.push(index);
        Some(self.targets[index])
    }

    /// Forget the history, keeping only the most recent choice.
    pub fn restart_cycle(&mut self) {
        let last = self.chosen.last().copied();
        self.chosen.clear();
        self.chosen.extend(last);
    }
}

/// A simulator together with the learner-side vehicle and target state.
pub struct AuvEnvironment<S: Simulator> {
    simulator: S,
    vehicle: VehicleState,
    selector: TargetSelector,
    current_target: [f32; 3],
    rng: StdRng,
}

impl<S: Simulator> AuvEnvironment<S> {
    /// Wrap `simulator` and choose the initial target.
    ///
    /// Fails if `selector` has no targets to choose from.
    pub fn new(simulator: S, mut selector: TargetSelector, seed: u64) -> Result<Self, EnvError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let current_target = selector
            .choose_next(&mut rng)
            .ok_or("target selector has no targets")?;
        Ok(Self {
            simulator,
            vehicle: VehicleState::new(),
            selector,
            current_target,
            rng,
        })
    }

    /// Wrap `simulator` with `n_targets` random targets.
    pub fn with_random_targets(
        simulator: S,
        n_targets: usize,
        seed: u64,
    ) -> Result<Self, EnvError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let selector = TargetSelector::random(n_targets, &mut rng);
        Self::new(simulator, selector, seed)
    }

    /// Restart the simulator. Vehicle state and target history carry over.
    pub fn reset(&mut self) -> Result<(), EnvError> {
        self.simulator.reset()
    }

    /// Send a command and fold the returned sensor bundle into the vehicle
    /// state. Returns whether the bundle was complete enough to apply.
    pub fn step(&mut self, command: &ThrusterCommand) -> Result<bool, EnvError> {
        let bundle = self.simulator.step(command)?;
        Ok(self.vehicle.apply(&bundle))
    }

    pub fn observation(&self) -> Vec<f32> {
        self.vehicle.observation()
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn vehicle_mut(&mut self) -> &mut VehicleState {
        &mut self.vehicle
    }

    pub fn current_target(&self) -> [f32; 3] {
        self.current_target
    }

    pub fn set_current_target(&mut self, target: [f32; 3]) {
        self.current_target = target;
    }

    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Choose an unvisited target and make it current.
    ///
    /// When every target has been chosen the history restarts; with a
    /// single target the current one is kept.
    pub fn advance_target(&mut self) -> [f32; 3] {
        let next = match self.selector.choose_next(&mut self.rng) {
            Some(target) => Some(target),
            None => {
                log::debug!("All targets chosen, restarting target cycle");
                self.selector.restart_cycle();
                self.selector.choose_next(&mut self.rng)
            }
        };
        if let Some(target) = next {
            self.current_target = target;
        }
        self.current_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSimulator {
        bundle: SensorBundle,
        resets: usize,
        commands: Vec<ThrusterCommand>,
    }

    impl Simulator for StaticSimulator {
        fn reset(&mut self) -> Result<(), EnvError> {
            self.resets += 1;
            Ok(())
        }

        fn step(&mut self, command: &ThrusterCommand) -> Result<SensorBundle, EnvError> {
            self.commands.push(*command);
            Ok(self.bundle.clone())
        }
    }

    fn simulator(bundle: SensorBundle) -> StaticSimulator {
        StaticSimulator {
            bundle,
            resets: 0,
            commands: Vec::new(),
        }
    }

    fn full_bundle() -> SensorBundle {
        SensorBundle {
            pose: Some([
                [1.0, 0.0, 0.0, 210.0],
                [0.0, 1.0, 0.0, 190.0],
                [0.0, 0.0, 1.0, -240.0],
                [0.0, 0.0, 0.0, 1.0],
            ]),
            velocity: Some([0.0; 3]),
            rotation: Some([0.0; 3]),
            horizontal_range: Some(vec![10.0; 8]),
            up_range: Some(vec![10.0]),
            down_range: Some(vec![10.0]),
            up_inclined_range: Some(vec![10.0; 2]),
            down_inclined_range: Some(vec![10.0; 2]),
        }
    }

    #[test]
    fn test_choose_next_never_repeats() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut selector = TargetSelector::random(10, &mut rng);

        let mut seen = Vec::new();
        for _ in 0..10 {
            let target = selector.choose_next(&mut rng).unwrap();
            assert!(!seen.contains(&target), "target {:?} chosen twice", target);
            seen.push(target);
        }
        assert_eq!(selector.remaining(), 0);
        assert!(selector.choose_next(&mut rng).is_none());
    }

    #[test]
    fn test_random_targets_inside_grid() {
        let mut rng = StdRng::seed_from_u64(11);
        let selector = TargetSelector::random(50, &mut rng);
        for t in selector.targets() {
            assert!((150.0..=250.0).contains(&t[0]));
            assert!((150.0..=250.0).contains(&t[1]));
            assert!((-290.0..=-200.0).contains(&t[2]));
            assert_eq!(t[0].fract(), 0.0);
        }
    }

    #[test]
    fn test_restart_cycle_keeps_last_choice() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut selector = TargetSelector::new(vec![[1.0; 3], [2.0; 3]]);
        selector.choose_next(&mut rng).unwrap();
        let last = selector.choose_next(&mut rng).unwrap();

        selector.restart_cycle();
        assert_eq!(selector.chosen(), vec![last]);
        let next = selector.choose_next(&mut rng).unwrap();
        assert_ne!(next, last);
    }

    #[test]
    fn test_new_requires_a_target() {
        let result = AuvEnvironment::new(simulator(full_bundle()), TargetSelector::new(vec![]), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_step_applies_complete_bundle() {
        let mut env =
            AuvEnvironment::with_random_targets(simulator(full_bundle()), 3, 42).unwrap();
        env.reset().unwrap();
        let applied = env.step(&ThrusterCommand::from_raw_action(&[0.1; 5], 50.0)).unwrap();

        assert!(applied);
        assert_eq!(env.vehicle().location, [210.0, 190.0, -240.0]);
        assert_eq!(env.simulator().resets, 1);
        assert_eq!(env.simulator().commands.len(), 1);
        assert_eq!(env.simulator().commands[0].as_slice()[0], 5.0);
    }

    #[test]
    fn test_partial_bundle_leaves_state_stale() {
        let mut bundle = full_bundle();
        bundle.pose = None;
        let mut env = AuvEnvironment::with_random_targets(simulator(bundle), 3, 42).unwrap();

        let applied = env.step(&ThrusterCommand::from_raw_action(&[0.0; 5], 50.0)).unwrap();
        assert!(!applied);
        assert_eq!(env.vehicle().location, [0.0; 3]);
    }

    #[test]
    fn test_advance_target_cycles_through_all() {
        let mut env =
            AuvEnvironment::with_random_targets(simulator(full_bundle()), 4, 9).unwrap();
        let mut visited = vec![env.current_target()];
        for _ in 0..3 {
            visited.push(env.advance_target());
        }
        for (i, t) in visited.iter().enumerate() {
            assert!(!visited[..i].contains(t), "target repeated within a cycle");
        }

        // Exhausted: a new cycle starts without repeating the current target
        let current = env.current_target();
        assert_ne!(env.advance_target(), current);
    }

    #[test]
    fn test_single_target_is_kept() {
        let selector = TargetSelector::new(vec![[200.0, 200.0, -250.0]]);
        let mut env = AuvEnvironment::new(simulator(full_bundle()), selector, 1).unwrap();
        assert_eq!(env.advance_target(), [200.0, 200.0, -250.0]);
    }
}
