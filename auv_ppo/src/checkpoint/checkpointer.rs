//! Episode-indexed checkpoint persistence for the policy/value pair.

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::nn::{PolicyNet, ValueNet};

/// Error type for checkpointing operations.
#[derive(Debug)]
pub enum CheckpointError {
    /// IO error during save/load.
    Io(io::Error),
    /// Burn recorder error.
    Recorder(String),
    /// One or both files of a checkpoint pair are absent.
    Incomplete {
        episode: usize,
        missing: Vec<PathBuf>,
    },
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointError::Io(e) => write!(f, "IO error: {}", e),
            CheckpointError::Recorder(e) => write!(f, "Recorder error: {}", e),
            CheckpointError::Incomplete { episode, missing } => {
                write!(f, "Checkpoint for episode {} is missing {:?}", episode, missing)
            }
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        CheckpointError::Io(e)
    }
}

/// Which network a checkpoint file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRole {
    Policy,
    Value,
}

impl NetworkRole {
    fn as_str(&self) -> &'static str {
        match self {
            NetworkRole::Policy => "policy",
            NetworkRole::Value => "value",
        }
    }
}

/// Saves and restores policy/value parameters by episode index.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    dir: PathBuf,
    interval: usize,
}

impl Checkpointer {
    /// Create a checkpointer rooted at `dir`. The directory is created on
    /// the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            interval: 20,
        }
    }

    /// Set the number of episodes between saves.
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval;
        self
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Whether `episode` falls on the save cadence. Episode 0 counts.
    pub fn should_save(&self, episode: usize) -> bool {
        self.interval > 0 && episode % self.interval == 0
    }

    /// File holding one network's parameters for `episode`.
    pub fn path(&self, role: NetworkRole, episode: usize) -> PathBuf {
        self.dir
            .join(format!("{}_model_episode_{}.bin", role.as_str(), episode))
    }

    /// Save both networks for `episode`, creating the directory if absent.
    ///
    /// A complete pair is never rewritten: if both files for `episode`
    /// already exist they are kept and `None` is returned. A half-written
    /// pair is replaced.
    pub fn save<B: Backend>(
        &self,
        episode: usize,
        policy: &PolicyNet<B>,
        value: &ValueNet<B>,
    ) -> Result<Option<(PathBuf, PathBuf)>, CheckpointError> {
        if self.locate(episode).is_ok() {
            log::info!(
                "Checkpoint for episode {} already exists in {:?}, keeping it",
                episode,
                self.dir
            );
            return Ok(None);
        }
        fs::create_dir_all(&self.dir)?;

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        let policy_path = self.path(NetworkRole::Policy, episode);
        let value_path = self.path(NetworkRole::Value, episode);

        policy
            .clone()
            .save_file(policy_path.clone(), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        value
            .clone()
            .save_file(value_path.clone(), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;

        log::debug!("Saved checkpoint for episode {} to {:?}", episode, self.dir);
        Ok(Some((policy_path, value_path)))
    }

    /// Both file paths for `episode`, or `Incomplete` listing the absent ones.
    pub fn locate(&self, episode: usize) -> Result<(PathBuf, PathBuf), CheckpointError> {
        let policy_path = self.path(NetworkRole::Policy, episode);
        let value_path = self.path(NetworkRole::Value, episode);

        let missing: Vec<PathBuf> = [&policy_path, &value_path]
            .into_iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok((policy_path, value_path))
        } else {
            Err(CheckpointError::Incomplete { episode, missing })
        }
    }

    /// Restore the pair saved at `episode`.
    ///
    /// Episode 0 is a fresh start and loads nothing. A missing or half-written
    /// pair is reported and yields `None`; neither network is restored alone.
    pub fn load<B: Backend>(
        &self,
        episode: usize,
        device: &B::Device,
    ) -> Result<Option<(PolicyNet<B>, ValueNet<B>)>, CheckpointError> {
        if episode == 0 {
            return Ok(None);
        }

        let (policy_path, value_path) = match self.locate(episode) {
            Ok(paths) => paths,
            Err(CheckpointError::Incomplete { missing, .. }) => {
                log::info!(
                    "No saved models found for episode {} (missing {:?}), starting fresh",
                    episode,
                    missing
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        let policy = PolicyNet::new(device)
            .load_file(policy_path, &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        let value = ValueNet::new(device)
            .load_file(value_path, &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;

        log::info!("Loaded models from episode {}", episode);
        Ok(Some((policy, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OBS_SIZE;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;
    use tempfile::tempdir;

    type TestBackend = NdArray<f32>;

    fn sample_obs(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 2> {
        let obs: Vec<f32> = (0..OBS_SIZE).map(|i| i as f32 * 0.1 - 1.0).collect();
        Tensor::<TestBackend, 1>::from_floats(obs.as_slice(), device).reshape([1, OBS_SIZE])
    }

    #[test]
    fn test_should_save() {
        let checkpointer = Checkpointer::new("unused").with_interval(20);
        assert!(checkpointer.should_save(0));
        assert!(!checkpointer.should_save(19));
        assert!(checkpointer.should_save(20));
        assert!(checkpointer.should_save(40));
    }

    #[test]
    fn test_file_naming() {
        let checkpointer = Checkpointer::new("model_checkpoints");
        assert_eq!(
            checkpointer.path(NetworkRole::Policy, 20),
            PathBuf::from("model_checkpoints/policy_model_episode_20.bin")
        );
        assert_eq!(
            checkpointer.path(NetworkRole::Value, 3),
            PathBuf::from("model_checkpoints/value_model_episode_3.bin")
        );
    }

    #[test]
    fn test_round_trip_reproduces_outputs() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let checkpointer = Checkpointer::new(dir.path().join("nested/ckpts"));

        let policy = PolicyNet::<TestBackend>::new(&device);
        let value = ValueNet::<TestBackend>::new(&device);
        assert!(checkpointer.save(20, &policy, &value).unwrap().is_some());
        assert!(dir.path().join("nested/ckpts").exists());

        let (restored_policy, restored_value) = checkpointer
            .load::<TestBackend>(20, &device)
            .unwrap()
            .expect("checkpoint should exist");

        let before = policy.forward(sample_obs(&device)).into_data().to_vec::<f32>().unwrap();
        let after = restored_policy
            .forward(sample_obs(&device))
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-6, "policy output changed: {} vs {}", a, b);
        }

        let v_before = value.forward_flat(sample_obs(&device)).into_data().to_vec::<f32>().unwrap();
        let v_after = restored_value
            .forward_flat(sample_obs(&device))
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert!((v_before[0] - v_after[0]).abs() < 1e-6);
    }

    #[test]
    fn test_episode_zero_loads_nothing() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let checkpointer = Checkpointer::new(dir.path());
        let policy = PolicyNet::<TestBackend>::new(&device);
        let value = ValueNet::<TestBackend>::new(&device);
        checkpointer.save(0, &policy, &value).unwrap();

        assert!(checkpointer.load::<TestBackend>(0, &device).unwrap().is_none());
    }

    #[test]
    fn test_missing_checkpoint_is_not_an_error() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let checkpointer = Checkpointer::new(dir.path());
        assert!(checkpointer.load::<TestBackend>(40, &device).unwrap().is_none());
    }

    #[test]
    fn test_half_pair_is_not_restored() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let checkpointer = Checkpointer::new(dir.path());
        let policy = PolicyNet::<TestBackend>::new(&device);
        let value = ValueNet::<TestBackend>::new(&device);
        checkpointer.save(20, &policy, &value).unwrap();
        fs::remove_file(checkpointer.path(NetworkRole::Value, 20)).unwrap();

        match checkpointer.locate(20) {
            Err(CheckpointError::Incomplete { episode, missing }) => {
                assert_eq!(episode, 20);
                assert_eq!(missing, vec![checkpointer.path(NetworkRole::Value, 20)]);
            }
            other => panic!("expected Incomplete, got {:?}", other),
        }
        assert!(checkpointer.load::<TestBackend>(20, &device).unwrap().is_none());

        // A half pair is rewritten in full
        assert!(checkpointer.save(20, &policy, &value).unwrap().is_some());
        assert!(checkpointer.locate(20).is_ok());
    }

    #[test]
    fn test_existing_pair_is_never_overwritten() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let checkpointer = Checkpointer::new(dir.path());

        let first_policy = PolicyNet::<TestBackend>::new(&device);
        let first_value = ValueNet::<TestBackend>::new(&device);
        checkpointer.save(20, &first_policy, &first_value).unwrap();

        let policy_bytes = fs::read(checkpointer.path(NetworkRole::Policy, 20)).unwrap();
        let value_bytes = fs::read(checkpointer.path(NetworkRole::Value, 20)).unwrap();

        let other_policy = PolicyNet::<TestBackend>::new(&device);
        let other_value = ValueNet::<TestBackend>::new(&device);
        assert!(checkpointer.save(20, &other_policy, &other_value).unwrap().is_none());

        assert_eq!(fs::read(checkpointer.path(NetworkRole::Policy, 20)).unwrap(), policy_bytes);
        assert_eq!(fs::read(checkpointer.path(NetworkRole::Value, 20)).unwrap(), value_bytes);

        let (restored, _) = checkpointer.load::<TestBackend>(20, &device).unwrap().unwrap();
        let expected = first_policy.forward(sample_obs(&device)).into_data().to_vec::<f32>().unwrap();
        let got = restored.forward(sample_obs(&device)).into_data().to_vec::<f32>().unwrap();
        for (a, b) in expected.iter().zip(got.iter()) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }
}
