//! Configuration of [`Dagger`](super::Dagger).
use crate::error::MimicError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`Dagger`](super::Dagger).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DaggerConfig {
    /// Number of aggregation iterations (K).
    pub n_iterations: usize,

    /// Number of stochastic forward passes per prediction (M).
    pub ensemble_size: usize,

    /// Fraction of logged steps relabeled per rollout, in `(0, 1]`.
    pub alpha: f64,

    /// Timestep budget per rollout.
    pub timesteps: usize,

    /// Let the reference policy steer during collection. Disables
    /// uncertainty logging, so no examples are gathered.
    pub expert_drives: bool,

    /// Persist the selected frames into the pool.
    pub save_frames: bool,

    /// First run id used for aggregation; iteration `i` writes under
    /// `run_id_base + i - 1`. Kept clear of the ids of any pre-existing
    /// bootstrap data.
    pub run_id_base: u32,

    /// Seed passed to every environment build.
    pub seed: i64,

    /// Directory of the aggregated example pool.
    pub train_dir: PathBuf,

    /// Where to save one weights file per snapshot, if set.
    pub model_dir: Option<PathBuf>,

    /// Where to persist the evaluation outputs, if set.
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for DaggerConfig {
    fn default() -> Self {
        Self {
            n_iterations: 10,
            ensemble_size: 1,
            alpha: 1.0,
            timesteps: 100_000,
            expert_drives: false,
            save_frames: true,
            run_id_base: 100,
            seed: 0,
            train_dir: PathBuf::from("dataset/train"),
            model_dir: None,
            artifacts_dir: None,
        }
    }
}

impl DaggerConfig {
    /// Sets the number of aggregation iterations.
    pub fn n_iterations(mut self, v: usize) -> Self {
        self.n_iterations = v;
        self
    }

    /// Sets the ensemble size.
    pub fn ensemble_size(mut self, v: usize) -> Self {
        self.ensemble_size = v;
        self
    }

    /// Sets the relabeled fraction per rollout.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the timestep budget per rollout.
    pub fn timesteps(mut self, v: usize) -> Self {
        self.timesteps = v;
        self
    }

    /// Lets the reference policy steer during collection.
    pub fn expert_drives(mut self, v: bool) -> Self {
        self.expert_drives = v;
        self
    }

    /// Sets whether selected frames are persisted.
    pub fn save_frames(mut self, v: bool) -> Self {
        self.save_frames = v;
        self
    }

    /// Sets the first aggregation run id.
    pub fn run_id_base(mut self, v: u32) -> Self {
        self.run_id_base = v;
        self
    }

    /// Sets the environment seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the pool directory.
    pub fn train_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.train_dir = v.into();
        self
    }

    /// Sets the snapshot weights directory.
    pub fn model_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Sets the evaluation artifacts directory.
    pub fn artifacts_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(v.into());
        self
    }

    /// Rejects out-of-range values before any simulation runs.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(MimicError::InvalidConfig(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            ))
            .into());
        }
        if self.ensemble_size < 1 {
            return Err(
                MimicError::InvalidConfig("ensemble_size must be at least 1".into()).into(),
            );
        }
        if self.timesteps == 0 {
            return Err(MimicError::InvalidConfig("timesteps must be positive".into()).into());
        }
        Ok(())
    }

    /// Constructs [`DaggerConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DaggerConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
