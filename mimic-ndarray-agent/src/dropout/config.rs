//! Configuration of the dropout steering learner.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`DropoutLearner`](super::DropoutLearner) and of the
/// [`DropoutPolicy`](super::DropoutPolicy) snapshots it produces.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DropoutLearnerConfig {
    /// Expected observation shape `[height, width, channels]`.
    pub in_shape: [usize; 3],

    /// Number of steering classes.
    pub n_classes: usize,

    /// Input drop probability used both for stochastic sampling and
    /// during training. Zero makes the policy deterministic.
    pub p_drop: f32,

    /// Learning rate.
    pub lr: f32,

    /// Number of epochs per fit.
    pub n_epochs: usize,

    /// Minibatch size.
    pub batch_size: usize,

    /// Re-weight the loss by inverse class frequency, countering the
    /// imbalance of the steering angle distribution.
    pub weighted_loss: bool,

    /// Seed of the learner's random number generator.
    pub seed: u64,
}

impl Default for DropoutLearnerConfig {
    fn default() -> Self {
        Self {
            in_shape: [32, 32, 3],
            n_classes: 20,
            p_drop: 0.5,
            lr: 1e-3,
            n_epochs: 25,
            batch_size: 256,
            weighted_loss: true,
            seed: 42,
        }
    }
}

impl DropoutLearnerConfig {
    /// Sets the expected observation shape.
    pub fn in_shape(mut self, v: [usize; 3]) -> Self {
        self.in_shape = v;
        self
    }

    /// Sets the number of steering classes.
    pub fn n_classes(mut self, v: usize) -> Self {
        self.n_classes = v;
        self
    }

    /// Sets the input drop probability.
    pub fn p_drop(mut self, v: f32) -> Self {
        self.p_drop = v;
        self
    }

    /// Sets the learning rate.
    pub fn lr(mut self, v: f32) -> Self {
        self.lr = v;
        self
    }

    /// Sets the number of epochs per fit.
    pub fn n_epochs(mut self, v: usize) -> Self {
        self.n_epochs = v;
        self
    }

    /// Sets the minibatch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets whether the loss is re-weighted by inverse class frequency.
    pub fn weighted_loss(mut self, v: bool) -> Self {
        self.weighted_loss = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`DropoutLearnerConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DropoutLearnerConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
