//! Learner.
use super::StochasticPolicy;
use anyhow::Result;
use std::path::Path;

/// Fits policy snapshots against an on-disk example pool.
///
/// Hyperparameters (learning rate, epochs, batch size, steering classes,
/// loss re-weighting, compute device) belong to the implementing type's
/// configuration, not to this trait.
pub trait Learner {
    /// The policy snapshot type produced by a fit.
    type Policy: StochasticPolicy;

    /// Fits a fresh snapshot on the pool in `train_dir`.
    ///
    /// Fitting against an empty pool is an error.
    fn fit(&mut self, train_dir: &Path) -> Result<Self::Policy>;

    /// Persists a snapshot's parameters at `path`.
    fn save_params(&self, policy: &Self::Policy, path: &Path) -> Result<()>;
}
