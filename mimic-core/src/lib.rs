#![warn(missing_docs)]
//! A library for active imitation learning.
//!
//! The crate provides the pieces of a dataset-aggregation training loop:
//! an uncertainty-aware ensemble over a stochastic steering predictor, a
//! rollout collector, expert query selection, an append-only example pool,
//! the iteration state machine tying them together, and an evaluation
//! harness that scores policy snapshots by their cumulative cross-track
//! error.
//!
//! Environments and learners are consumed through the [`Env`] and
//! [`Learner`] traits; concrete implementations live in their own crates.
pub mod error;
pub mod record;

mod base;
pub use base::{DriveAction, Env, Frame, Info, Learner, Step, StochasticPolicy};

mod ensemble;
pub use ensemble::EnsemblePolicy;

mod rollout;
pub use rollout::{collect_rollout, RolloutEntry};

mod query;
pub use query::select_queries;

mod dataset;
pub use dataset::{DatasetPool, LabeledExample};

mod evaluator;
pub use evaluator::{cumulative_scores, Evaluator};

mod dagger;
pub use dagger::{Dagger, DaggerConfig, DaggerRun, Stage};

#[cfg(test)]
pub(crate) mod testing;
