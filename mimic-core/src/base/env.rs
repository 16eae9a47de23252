//! Environment.
use super::{DriveAction, Frame};
use anyhow::Result;

/// Additional information attached to a [`Step`].
pub trait Info {}

impl Info for () {}

/// The result of one environment step.
pub struct Step<E: Env> {
    /// Observation after the step.
    pub obs: Frame,

    /// Reference (expert) action for the new state.
    pub expert: DriveAction,

    /// Reward.
    pub reward: f32,

    /// Flag denoting that the episode ended at this step.
    pub done: bool,

    /// Signed lateral deviation from the track centerline.
    pub cte: f32,

    /// Information defined by the environment.
    pub info: E::Info,
}

/// A stepping driving simulator.
///
/// The environment is a single mutable resource per rollout: it must be
/// reset before use and is never stepped from more than one caller.
pub trait Env {
    /// Configuration.
    type Config: Clone;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Frame>;

    /// Performs an environment step.
    ///
    /// A failing step is fatal for the rollout; there are no retries.
    fn step(&mut self, act: &DriveAction) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Renders the environment. Visualization only.
    fn render(&mut self) {}
}
