//! Deterministic stubs shared by tests.
use crate::{DriveAction, Env, Frame, Learner, Step, StochasticPolicy};
use anyhow::Result;
use std::path::Path;

/// Configuration of [`StubEnv`].
#[derive(Clone, Debug)]
pub struct StubEnvConfig {
    /// Step at which `done` is first reported.
    pub horizon: usize,
}

/// An environment that reports `done` on its `horizon`-th step and emits a
/// cross-track error proportional to the step count.
pub struct StubEnv {
    horizon: usize,
    count: usize,
    /// Every action the environment has received since the last reset.
    pub received: Vec<DriveAction>,
}

impl StubEnv {
    /// The constant reference action.
    pub const EXPERT: DriveAction = DriveAction {
        steer: 0.25,
        throttle: 0.5,
        brake: 0.0,
    };
}

impl Env for StubEnv {
    type Config = StubEnvConfig;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            horizon: config.horizon,
            count: 0,
            received: Vec::new(),
        })
    }

    fn reset(&mut self) -> Result<Frame> {
        self.count = 0;
        self.received.clear();
        Ok(Frame::zeros(2, 2, 3))
    }

    fn step(&mut self, act: &DriveAction) -> Result<Step<Self>> {
        self.received.push(*act);
        self.count += 1;
        Ok(Step {
            obs: Frame::zeros(2, 2, 3),
            expert: Self::EXPERT,
            reward: 0.0,
            done: self.count >= self.horizon,
            cte: self.count as f32 * 0.1,
            info: (),
        })
    }
}

/// A policy that cycles through a fixed list of samples.
#[derive(Clone, Debug)]
pub struct StubPolicy {
    samples: Vec<f32>,
    next: usize,
}

impl StubPolicy {
    /// A policy emitting `samples` in order, wrapping around.
    pub fn cycling(samples: Vec<f32>) -> Self {
        Self { samples, next: 0 }
    }
}

impl StochasticPolicy for StubPolicy {
    fn sample(&mut self, _obs: &Frame) -> Result<f32> {
        let s = self.samples[self.next % self.samples.len()];
        self.next += 1;
        Ok(s)
    }
}

/// A learner that returns a constant policy and counts its fits.
pub struct StubLearner {
    /// Number of completed fits.
    pub n_fits: usize,
    /// When set, the fit with this index fails.
    pub fail_on_fit: Option<usize>,
}

impl StubLearner {
    /// A learner that never fails.
    pub fn new() -> Self {
        Self {
            n_fits: 0,
            fail_on_fit: None,
        }
    }
}

impl Learner for StubLearner {
    type Policy = StubPolicy;

    fn fit(&mut self, _train_dir: &Path) -> Result<Self::Policy> {
        if self.fail_on_fit == Some(self.n_fits) {
            anyhow::bail!("stub learner failure");
        }
        self.n_fits += 1;
        Ok(StubPolicy::cycling(vec![0.3]))
    }

    fn save_params(&self, _policy: &Self::Policy, path: &Path) -> Result<()> {
        std::fs::write(path, b"stub")?;
        Ok(())
    }
}
