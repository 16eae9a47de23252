//! Snapshot evaluation.
use crate::{DriveAction, EnsemblePolicy, Env, StochasticPolicy};
use anyhow::Result;

/// Replays policy snapshots and records their tracking error.
pub struct Evaluator {
    timesteps: usize,
}

impl Evaluator {
    /// Constructs an evaluator with a timestep budget per replay.
    pub fn new(timesteps: usize) -> Self {
        Self { timesteps }
    }

    /// Replays one snapshot and returns its signed cross-track-error
    /// series.
    ///
    /// The snapshot drives steering through the ensemble mean; throttle
    /// and brake come from the reference action. The series holds one
    /// value per simulated step, the terminating step included, and is
    /// shorter than the budget when the episode ends early. Replaying a
    /// deterministic environment and policy twice yields identical
    /// series.
    pub fn evaluate<E, P>(
        &self,
        env: &mut E,
        ensemble: &mut EnsemblePolicy<P>,
    ) -> Result<Vec<f32>>
    where
        E: Env,
        P: StochasticPolicy,
    {
        env.reset()?;
        let mut act = DriveAction::zeros();
        let mut errors = Vec::new();

        for _ in 0..self.timesteps {
            env.render();
            let step = env.step(&act)?;
            errors.push(step.cte);
            if step.done {
                break;
            }
            let (steer, _) = ensemble.predict(&step.obs)?;
            act.steer = steer;
            act.throttle = step.expert.throttle;
            act.brake = step.expert.brake;
        }

        Ok(errors)
    }
}

/// Length-normalized cumulative scores for a set of error series.
///
/// With `max_len` the longest series in the list, each score is the sum of
/// absolute per-step errors plus `|last| * (max_len - len)`: a run that
/// ended early keeps accruing its final error for the remaining steps.
/// Scores are comparable across series of unequal length; an empty series
/// scores zero.
pub fn cumulative_scores(series_list: &[Vec<f32>]) -> Vec<f32> {
    let max_len = series_list.iter().map(|s| s.len()).max().unwrap_or(0);
    series_list
        .iter()
        .map(|errors| match errors.last() {
            None => 0.0,
            Some(last) => {
                let sum: f32 = errors.iter().map(|e| e.abs()).sum();
                sum + last.abs() * (max_len - errors.len()) as f32
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubEnv, StubEnvConfig, StubPolicy};

    fn ensemble() -> EnsemblePolicy<StubPolicy> {
        EnsemblePolicy::new(StubPolicy::cycling(vec![0.2]), 1).unwrap()
    }

    #[test]
    fn test_padding_rule() {
        let scores = cumulative_scores(&[vec![1.0, -2.0, 3.0], vec![1.0, 1.0, 1.0, 1.0, 1.0]]);
        // max_len = 5: the short series accrues |3| for its 2 missing steps
        assert_eq!(scores, vec![12.0, 5.0]);
    }

    #[test]
    fn test_scores_of_empty_input() {
        assert!(cumulative_scores(&[]).is_empty());
        assert_eq!(cumulative_scores(&[vec![], vec![2.0]]), vec![0.0, 2.0]);
    }

    #[test]
    fn test_series_includes_the_terminating_step() -> Result<()> {
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 10 }, 0)?;
        let series = Evaluator::new(100).evaluate(&mut env, &mut ensemble())?;
        assert_eq!(series.len(), 10);
        Ok(())
    }

    #[test]
    fn test_series_respects_timestep_budget() -> Result<()> {
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 1000 }, 0)?;
        let series = Evaluator::new(7).evaluate(&mut env, &mut ensemble())?;
        assert_eq!(series.len(), 7);
        Ok(())
    }

    #[test]
    fn test_evaluation_is_idempotent() -> Result<()> {
        let evaluator = Evaluator::new(50);
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 10 }, 0)?;
        let first = evaluator.evaluate(&mut env, &mut ensemble())?;
        let second = evaluator.evaluate(&mut env, &mut ensemble())?;
        assert_eq!(first, second);
        Ok(())
    }
}
