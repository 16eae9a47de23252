//! Rollout collection.
use crate::{DriveAction, EnsemblePolicy, Env, Frame, StochasticPolicy};
use anyhow::Result;
use log::trace;

/// One logged step of a learner-driven rollout.
///
/// Entries exist only between collection and query selection; selected
/// entries are persisted as labeled examples, the rest are dropped.
#[derive(Clone, Debug)]
pub struct RolloutEntry {
    /// Ensemble disagreement for this observation. Comparable only within
    /// one rollout.
    pub uncertainty: f32,

    /// The raw observation.
    pub frame: Frame,

    /// Timestep index within the rollout.
    pub t: usize,

    /// Reference steering, kept for relabeling.
    pub expert_steer: f32,
}

/// Drives `env` with the ensemble for up to `timesteps` steps and logs one
/// entry per learner-driven step.
///
/// Throttle and brake are copied verbatim from the reference action at
/// every step, regardless of who steers. With `expert_drives` the
/// reference steering is used directly and nothing is logged. The rollout
/// stops early when the environment reports termination; the terminating
/// step is not logged. Every learner-driven step is logged regardless of
/// the query fraction in use; selection happens afterwards.
pub fn collect_rollout<E, P>(
    env: &mut E,
    ensemble: &mut EnsemblePolicy<P>,
    timesteps: usize,
    expert_drives: bool,
) -> Result<Vec<RolloutEntry>>
where
    E: Env,
    P: StochasticPolicy,
{
    env.reset()?;
    let mut act = DriveAction::zeros();
    let mut log = Vec::new();

    for t in 0..timesteps {
        env.render();
        let step = env.step(&act)?;
        if step.done {
            break;
        }

        let expert = step.expert;
        if expert_drives {
            act.steer = expert.steer;
        } else {
            let (steer, uncertainty) = ensemble.predict(&step.obs)?;
            act.steer = steer;
            trace!("t = {}, uncertainty = {}", t, uncertainty);
            log.push(RolloutEntry {
                uncertainty,
                frame: step.obs,
                t,
                expert_steer: expert.steer,
            });
        }
        act.throttle = expert.throttle;
        act.brake = expert.brake;
    }

    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubEnv, StubEnvConfig, StubPolicy};

    fn ensemble() -> EnsemblePolicy<StubPolicy> {
        EnsemblePolicy::new(StubPolicy::cycling(vec![0.1, -0.1]), 2).unwrap()
    }

    #[test]
    fn test_log_respects_timestep_budget() -> Result<()> {
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 100 }, 0)?;
        let log = collect_rollout(&mut env, &mut ensemble(), 5, false)?;
        assert_eq!(log.len(), 5);
        assert_eq!(log.last().unwrap().t, 4);
        Ok(())
    }

    #[test]
    fn test_log_stops_at_termination() -> Result<()> {
        // done is first reported on the 10th step, so 9 entries are logged
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 10 }, 0)?;
        let log = collect_rollout(&mut env, &mut ensemble(), 100, false)?;
        assert_eq!(log.len(), 9);
        Ok(())
    }

    #[test]
    fn test_expert_drives_logs_nothing() -> Result<()> {
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 10 }, 0)?;
        let log = collect_rollout(&mut env, &mut ensemble(), 100, true)?;
        assert!(log.is_empty());
        Ok(())
    }

    #[test]
    fn test_throttle_and_brake_follow_the_reference() -> Result<()> {
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 10 }, 0)?;
        collect_rollout(&mut env, &mut ensemble(), 100, false)?;
        // the first action is zeroed, every later one carries the
        // reference throttle/brake while the learner steers
        let received = env.received.clone();
        assert_eq!(received[0], DriveAction::zeros());
        for act in &received[1..] {
            assert_eq!(act.throttle, StubEnv::EXPERT.throttle);
            assert_eq!(act.brake, StubEnv::EXPERT.brake);
            assert_ne!(act.steer, StubEnv::EXPERT.steer);
        }
        Ok(())
    }

    #[test]
    fn test_reference_steer_is_kept_for_relabeling() -> Result<()> {
        let mut env = StubEnv::build(&StubEnvConfig { horizon: 10 }, 0)?;
        let log = collect_rollout(&mut env, &mut ensemble(), 100, false)?;
        for entry in &log {
            assert_eq!(entry.expert_steer, StubEnv::EXPERT.steer);
        }
        Ok(())
    }
}
