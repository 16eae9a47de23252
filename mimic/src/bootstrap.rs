//! Bootstrap collection for an empty pool.
use anyhow::Result;
use log::info;
use mimic_core::{DatasetPool, DriveAction, Env, RolloutEntry};

/// Fills a pool with one reference-driven rollout.
///
/// The reference policy steers and every frame is labeled with its
/// steering. The examples are written under run id 0, below the run ids
/// any aggregation run uses, so bootstrap data never collides with
/// relabeled data.
pub fn bootstrap_pool<E: Env>(
    pool: &DatasetPool,
    env_config: &E::Config,
    timesteps: usize,
    seed: i64,
) -> Result<usize> {
    let mut env = E::build(env_config, seed)?;
    env.reset()?;
    let mut act = DriveAction::zeros();
    let mut entries = Vec::new();

    for t in 0..timesteps {
        let step = env.step(&act)?;
        if step.done {
            break;
        }
        let expert = step.expert;
        act = expert;
        entries.push(RolloutEntry {
            uncertainty: 0.0,
            frame: step.obs,
            t,
            expert_steer: expert.steer,
        });
    }

    info!("Collected {} bootstrap examples", entries.len());
    pool.append(0, &entries)
}
