//! Dataset aggregation loop.
mod config;

use crate::{
    collect_rollout, cumulative_scores,
    record::{Record, RecordValue, Recorder},
    select_queries, DatasetPool, EnsemblePolicy, Env, Evaluator, Learner, RolloutEntry,
};
use anyhow::{Context, Result};
pub use config::DaggerConfig;
use log::info;
use std::fs::File;

/// Progress variable of the iteration state machine.
///
/// The embedded index is the snapshot being produced or collected for;
/// it is the only progress state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Train snapshot 0 on the bootstrap pool.
    Init,

    /// Run snapshot `i - 1` and log per-step uncertainties.
    Collect(usize),

    /// Rank the rollout log and keep the top fraction.
    Select(usize),

    /// Append the selected examples to the pool.
    Aggregate(usize),

    /// Fit snapshot `i` on the grown pool.
    Retrain(usize),

    /// Replay and score every snapshot.
    Evaluate,

    /// Terminal state.
    Done,
}

/// The outputs of a completed run.
#[derive(Debug)]
pub struct DaggerRun<P> {
    /// One policy per snapshot index, 0 being the bootstrap fit. Always
    /// exactly K + 1 entries.
    pub snapshots: Vec<P>,

    /// One cross-track-error series per snapshot.
    pub error_series: Vec<Vec<f32>>,

    /// One cumulative score per snapshot.
    pub scores: Vec<f32>,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs dataset aggregation: a bootstrap fit, K rounds of collection,
/// query selection, aggregation and retraining, then an evaluation sweep
/// over all K + 1 snapshots.
///
/// ```mermaid
/// graph LR
///     A[Init] --> B[Collect]
///     B --> C[Select]
///     C --> D[Aggregate]
///     D --> E[Retrain]
///     E --> B
///     E --> F[Evaluate]
///     F --> G[Done]
/// ```
///
/// The pool only grows, the snapshot count is always exactly K + 1 and no
/// stage is skipped or reordered. Any stage failure aborts the whole run
/// with the failing stage in the error context; data persisted by fully
/// completed iterations is never rolled back.
pub struct Dagger<E: Env, L: Learner> {
    config: DaggerConfig,
    env_config: E::Config,
    learner: L,
}

impl<E, L> Dagger<E, L>
where
    E: Env,
    L: Learner,
    L::Policy: Clone,
{
    /// Constructs the orchestrator.
    ///
    /// The configuration is validated here, before anything runs.
    pub fn build(config: DaggerConfig, env_config: E::Config, learner: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            env_config,
            learner,
        })
    }

    /// Runs the state machine to completion.
    pub fn run(&mut self, recorder: &mut dyn Recorder) -> Result<DaggerRun<L::Policy>> {
        let k = self.config.n_iterations;
        let pool = DatasetPool::new(&self.config.train_dir)?;
        let mut snapshots: Vec<L::Policy> = Vec::with_capacity(k + 1);
        let mut log: Vec<RolloutEntry> = Vec::new();
        let mut queries: Vec<RolloutEntry> = Vec::new();
        let mut evaluation: Option<(Vec<Vec<f32>>, Vec<f32>)> = None;
        let mut stage = Stage::Init;

        while stage != Stage::Done {
            stage = match stage {
                Stage::Init => {
                    info!("Fitting snapshot 0 on the bootstrap pool");
                    let snapshot = self
                        .fit_snapshot(&pool, 0)
                        .with_context(|| abort_in(Stage::Init))?;
                    snapshots.push(snapshot);
                    if k == 0 {
                        Stage::Evaluate
                    } else {
                        Stage::Collect(1)
                    }
                }

                Stage::Collect(i) => {
                    info!("Iteration {}/{}: collecting with snapshot {}", i, k, i - 1);
                    log = self
                        .collect(&snapshots[i - 1])
                        .with_context(|| abort_in(stage))?;
                    Stage::Select(i)
                }

                Stage::Select(i) => {
                    queries = select_queries(std::mem::take(&mut log), self.config.alpha);
                    info!("Iteration {}/{}: selected {} queries", i, k, queries.len());
                    Stage::Aggregate(i)
                }

                Stage::Aggregate(i) => {
                    if self.config.save_frames {
                        let run_id = self.config.run_id_base + (i as u32 - 1);
                        pool.append(run_id, &queries)
                            .with_context(|| abort_in(stage))?;
                    }
                    queries.clear();
                    Stage::Retrain(i)
                }

                Stage::Retrain(i) => {
                    info!("Iteration {}/{}: refitting on the aggregated pool", i, k);
                    let snapshot = self
                        .fit_snapshot(&pool, i)
                        .with_context(|| abort_in(stage))?;
                    snapshots.push(snapshot);
                    if i == k {
                        Stage::Evaluate
                    } else {
                        Stage::Collect(i + 1)
                    }
                }

                Stage::Evaluate => {
                    let series = self
                        .evaluate_snapshots(&snapshots, recorder)
                        .with_context(|| abort_in(stage))?;
                    let scores = cumulative_scores(&series);
                    self.persist_artifacts(&series, &scores)
                        .with_context(|| abort_in(stage))?;
                    evaluation = Some((series, scores));
                    Stage::Done
                }

                Stage::Done => Stage::Done,
            };
        }

        let (error_series, scores) = evaluation.expect("Evaluate precedes Done");
        Ok(DaggerRun {
            snapshots,
            error_series,
            scores,
        })
    }

    /// Runs one learner-driven rollout with a fresh environment.
    fn collect(&mut self, snapshot: &L::Policy) -> Result<Vec<RolloutEntry>> {
        let mut env = E::build(&self.env_config, self.config.seed)?;
        let mut ensemble = EnsemblePolicy::new(snapshot.clone(), self.config.ensemble_size)?;
        collect_rollout(
            &mut env,
            &mut ensemble,
            self.config.timesteps,
            self.config.expert_drives,
        )
    }

    /// Fits snapshot `ix` on the pool and saves its weights if configured.
    fn fit_snapshot(&mut self, pool: &DatasetPool, ix: usize) -> Result<L::Policy> {
        pool.ensure_non_empty()?;
        let policy = self.learner.fit(pool.dir())?;
        if let Some(dir) = &self.config.model_dir {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(format!("learner_{}.weights", ix));
            self.learner.save_params(&policy, &path)?;
            info!("Saved snapshot {} in {:?}", ix, path);
        }
        Ok(policy)
    }

    /// Replays every snapshot and writes one record per snapshot.
    fn evaluate_snapshots(
        &self,
        snapshots: &[L::Policy],
        recorder: &mut dyn Recorder,
    ) -> Result<Vec<Vec<f32>>> {
        let evaluator = Evaluator::new(self.config.timesteps);
        let mut series = Vec::with_capacity(snapshots.len());

        for (ix, snapshot) in snapshots.iter().enumerate() {
            let mut env = E::build(&self.env_config, self.config.seed)?;
            let mut ensemble =
                EnsemblePolicy::new(snapshot.clone(), self.config.ensemble_size)?;
            let errors = evaluator.evaluate(&mut env, &mut ensemble)?;
            info!("Snapshot {}: replayed {} steps", ix, errors.len());
            series.push(errors);
        }

        for (ix, score) in cumulative_scores(&series).iter().enumerate() {
            recorder.write(Record::from_slice(&[
                ("snapshot", RecordValue::Scalar(ix as f32)),
                ("cumulative_cte", RecordValue::Scalar(*score)),
                ("series_len", RecordValue::Scalar(series[ix].len() as f32)),
            ]));
        }

        Ok(series)
    }

    /// Persists the evaluation outputs under the artifacts directory.
    fn persist_artifacts(&self, series: &[Vec<f32>], scores: &[f32]) -> Result<()> {
        if let Some(dir) = &self.config.artifacts_dir {
            std::fs::create_dir_all(dir)?;
            serde_json::to_writer(File::create(dir.join("cross_track_errors.json"))?, series)?;
            serde_json::to_writer(File::create(dir.join("cumulative_scores.json"))?, scores)?;
            info!("Persisted evaluation artifacts in {:?}", dir);
        }
        Ok(())
    }
}

fn abort_in(stage: Stage) -> String {
    format!("dagger run aborted in stage {:?}", stage)
}
