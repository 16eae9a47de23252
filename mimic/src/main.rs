//! Trains a steering policy by dataset aggregation on the track
//! environment and scores every snapshot.
use anyhow::Result;
use clap::Parser;
use log::info;
use mimic::bootstrap_pool;
use mimic_core::{Dagger, DaggerConfig, DatasetPool};
use mimic_ndarray_agent::{DropoutLearner, DropoutLearnerConfig};
use mimic_tensorboard::TensorboardRecorder;
use mimic_track_env::{TrackEnv, TrackEnvConfig};
use std::path::{Path, PathBuf};

/// Iteratively relabels the learner's most uncertain frames with the
/// reference action, retrains on the grown pool and compares all
/// snapshots by cumulative cross-track error.
#[derive(Debug, Parser)]
#[command(name = "dagger")]
struct Args {
    /// Learning rate.
    #[arg(long, default_value_t = 1e-3)]
    lr: f32,

    /// Number of stochastic forward passes per prediction (M).
    #[arg(long, default_value_t = 1)]
    ensemble_size: usize,

    /// Fraction of logged steps relabeled per rollout, in (0, 1].
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Number of epochs per fit.
    #[arg(long, default_value_t = 25)]
    n_epochs: usize,

    /// Minibatch size.
    #[arg(long, default_value_t = 256)]
    batch_size: usize,

    /// Number of steering classes.
    #[arg(long, default_value_t = 20)]
    n_steering_classes: usize,

    /// Number of aggregation iterations (K).
    #[arg(long, default_value_t = 5)]
    dagger_iterations: usize,

    /// Timestep budget per rollout.
    #[arg(long, default_value_t = 2000)]
    timesteps: usize,

    /// Input drop probability of the policy.
    #[arg(long, default_value_t = 0.25)]
    p_drop: f32,

    /// Experiment name; outputs land in
    /// `{results_dir}/{name}_M{M}_alpha{alpha}`.
    #[arg(long, default_value = "track")]
    experiment_name: String,

    /// Root directory for run outputs.
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Let the reference policy steer during collection.
    #[arg(long)]
    expert_drives: bool,

    /// Do not persist selected frames into the pool.
    #[arg(long)]
    no_save_frames: bool,

    /// Disable inverse-class-frequency loss weighting.
    #[arg(long)]
    no_weighted_loss: bool,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let folder = format!(
        "{}_M{}_alpha{}",
        args.experiment_name, args.ensemble_size, args.alpha
    );
    let out_dir = args.results_dir.join(folder);
    let train_dir = out_dir.join("train");

    let env_config = TrackEnvConfig::default();
    let learner_config = DropoutLearnerConfig::default()
        .in_shape([env_config.obs_height, env_config.obs_width, 3])
        .n_classes(args.n_steering_classes)
        .p_drop(args.p_drop)
        .lr(args.lr)
        .n_epochs(args.n_epochs)
        .batch_size(args.batch_size)
        .weighted_loss(!args.no_weighted_loss)
        .seed(args.seed);
    let dagger_config = DaggerConfig::default()
        .n_iterations(args.dagger_iterations)
        .ensemble_size(args.ensemble_size)
        .alpha(args.alpha)
        .timesteps(args.timesteps)
        .expert_drives(args.expert_drives)
        .save_frames(!args.no_save_frames)
        .seed(args.seed as i64)
        .train_dir(&train_dir)
        .model_dir(&out_dir)
        .artifacts_dir(&out_dir);

    let pool = DatasetPool::new(&train_dir)?;
    if pool.is_empty()? {
        info!("Pool is empty, collecting a bootstrap rollout");
        bootstrap_pool::<TrackEnv>(&pool, &env_config, args.timesteps, args.seed as i64)?;
    }

    let learner = DropoutLearner::new(learner_config);
    let mut dagger: Dagger<TrackEnv, DropoutLearner> =
        Dagger::build(dagger_config, env_config, learner)?;
    let mut recorder = TensorboardRecorder::new(out_dir.join("tb"));
    let run = dagger.run(&mut recorder)?;

    write_scores_csv(&out_dir.join("cumulative_scores.csv"), &run.scores)?;
    for (ix, score) in run.scores.iter().enumerate() {
        println!("snapshot {}: cumulative cross-track error = {:.3}", ix, score);
    }
    Ok(())
}

fn write_scores_csv(path: &Path, scores: &[f32]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&["snapshot", "cumulative_cte"])?;
    for (ix, score) in scores.iter().enumerate() {
        writer.write_record(&[ix.to_string(), score.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
