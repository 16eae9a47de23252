//! Fitting of dropout steering policies.
use super::{steer_to_class, DropoutLearnerConfig, DropoutPolicy};
use anyhow::Result;
use log::info;
use mimic_core::{error::MimicError, DatasetPool, Learner};
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use std::path::Path;

/// Fits [`DropoutPolicy`] snapshots on an example pool with minibatch SGD
/// over a softmax cross-entropy loss.
///
/// Steering labels are discretized into the configured number of classes;
/// with `weighted_loss` each example's loss is scaled by the inverse
/// frequency of its class. Dropout stays active during training with the
/// same drop probability the produced snapshots sample with.
pub struct DropoutLearner {
    config: DropoutLearnerConfig,
    rng: SmallRng,
    n_fits: usize,
}

impl DropoutLearner {
    /// Constructs a learner.
    pub fn new(config: DropoutLearnerConfig) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            n_fits: 0,
        }
    }

    /// Loads the pool into flattened inputs and class labels.
    fn load_pool(&self, train_dir: &Path) -> Result<(Vec<Array1<f32>>, Vec<usize>)> {
        let config = &self.config;
        let pool = DatasetPool::new(train_dir)?;
        pool.ensure_non_empty()?;
        let examples = pool.examples()?;
        info!("Fitting on {} examples from {:?}", examples.len(), train_dir);

        let mut xs = Vec::with_capacity(examples.len());
        let mut ys = Vec::with_capacity(examples.len());
        for example in &examples {
            let frame = example.load_frame()?;
            if frame.shape() != config.in_shape {
                return Err(MimicError::Shape {
                    expected: config.in_shape,
                    actual: frame.shape(),
                }
                .into());
            }
            xs.push(Array1::from_iter(
                frame.data().iter().map(|v| *v as f32 / 255.0),
            ));
            ys.push(steer_to_class(example.steer, config.n_classes));
        }
        Ok((xs, ys))
    }
}

impl Learner for DropoutLearner {
    type Policy = DropoutPolicy;

    fn fit(&mut self, train_dir: &Path) -> Result<Self::Policy> {
        let config = self.config.clone();
        let in_dim: usize = config.in_shape.iter().product();
        let (xs, ys) = self.load_pool(train_dir)?;
        let weights = class_weights(&ys, config.n_classes, config.weighted_loss);

        let mut w = Array2::<f32>::zeros((config.n_classes, in_dim));
        let mut b = Array1::<f32>::zeros(config.n_classes);
        let keep = 1.0 - config.p_drop;
        let mut order: Vec<usize> = (0..xs.len()).collect();

        for epoch in 0..config.n_epochs {
            order.shuffle(&mut self.rng);
            let mut loss_sum = 0f32;

            for batch in order.chunks(config.batch_size.max(1)) {
                let mut gw = Array2::<f32>::zeros((config.n_classes, in_dim));
                let mut gb = Array1::<f32>::zeros(config.n_classes);

                for &ix in batch {
                    let x = if config.p_drop > 0.0 {
                        let rng = &mut self.rng;
                        let mask = Array1::from_iter((0..in_dim).map(|_| {
                            if rng.gen::<f32>() < keep {
                                1.0 / keep
                            } else {
                                0.0
                            }
                        }));
                        &xs[ix] * &mask
                    } else {
                        xs[ix].clone()
                    };

                    let probs = softmax(&(w.dot(&x) + &b));
                    let y = ys[ix];
                    let weight = weights[y];
                    loss_sum += -weight * probs[y].max(1e-12).ln();

                    // dL/dlogits = weight * (p - onehot(y))
                    let mut g = probs;
                    g[y] -= 1.0;
                    g *= weight;
                    gb += &g;
                    gw += &g
                        .insert_axis(Axis(1))
                        .dot(&x.insert_axis(Axis(0)));
                }

                let scale = config.lr / batch.len() as f32;
                w.scaled_add(-scale, &gw);
                b.scaled_add(-scale, &gb);
            }

            info!("epoch {}: loss = {}", epoch, loss_sum / xs.len() as f32);
        }

        self.n_fits += 1;
        Ok(DropoutPolicy::new(
            w,
            b,
            config.in_shape,
            config.n_classes,
            config.p_drop,
            // each snapshot masks with its own stream
            config.seed.wrapping_add(self.n_fits as u64),
        ))
    }

    fn save_params(&self, policy: &Self::Policy, path: &Path) -> Result<()> {
        policy.save(path)
    }
}

fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max = logits.fold(f32::MIN, |m, v| m.max(*v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Inverse-frequency class weights; uniform when `weighted` is off.
fn class_weights(ys: &[usize], n_classes: usize, weighted: bool) -> Vec<f32> {
    if !weighted {
        return vec![1.0; n_classes];
    }
    let mut counts = vec![0usize; n_classes];
    for &y in ys {
        counts[y] += 1;
    }
    let n = ys.len() as f32;
    counts
        .iter()
        .map(|&c| {
            if c == 0 {
                0.0
            } else {
                n / (n_classes as f32 * c as f32)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{Frame, RolloutEntry, StochasticPolicy};
    use ndarray::Array3;
    use tempdir::TempDir;

    fn entry(frame: Frame, t: usize, steer: f32) -> RolloutEntry {
        RolloutEntry {
            uncertainty: 0.0,
            frame,
            t,
            expert_steer: steer,
        }
    }

    fn config() -> DropoutLearnerConfig {
        DropoutLearnerConfig::default()
            .in_shape([2, 2, 3])
            .n_classes(2)
            .p_drop(0.0)
            .lr(0.5)
            .n_epochs(30)
            .batch_size(4)
            .seed(7)
    }

    #[test]
    fn test_fit_separates_bright_from_dark_frames() -> Result<()> {
        let dir = TempDir::new("learner")?;
        let pool = DatasetPool::new(dir.path())?;
        let dark = Frame::zeros(2, 2, 3);
        let bright = Frame::new(Array3::from_elem((2, 2, 3), 255));
        let entries: Vec<RolloutEntry> = (0..8)
            .map(|t| {
                if t % 2 == 0 {
                    entry(dark.clone(), t, -1.0)
                } else {
                    entry(bright.clone(), t, 1.0)
                }
            })
            .collect();
        pool.append(0, &entries)?;

        let mut learner = DropoutLearner::new(config());
        let mut policy = learner.fit(dir.path())?;
        assert_eq!(policy.sample(&dark)?, -1.0);
        assert_eq!(policy.sample(&bright)?, 1.0);
        Ok(())
    }

    #[test]
    fn test_fit_on_empty_pool_fails() {
        let dir = TempDir::new("learner").unwrap();
        let mut learner = DropoutLearner::new(config());
        let err = learner.fit(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::EmptyPool(_))
        ));
    }

    #[test]
    fn test_fit_rejects_mismatched_frames() -> Result<()> {
        let dir = TempDir::new("learner")?;
        let pool = DatasetPool::new(dir.path())?;
        pool.append(0, &[entry(Frame::zeros(4, 4, 3), 0, 0.0)])?;

        let mut learner = DropoutLearner::new(config());
        let err = learner.fit(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::Shape { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_class_weights_balance_counts() {
        // 3 examples of class 0, 1 of class 1
        let weights = class_weights(&[0, 0, 0, 1], 2, true);
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-6);
        assert!((weights[1] - 4.0 / 2.0).abs() < 1e-6);
        assert_eq!(class_weights(&[0, 0, 1], 2, false), vec![1.0, 1.0]);
    }
}
