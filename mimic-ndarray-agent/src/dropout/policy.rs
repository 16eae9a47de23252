//! Dropout steering policy.
use anyhow::Result;
use mimic_core::{error::MimicError, Frame, StochasticPolicy};
use ndarray::{Array1, Array2};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Maps a steering class to the center of its bin in `[-1, 1]`.
pub fn class_to_steer(class: usize, n_classes: usize) -> f32 {
    if n_classes <= 1 {
        0.0
    } else {
        -1.0 + 2.0 * class as f32 / (n_classes - 1) as f32
    }
}

/// Maps a steering value in `[-1, 1]` to the nearest class.
pub fn steer_to_class(steer: f32, n_classes: usize) -> usize {
    if n_classes <= 1 {
        return 0;
    }
    let class = ((steer.clamp(-1.0, 1.0) + 1.0) / 2.0 * (n_classes - 1) as f32).round() as usize;
    class.min(n_classes - 1)
}

/// On-disk form of the trained parameters.
#[derive(Debug, Deserialize, Serialize)]
struct Params {
    w: Vec<f32>,
    b: Vec<f32>,
    in_shape: [usize; 3],
    n_classes: usize,
    p_drop: f32,
}

/// A linear softmax steering classifier with stochastic input masking.
///
/// Each [`sample`] draws a fresh inverted-dropout mask over the flattened,
/// `/255`-scaled input before the forward pass, so repeated samples from
/// one frame disagree where the shared parameters are uncertain. With
/// `p_drop == 0` sampling is deterministic. The predicted class is the
/// argmax of the masked logits, converted back to a continuous steering
/// value.
///
/// [`sample`]: StochasticPolicy::sample
#[derive(Clone, Debug)]
pub struct DropoutPolicy {
    w: Array2<f32>,
    b: Array1<f32>,
    in_shape: [usize; 3],
    n_classes: usize,
    p_drop: f32,
    rng: SmallRng,
}

impl DropoutPolicy {
    pub(crate) fn new(
        w: Array2<f32>,
        b: Array1<f32>,
        in_shape: [usize; 3],
        n_classes: usize,
        p_drop: f32,
        seed: u64,
    ) -> Self {
        Self {
            w,
            b,
            in_shape,
            n_classes,
            p_drop,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Number of steering classes.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Expected observation shape.
    pub fn in_shape(&self) -> [usize; 3] {
        self.in_shape
    }

    /// Flattens a frame into the scaled input vector, checking its shape.
    pub(crate) fn input(&self, obs: &Frame) -> Result<Array1<f32>> {
        if obs.shape() != self.in_shape {
            return Err(MimicError::Shape {
                expected: self.in_shape,
                actual: obs.shape(),
            }
            .into());
        }
        Ok(Array1::from_iter(
            obs.data().iter().map(|v| *v as f32 / 255.0),
        ))
    }

    /// Draws a fresh inverted-dropout mask over the input units.
    fn mask(&mut self) -> Array1<f32> {
        let in_dim = self.w.ncols();
        if self.p_drop <= 0.0 {
            return Array1::ones(in_dim);
        }
        let keep = 1.0 - self.p_drop;
        let rng = &mut self.rng;
        Array1::from_iter((0..in_dim).map(|_| {
            if rng.gen::<f32>() < keep {
                1.0 / keep
            } else {
                0.0
            }
        }))
    }

    fn logits(&self, x: &Array1<f32>) -> Array1<f32> {
        self.w.dot(x) + &self.b
    }

    /// Saves the trained parameters at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = Params {
            w: self.w.iter().cloned().collect(),
            b: self.b.to_vec(),
            in_shape: self.in_shape,
            n_classes: self.n_classes,
            p_drop: self.p_drop,
        };
        let file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(file, &params)?;
        Ok(())
    }

    /// Loads parameters written by [`DropoutPolicy::save`].
    pub fn load(path: impl AsRef<Path>, seed: u64) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        let params: Params = bincode::deserialize_from(file)?;
        let in_dim: usize = params.in_shape.iter().product();
        let w = Array2::from_shape_vec((params.n_classes, in_dim), params.w)?;
        let b = Array1::from(params.b);
        Ok(Self::new(
            w,
            b,
            params.in_shape,
            params.n_classes,
            params.p_drop,
            seed,
        ))
    }
}

impl StochasticPolicy for DropoutPolicy {
    fn sample(&mut self, obs: &Frame) -> Result<f32> {
        let x = self.input(obs)?;
        let x = x * self.mask();
        let logits = self.logits(&x);
        Ok(class_to_steer(argmax(&logits), self.n_classes))
    }
}

fn argmax(v: &Array1<f32>) -> usize {
    let mut best = 0;
    for (i, x) in v.iter().enumerate() {
        if *x > v[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_class_steer_mapping() {
        assert_eq!(class_to_steer(0, 20), -1.0);
        assert_eq!(class_to_steer(19, 20), 1.0);
        assert_eq!(class_to_steer(10, 21), 0.0);
        assert_eq!(class_to_steer(0, 1), 0.0);

        assert_eq!(steer_to_class(-1.0, 20), 0);
        assert_eq!(steer_to_class(1.0, 20), 19);
        assert_eq!(steer_to_class(0.0, 21), 10);
        // out-of-range values clamp into the valid bins
        assert_eq!(steer_to_class(-3.0, 20), 0);
        assert_eq!(steer_to_class(3.0, 20), 19);
    }

    #[test]
    fn test_mapping_roundtrip() {
        for n_classes in [2, 5, 20] {
            for class in 0..n_classes {
                assert_eq!(steer_to_class(class_to_steer(class, n_classes), n_classes), class);
            }
        }
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mut policy = DropoutPolicy::new(
            Array2::zeros((3, 12)),
            Array1::zeros(3),
            [2, 2, 3],
            3,
            0.0,
            0,
        );
        let err = policy.sample(&Frame::zeros(4, 4, 3)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::Shape { .. })
        ));
    }

    #[test]
    fn test_deterministic_without_dropout() -> Result<()> {
        let mut w = Array2::zeros((3, 12));
        w[[2, 0]] = 1.0;
        let mut policy = DropoutPolicy::new(w, Array1::zeros(3), [2, 2, 3], 3, 0.0, 0);
        let frame = Frame::zeros(2, 2, 3);
        let first = policy.sample(&frame)?;
        let second = policy.sample(&frame)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_save_load_roundtrip() -> Result<()> {
        let dir = TempDir::new("dropout")?;
        let path = dir.path().join("learner_0.weights");
        let w = Array2::from_shape_fn((3, 12), |(i, j)| (i * 12 + j) as f32 * 0.01);
        let b = Array1::from(vec![0.1, -0.2, 0.3]);
        let policy = DropoutPolicy::new(w, b, [2, 2, 3], 3, 0.0, 0);
        policy.save(&path)?;

        let mut restored = DropoutPolicy::load(&path, 0)?;
        let mut original = policy.clone();
        let frame = Frame::zeros(2, 2, 3);
        assert_eq!(original.sample(&frame)?, restored.sample(&frame)?);
        assert_eq!(restored.n_classes(), 3);
        assert_eq!(restored.in_shape(), [2, 2, 3]);
        Ok(())
    }
}
