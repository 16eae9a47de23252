//! Uncertainty-aware ensemble prediction.
use crate::{error::MimicError, Frame, StochasticPolicy};
use anyhow::Result;

/// Turns M independent samples of a stochastic policy into a steering
/// estimate with an uncertainty score.
///
/// All M samples run against one shared parameter set; only the stochastic
/// masking differs between them. The samples are independent of each other
/// and their order never affects the result.
pub struct EnsemblePolicy<P> {
    policy: P,
    m: usize,
}

impl<P: StochasticPolicy> EnsemblePolicy<P> {
    /// Wraps `policy` into an ensemble of size `m`.
    ///
    /// `m` must be at least 1.
    pub fn new(policy: P, m: usize) -> Result<Self> {
        if m < 1 {
            return Err(MimicError::InvalidConfig(format!(
                "ensemble size must be at least 1, got {}",
                m
            ))
            .into());
        }
        Ok(Self { policy, m })
    }

    /// Ensemble size.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Returns the wrapped policy.
    pub fn into_inner(self) -> P {
        self.policy
    }

    /// Predicts a steering estimate and an uncertainty score.
    ///
    /// The estimate is the mean of the M samples, the score their
    /// population variance. With `m == 1` the score is a fixed `0.0` and
    /// the wrapped policy acts as a single predictor; that configuration
    /// carries no confidence information but is legal.
    pub fn predict(&mut self, obs: &Frame) -> Result<(f32, f32)> {
        let mut samples = Vec::with_capacity(self.m);
        for _ in 0..self.m {
            samples.push(self.policy.sample(obs)?);
        }
        let mean = samples.iter().sum::<f32>() / self.m as f32;
        let variance = match self.m {
            1 => 0.0,
            m => samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f32>() / m as f32,
        };
        Ok((mean, variance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubPolicy;
    use crate::Frame;

    #[test]
    fn test_mean_and_variance() -> Result<()> {
        let policy = StubPolicy::cycling(vec![0.0, 1.0]);
        let mut ensemble = EnsemblePolicy::new(policy, 2)?;
        let (mean, var) = ensemble.predict(&Frame::zeros(2, 2, 3))?;
        assert!((mean - 0.5).abs() < 1e-6);
        assert!((var - 0.25).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_single_member_has_zero_uncertainty() -> Result<()> {
        let policy = StubPolicy::cycling(vec![0.7]);
        let mut ensemble = EnsemblePolicy::new(policy, 1)?;
        let (mean, var) = ensemble.predict(&Frame::zeros(2, 2, 3))?;
        assert_eq!(mean, 0.7);
        assert_eq!(var, 0.0);
        Ok(())
    }

    #[test]
    fn test_zero_members_rejected() {
        let policy = StubPolicy::cycling(vec![0.0]);
        assert!(EnsemblePolicy::new(policy, 0).is_err());
    }
}
