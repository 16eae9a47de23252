//! Policy.
use super::Frame;
use anyhow::Result;

/// A steering predictor that can draw independent stochastic samples.
///
/// One call draws one sample. Any mechanism yielding a distribution over
/// steering values satisfies the contract; stochastic masking over a
/// shared parameter set is the typical implementation.
pub trait StochasticPolicy {
    /// Draws one steering sample in `[-1, 1]` for the observation.
    ///
    /// Fails with [`MimicError::Shape`] if the observation shape does not
    /// match the policy's input shape.
    ///
    /// [`MimicError::Shape`]: crate::error::MimicError::Shape
    fn sample(&mut self, obs: &Frame) -> Result<f32>;
}
