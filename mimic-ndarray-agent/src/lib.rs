#![warn(missing_docs)]
//! Steering policies for mimic without a neural-network backend.
//!
//! The crate provides a linear softmax steering classifier whose
//! stochastic behavior comes from input masking, together with the
//! minibatch SGD learner that fits it against an example pool.
mod dropout;
pub use dropout::{
    class_to_steer, steer_to_class, DropoutLearner, DropoutLearnerConfig, DropoutPolicy,
};
