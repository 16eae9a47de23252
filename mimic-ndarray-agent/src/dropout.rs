//! Dropout-masked steering classifier and its learner.
mod config;
mod learner;
mod policy;

pub use config::DropoutLearnerConfig;
pub use learner::DropoutLearner;
pub use policy::{class_to_steer, steer_to_class, DropoutPolicy};
