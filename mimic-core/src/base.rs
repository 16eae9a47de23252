//! Core abstractions.
mod act;
mod env;
mod learner;
mod obs;
mod policy;
pub use act::DriveAction;
pub use env::{Env, Info, Step};
pub use learner::Learner;
pub use obs::Frame;
pub use policy::StochasticPolicy;
