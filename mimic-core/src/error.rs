//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
///
/// All of these are fatal for the run that raised them; there is no retry
/// or partial-result continuation.
#[derive(Error, Debug)]
pub enum MimicError {
    /// Observation shape does not match the shape a policy expects.
    #[error("observation shape mismatch: expected {expected:?}, got {actual:?}")]
    Shape {
        /// Shape the policy was built for.
        expected: [usize; 3],
        /// Shape of the offending observation.
        actual: [usize; 3],
    },

    /// The stepping interface failed or returned malformed output.
    #[error("simulator failure: {0}")]
    Simulator(String),

    /// A fit was requested against a pool with zero labeled examples.
    #[error("empty example pool: {0:?}")]
    EmptyPool(PathBuf),

    /// Configuration rejected before anything ran.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKey(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueType(String),
}
