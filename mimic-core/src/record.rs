//! Types for recording run metrics.
mod base;
mod buffered_recorder;
mod null_recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;

/// Writes a record to an output destination.
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);
}
