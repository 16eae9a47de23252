//! Driving action.

/// A driving command: steering, throttle and brake.
///
/// The learner only ever predicts steering; throttle and brake are copied
/// from the reference action at every step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveAction {
    /// Steering in `[-1, 1]`.
    pub steer: f32,

    /// Throttle in `[0, 1]`.
    pub throttle: f32,

    /// Brake in `[0, 1]`.
    pub brake: f32,
}

impl DriveAction {
    /// A zeroed command.
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Returns the command with each channel clamped to its valid range.
    pub fn clamped(self) -> Self {
        Self {
            steer: self.steer.clamp(-1.0, 1.0),
            throttle: self.throttle.clamp(0.0, 1.0),
            brake: self.brake.clamp(0.0, 1.0),
        }
    }
}
