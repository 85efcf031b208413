//! Generic `DriveBase` trait for two-wheeled differential-drive robots.
//!
//! The walker only ever produces [`WheelCommand`]s; drivers implement this
//! trait so the navigation core never touches a serial link or motor
//! controller directly.

use mazerun_types::{MazeError, WheelCommand};

/// A differential-drive base with independently commanded left and right
/// wheels.
pub trait DriveBase: Send {
    /// Stable identifier for this drive base, e.g. `"thymio_motors"`.
    fn id(&self) -> &str;

    /// Apply `command` to both wheels.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::ActuatorFault`] if the command cannot be written.
    /// Callers do not retry.
    fn set_wheel_speeds(&mut self, command: WheelCommand) -> Result<(), MazeError>;

    /// The most recently applied command.
    fn last_command(&self) -> WheelCommand;

    /// Command both wheels to zero.
    fn stop(&mut self) -> Result<(), MazeError> {
        self.set_wheel_speeds(WheelCommand::STOP)
    }
}
