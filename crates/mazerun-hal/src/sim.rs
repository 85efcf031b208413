//! In-process simulation drivers for CI/CD testing without a physical robot.
//!
//! [`ReplaySensor`] plays back a recorded sequence of [`SensorFrame`]s and
//! [`SimDriveBase`] records every [`WheelCommand`] it is given.  [`SimRig`]
//! assembles both so the full control loop can run headless.
//!
//! # Example
//!
//! ```rust
//! use mazerun_hal::sim::SimRig;
//! use mazerun_hal::{DriveBase, SensorSource};
//! use mazerun_types::{SensorFrame, WheelCommand};
//!
//! let (mut sensor, mut drive) = SimRig::builder()
//!     .with_repeated(SensorFrame::new(400, 20, 400), 2)
//!     .build();
//!
//! let frame = sensor.read().expect("replay must succeed");
//! drive.set_wheel_speeds(WheelCommand::straight(500)).expect("sim drive must succeed");
//! assert_eq!(frame.center, 20);
//! assert_eq!(drive.commands().len(), 1);
//! ```

use std::collections::VecDeque;

use mazerun_types::{MazeError, SensorFrame, WheelCommand};
use tracing::debug;

use crate::drive::DriveBase;
use crate::sensor::SensorSource;

// ────────────────────────────────────────────────────────────────────────────
// Replay sensor
// ────────────────────────────────────────────────────────────────────────────

/// A sensor that yields recorded frames in order.
///
/// Once the recording is exhausted it keeps returning the last frame with
/// the stop button pressed, which halts the walker cleanly. With
/// [`fault_when_exhausted`][Self::fault_when_exhausted] it reports a
/// [`MazeError::SensorFault`] instead.
pub struct ReplaySensor {
    id: String,
    frames: VecDeque<SensorFrame>,
    last: SensorFrame,
    fault_when_exhausted: bool,
}

impl ReplaySensor {
    pub fn new(id: impl Into<String>, frames: impl IntoIterator<Item = SensorFrame>) -> Self {
        Self {
            id: id.into(),
            frames: frames.into_iter().collect(),
            last: SensorFrame::default(),
            fault_when_exhausted: false,
        }
    }

    /// Report a sensor fault instead of a stop request once the recording
    /// runs out.
    pub fn fault_when_exhausted(mut self) -> Self {
        self.fault_when_exhausted = true;
        self
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl SensorSource for ReplaySensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&mut self) -> Result<SensorFrame, MazeError> {
        match self.frames.pop_front() {
            Some(frame) => {
                self.last = frame;
                Ok(frame)
            }
            None if self.fault_when_exhausted => Err(MazeError::SensorFault {
                component: self.id.clone(),
                details: "replay exhausted".to_string(),
            }),
            None => {
                debug!(sensor = %self.id, "replay exhausted; pressing stop");
                Ok(self.last.with_stop())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recording drive base
// ────────────────────────────────────────────────────────────────────────────

/// A simulated drive base that records every command it receives.
pub struct SimDriveBase {
    id: String,
    commands: Vec<WheelCommand>,
    fail_after: Option<usize>,
}

impl SimDriveBase {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            commands: Vec::new(),
            fail_after: None,
        }
    }

    /// Accept `count` commands, then fail every non-stop command with
    /// [`MazeError::ActuatorFault`].  Stop commands keep succeeding so the
    /// safety stop can still be observed.
    pub fn with_fault_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Every command applied so far, oldest first.
    pub fn commands(&self) -> &[WheelCommand] {
        &self.commands
    }
}

impl DriveBase for SimDriveBase {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_wheel_speeds(&mut self, command: WheelCommand) -> Result<(), MazeError> {
        if let Some(limit) = self.fail_after
            && self.commands.len() >= limit
            && !command.is_stopped()
        {
            return Err(MazeError::ActuatorFault {
                component: self.id.clone(),
                details: format!("injected fault after {limit} commands"),
            });
        }
        self.commands.push(command);
        Ok(())
    }

    fn last_command(&self) -> WheelCommand {
        self.commands.last().copied().unwrap_or_default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder for a matched [`ReplaySensor`] / [`SimDriveBase`] pair.
#[derive(Default)]
pub struct SimRig {
    frames: Vec<SensorFrame>,
}

impl SimRig {
    /// Create an empty builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Append recorded frames.
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = SensorFrame>) -> Self {
        self.frames.extend(frames);
        self
    }

    /// Append `count` copies of `frame`.
    pub fn with_repeated(mut self, frame: SensorFrame, count: usize) -> Self {
        self.frames.extend(std::iter::repeat_n(frame, count));
        self
    }

    /// Consume the builder and return the sensor and drive base.
    pub fn build(self) -> (ReplaySensor, SimDriveBase) {
        (
            ReplaySensor::new("sim_prox", self.frames),
            SimDriveBase::new("sim_drive"),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
