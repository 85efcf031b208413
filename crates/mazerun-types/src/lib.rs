use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

bitflags! {
    /// Zero or more travel directions relative to the robot's current heading.
    ///
    /// Used both for the set of options visible at an intersection and for a
    /// single chosen action. `STOP` is the empty set and is never combined
    /// with another flag.
    ///
    /// ```
    /// use mazerun_types::Direction;
    ///
    /// let offered = Direction::STRAIGHT | Direction::RIGHT;
    /// assert!(offered.contains(Direction::RIGHT));
    /// assert_eq!(offered.difference(Direction::STRAIGHT), Direction::RIGHT);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Direction: u8 {
        const STOP = 0;
        const STRAIGHT = 1 << 0;
        const LEFT = 1 << 1;
        const RIGHT = 1 << 2;
        const U_TURN = 1 << 3;
    }
}

impl Direction {
    /// Build the set of directions visible from three opening flags.
    ///
    /// `U_TURN` is always present: turning around is structurally available
    /// at every intersection and dead end.
    pub fn from_openings(left: bool, right: bool, front: bool) -> Self {
        let mut dirs = Direction::U_TURN;
        if left {
            dirs |= Direction::LEFT;
        }
        if right {
            dirs |= Direction::RIGHT;
        }
        if front {
            dirs |= Direction::STRAIGHT;
        }
        dirs
    }

    /// `true` for the empty set.
    pub fn is_stop(self) -> bool {
        self.is_empty()
    }

    /// `true` when exactly one flag is set.
    pub fn is_single(self) -> bool {
        self.bits().count_ones() == 1
    }

    /// `true` for a single timed turn: `LEFT`, `RIGHT` or `U_TURN`.
    pub fn is_maneuver(self) -> bool {
        self.is_single() && !self.contains(Direction::STRAIGHT)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "STOP");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        Ok(())
    }
}

/// Integer cell coordinate in a maze grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One control-period sample from the robot.
///
/// Proximity values are unitless reflected-light magnitudes: larger means
/// closer to an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Front-left diagonal proximity.
    pub left: i32,
    /// Front-center proximity.
    pub center: i32,
    /// Front-right diagonal proximity.
    pub right: i32,
    /// Emergency-stop button state.
    #[serde(default)]
    pub stop_requested: bool,
}

impl SensorFrame {
    pub const fn new(left: i32, center: i32, right: i32) -> Self {
        Self {
            left,
            center,
            right,
            stop_requested: false,
        }
    }

    /// Same readings with the stop button pressed.
    pub const fn with_stop(mut self) -> Self {
        self.stop_requested = true;
        self
    }
}

/// Signed speed targets for the two wheels of a differential-drive base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WheelCommand {
    pub left: i32,
    pub right: i32,
}

impl WheelCommand {
    /// Both wheels at zero.
    pub const STOP: WheelCommand = WheelCommand { left: 0, right: 0 };

    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// Both wheels at `speed`.
    pub const fn straight(speed: i32) -> Self {
        Self {
            left: speed,
            right: speed,
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self == Self::STOP
    }
}

/// Error type shared by path compilation, planning, decision policies and
/// the hardware collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Script mismatch: instruction {index} ({instruction}) is not offered in {{{offered}}}")]
    ScriptMismatch {
        index: usize,
        instruction: Direction,
        offered: Direction,
    },

    #[error("Sensor Fault on {component}: {details}")]
    SensorFault { component: String, details: String },

    #[error("Actuator Fault on {component}: {details}")]
    ActuatorFault { component: String, details: String },

    #[error("No path from {start} to {end}")]
    NoPath { start: GridPoint, end: GridPoint },

    #[error("Invalid maze: {0}")]
    InvalidMaze(String),
}

impl MazeError {
    /// Collaborator I/O failures end the run; everything else is reported to
    /// the caller of the failing operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MazeError::SensorFault { .. } | MazeError::ActuatorFault { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_is_the_empty_set() {
        assert!(Direction::STOP.is_stop());
        assert_eq!(Direction::STOP, Direction::empty());
        assert!(!Direction::STOP.is_single());
    }

    #[test]
    fn union_membership_and_difference() {
        let dirs = Direction::LEFT | Direction::STRAIGHT | Direction::U_TURN;
        assert!(dirs.contains(Direction::LEFT));
        assert!(!dirs.contains(Direction::RIGHT));

        let trimmed = dirs.difference(Direction::STRAIGHT);
        assert!(!trimmed.contains(Direction::STRAIGHT));
        assert!(trimmed.contains(Direction::LEFT));
        // Removing an absent flag is a no-op.
        assert_eq!(trimmed.difference(Direction::RIGHT), trimmed);
    }

    #[test]
    fn from_openings_always_offers_u_turn() {
        assert_eq!(Direction::from_openings(false, false, false), Direction::U_TURN);
        assert_eq!(
            Direction::from_openings(true, true, true),
            Direction::all()
        );
        assert_eq!(
            Direction::from_openings(false, true, false),
            Direction::RIGHT | Direction::U_TURN
        );
    }

    #[test]
    fn maneuver_classification() {
        assert!(Direction::LEFT.is_maneuver());
        assert!(Direction::RIGHT.is_maneuver());
        assert!(Direction::U_TURN.is_maneuver());
        assert!(!Direction::STRAIGHT.is_maneuver());
        assert!(!Direction::STOP.is_maneuver());
        assert!(!(Direction::LEFT | Direction::RIGHT).is_maneuver());
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::STOP.to_string(), "STOP");
        assert_eq!(Direction::RIGHT.to_string(), "RIGHT");
        assert_eq!(
            (Direction::STRAIGHT | Direction::RIGHT).to_string(),
            "STRAIGHT | RIGHT"
        );
    }

    #[test]
    fn sensor_frame_roundtrip_defaults_stop_flag() {
        let frame: SensorFrame =
            serde_json::from_str(r#"{"left": 120, "center": 40, "right": 90}"#).unwrap();
        assert_eq!(frame, SensorFrame::new(120, 40, 90));
        assert!(!frame.stop_requested);

        let json = serde_json::to_string(&frame.with_stop()).unwrap();
        let back: SensorFrame = serde_json::from_str(&json).unwrap();
        assert!(back.stop_requested);
    }

    #[test]
    fn wheel_command_helpers() {
        assert!(WheelCommand::STOP.is_stopped());
        assert_eq!(WheelCommand::straight(500), WheelCommand::new(500, 500));
        assert!(!WheelCommand::straight(1).is_stopped());
    }

    #[test]
    fn maze_error_display_and_fatality() {
        let err = MazeError::ScriptMismatch {
            index: 2,
            instruction: Direction::LEFT,
            offered: Direction::RIGHT | Direction::U_TURN,
        };
        assert!(err.to_string().contains("instruction 2 (LEFT)"));
        assert!(err.to_string().contains("{RIGHT | U_TURN}"));
        assert!(!err.is_fatal());

        let fault = MazeError::SensorFault {
            component: "proximity".to_string(),
            details: "serial link closed".to_string(),
        };
        assert!(fault.to_string().contains("proximity"));
        assert!(fault.is_fatal());

        let no_path = MazeError::NoPath {
            start: GridPoint::new(7, 0),
            end: GridPoint::new(1, 6),
        };
        assert_eq!(no_path.to_string(), "No path from (7, 0) to (1, 6)");
    }
}
