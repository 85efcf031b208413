//! Platform calibration for the walker.
//!
//! Every value here was tuned against one robot in one maze.  Proximity
//! thresholds depend on sensor placement and wall material, speeds and the
//! quarter-turn time on the motors and floor, so recalibrate per platform.

use std::time::Duration;

use mazerun_types::{Direction, WheelCommand};
use serde::{Deserialize, Serialize};

/// Thresholds, speeds and turn timing consumed by the
/// [`Walker`][crate::walker::Walker].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkerCalibration {
    /// Wheel speed while following a corridor.
    #[serde(default = "default_cruise_speed")]
    pub cruise_speed: i32,

    /// Wheel speed magnitude during an in-place turn.
    #[serde(default = "default_turn_speed")]
    pub turn_speed: i32,

    /// Left/right difference above which the walker steers back to the
    /// corridor centre.
    #[serde(default = "default_deadband")]
    pub deadband: i32,

    /// Left/right difference is divided by this to get the wheel correction.
    #[serde(default = "default_correction_divisor")]
    pub correction_divisor: i32,

    /// Readings below this mean there is no wall in that direction.
    #[serde(default = "default_opening_threshold")]
    pub opening_threshold: i32,

    /// A side reading above this means the wall beyond a side opening is
    /// visible again, i.e. the robot is centred on the intersection.
    #[serde(default = "default_on_intersection_threshold")]
    pub on_intersection_threshold: i32,

    /// A center reading above this means the robot is as close to the wall
    /// ahead as it should get.  Higher than the side thresholds because the
    /// center sensor is more sensitive.
    #[serde(default = "default_front_space_threshold")]
    pub front_space_threshold: i32,

    /// Time for a 90° in-place turn at `turn_speed`, in milliseconds.
    #[serde(default = "default_quarter_turn_ms")]
    pub quarter_turn_ms: u64,
}

fn default_cruise_speed() -> i32 {
    500
}
fn default_turn_speed() -> i32 {
    100
}
fn default_deadband() -> i32 {
    75
}
fn default_correction_divisor() -> i32 {
    50
}
fn default_opening_threshold() -> i32 {
    100
}
fn default_on_intersection_threshold() -> i32 {
    2000
}
fn default_front_space_threshold() -> i32 {
    2650
}
fn default_quarter_turn_ms() -> u64 {
    2169
}

impl Default for WalkerCalibration {
    fn default() -> Self {
        Self {
            cruise_speed: default_cruise_speed(),
            turn_speed: default_turn_speed(),
            deadband: default_deadband(),
            correction_divisor: default_correction_divisor(),
            opening_threshold: default_opening_threshold(),
            on_intersection_threshold: default_on_intersection_threshold(),
            front_space_threshold: default_front_space_threshold(),
            quarter_turn_ms: default_quarter_turn_ms(),
        }
    }
}

/// An open-loop timed turn: hold `command` until `duration` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Maneuver {
    pub command: WheelCommand,
    pub duration: Duration,
}

impl WalkerCalibration {
    pub fn quarter_turn(&self) -> Duration {
        Duration::from_millis(self.quarter_turn_ms)
    }

    /// Both wheels at cruise speed.
    pub fn cruise(&self) -> WheelCommand {
        WheelCommand::straight(self.cruise_speed)
    }

    /// Wheel correction for a left-minus-right proximity difference.
    /// Positive when the left wall is closer, which speeds up the left wheel
    /// and steers right.  Exact halves round to the even neighbour.
    pub fn correction(&self, diff: i32) -> i32 {
        if self.correction_divisor == 0 {
            return 0;
        }
        (f64::from(diff) / f64::from(self.correction_divisor)).round_ties_even() as i32
    }

    /// Maneuver table.  `None` for anything that is not a single turn.
    pub fn maneuver(&self, direction: Direction) -> Option<Maneuver> {
        let v = self.turn_speed;
        let quarter = self.quarter_turn();
        let (command, duration) = if direction == Direction::LEFT {
            (WheelCommand::new(-v, v), quarter)
        } else if direction == Direction::RIGHT {
            (WheelCommand::new(v, -v), quarter)
        } else if direction == Direction::U_TURN {
            (WheelCommand::new(v, -v), quarter * 2)
        } else {
            return None;
        };
        Some(Maneuver { command, duration })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maneuver_table() {
        let cal = WalkerCalibration::default();
        let t90 = cal.quarter_turn();

        let left = cal.maneuver(Direction::LEFT).unwrap();
        assert_eq!(left.command, WheelCommand::new(-100, 100));
        assert_eq!(left.duration, t90);

        let right = cal.maneuver(Direction::RIGHT).unwrap();
        assert_eq!(right.command, WheelCommand::new(100, -100));
        assert_eq!(right.duration, t90);

        let back = cal.maneuver(Direction::U_TURN).unwrap();
        assert_eq!(back.command, WheelCommand::new(100, -100));
        assert_eq!(back.duration, t90 * 2);

        assert!(cal.maneuver(Direction::STRAIGHT).is_none());
        assert!(cal.maneuver(Direction::STOP).is_none());
        assert!(cal.maneuver(Direction::LEFT | Direction::RIGHT).is_none());
    }

    #[test]
    fn correction_is_proportional_and_signed() {
        let cal = WalkerCalibration::default();
        assert_eq!(cal.correction(300), 6);
        assert_eq!(cal.correction(-300), -6);
        assert_eq!(cal.correction(80), 2);
        assert_eq!(cal.correction(0), 0);
    }

    #[test]
    fn correction_rounds_halves_to_even() {
        let cal = WalkerCalibration::default();
        assert_eq!(cal.correction(125), 2);
        assert_eq!(cal.correction(-125), -2);
        assert_eq!(cal.correction(175), 4);
        assert_eq!(cal.correction(75), 2);
        assert_eq!(cal.correction(126), 3);
    }

    #[test]
    fn zero_divisor_disables_correction() {
        let cal = WalkerCalibration {
            correction_divisor: 0,
            ..WalkerCalibration::default()
        };
        assert_eq!(cal.correction(1000), 0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cal: WalkerCalibration = toml::from_str("cruise_speed = 350\nquarter_turn_ms = 1800").unwrap();
        assert_eq!(cal.cruise_speed, 350);
        assert_eq!(cal.quarter_turn(), Duration::from_millis(1800));
        assert_eq!(cal.opening_threshold, 100);
        assert_eq!(cal.front_space_threshold, 2650);
    }
}
