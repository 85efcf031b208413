//! Decision policies consulted by the walker at each intersection.
//!
//! A [`Guide`] receives the set of directions the walker saw while
//! approaching an intersection and answers with exactly one of them, or
//! `STOP`.  It is called once per physical intersection.
//!
//! | guide | rule |
//! |---|---|
//! | [`StraightGuide`] | `STRAIGHT` if offered, else `STOP` |
//! | [`RightHandGuide`] | right > straight > left > u-turn |
//! | [`ScriptedGuide`] | replays a compiled instruction list, `STOP` when done or on mismatch |

use std::fmt;
use std::str::FromStr;

use mazerun_types::{Direction, MazeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Chooses one direction from those offered at an intersection.
pub trait Guide: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Return `STOP` or exactly one member of `offered`.
    fn decide(&mut self, offered: Direction) -> Direction;
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed-rule guides
// ─────────────────────────────────────────────────────────────────────────────

/// Goes straight whenever possible and stops otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightGuide;

impl Guide for StraightGuide {
    fn name(&self) -> &str {
        "straight"
    }

    fn decide(&mut self, offered: Direction) -> Direction {
        if offered.contains(Direction::STRAIGHT) {
            Direction::STRAIGHT
        } else {
            Direction::STOP
        }
    }
}

/// Keeps a wall on the right: right, then straight, then left, then turn
/// around.  Solves any simply-connected maze.
#[derive(Debug, Default, Clone, Copy)]
pub struct RightHandGuide;

impl Guide for RightHandGuide {
    fn name(&self) -> &str {
        "right-hand"
    }

    fn decide(&mut self, offered: Direction) -> Direction {
        [Direction::RIGHT, Direction::STRAIGHT, Direction::LEFT]
            .into_iter()
            .find(|d| offered.contains(*d))
            .unwrap_or(Direction::U_TURN)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted guide
// ─────────────────────────────────────────────────────────────────────────────

/// Replays a pre-computed instruction list, one entry per intersection.
///
/// Answers `STOP` once the list is exhausted.  When the next instruction is
/// not among the offered directions the physical intersection does not match
/// the planned one: the guide answers `STOP` and keeps its cursor where it is.
#[derive(Debug, Clone)]
pub struct ScriptedGuide {
    instructions: Vec<Direction>,
    cursor: usize,
}

impl ScriptedGuide {
    pub fn new(instructions: Vec<Direction>) -> Self {
        Self {
            instructions,
            cursor: 0,
        }
    }

    /// Like [`Guide::decide`], but surfaces a mismatch as an error.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::ScriptMismatch`] when the instruction at the
    /// cursor is not in `offered`.  The cursor does not move.
    pub fn try_decide(&mut self, offered: Direction) -> Result<Direction, MazeError> {
        let Some(&instruction) = self.instructions.get(self.cursor) else {
            debug!("script exhausted");
            return Ok(Direction::STOP);
        };
        if !offered.contains(instruction) {
            return Err(MazeError::ScriptMismatch {
                index: self.cursor,
                instruction,
                offered,
            });
        }
        self.cursor += 1;
        Ok(instruction)
    }

    /// Instructions not yet replayed.
    pub fn remaining(&self) -> &[Direction] {
        self.instructions.get(self.cursor..).unwrap_or(&[])
    }
}

impl Guide for ScriptedGuide {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decide(&mut self, offered: Direction) -> Direction {
        match self.try_decide(offered) {
            Ok(direction) => direction,
            Err(err) => {
                warn!(%err, "scripted guide stopping the walker");
                Direction::STOP
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Guide selection
// ─────────────────────────────────────────────────────────────────────────────

/// Which guide to drive with, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuideKind {
    #[default]
    Scripted,
    RightHand,
    Straight,
}

impl GuideKind {
    /// Build the guide.  `instructions` is only used by
    /// [`GuideKind::Scripted`].
    pub fn build(self, instructions: Vec<Direction>) -> Box<dyn Guide> {
        info!(guide = %self, "guide selected");
        match self {
            GuideKind::Scripted => Box::new(ScriptedGuide::new(instructions)),
            GuideKind::RightHand => Box::new(RightHandGuide),
            GuideKind::Straight => Box::new(StraightGuide),
        }
    }
}

impl fmt::Display for GuideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuideKind::Scripted => write!(f, "scripted"),
            GuideKind::RightHand => write!(f, "right-hand"),
            GuideKind::Straight => write!(f, "straight"),
        }
    }
}

impl FromStr for GuideKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scripted" => Ok(GuideKind::Scripted),
            "right-hand" | "righthand" | "right_hand" => Ok(GuideKind::RightHand),
            "straight" => Ok(GuideKind::Straight),
            other => Err(format!(
                "unknown guide '{other}' (expected scripted, right-hand or straight)"
            )),
        }
    }
}
