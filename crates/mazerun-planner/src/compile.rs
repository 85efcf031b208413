//! Path-to-turns compiler.
//!
//! Walks a grid path and emits one [`Direction`] for every heading change.
//! Straight runs are silent, so the output holds exactly one entry per
//! intersection at which the robot must turn; a scripted guide replays it
//! one entry per detected intersection.
//!
//! Steps are expressed as *previous minus next* cell.  The left/right
//! convention is fixed against the reference maze (rows grow downwards):
//! travelling north and then east is a `RIGHT`.
//!
//! ```
//! use mazerun_planner::path_to_turns;
//! use mazerun_types::{Direction, GridPoint};
//!
//! let path: Vec<GridPoint> = [(0, 2), (0, 1), (0, 0), (1, 0)]
//!     .into_iter()
//!     .map(GridPoint::from)
//!     .collect();
//! assert_eq!(path_to_turns(&path).unwrap(), vec![Direction::RIGHT]);
//! ```

use mazerun_types::{Direction, GridPoint, MazeError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    dx: i32,
    dy: i32,
}

impl Step {
    fn between(prev: GridPoint, next: GridPoint) -> Result<Self, MazeError> {
        let step = Step {
            dx: prev.x - next.x,
            dy: prev.y - next.y,
        };
        if step.dx.abs() + step.dy.abs() != 1 {
            return Err(MazeError::InvalidPath(format!(
                "{prev} -> {next} is not a single axis-aligned step"
            )));
        }
        Ok(step)
    }

    fn reversed(self) -> Self {
        Step {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

/// Compile an ordered grid path into turn instructions.
///
/// A path with no heading change compiles to an empty list; a scripted guide
/// fed that list answers `STOP` at the first intersection.
///
/// # Errors
///
/// Returns [`MazeError::InvalidPath`] when the path has fewer than two cells
/// or two consecutive cells are not exactly one unit apart along one axis.
pub fn path_to_turns(path: &[GridPoint]) -> Result<Vec<Direction>, MazeError> {
    let [first, second, ..] = path else {
        return Err(MazeError::InvalidPath(format!(
            "need at least two cells to know a heading, got {}",
            path.len()
        )));
    };

    let mut heading = Step::between(*first, *second)?;
    let mut turns = Vec::new();

    for pair in path.windows(2).skip(1) {
        let step = Step::between(pair[0], pair[1])?;

        if step == heading.reversed() {
            turns.push(Direction::U_TURN);
        } else {
            if heading.dx == 0 && step.dx != 0 {
                let right = (step.dx == -1 && heading.dy == 1) || (step.dx == 1 && heading.dy == -1);
                turns.push(if right { Direction::RIGHT } else { Direction::LEFT });
            }
            if heading.dy == 0 && step.dy != 0 {
                let left = (step.dy == 1 && heading.dx == -1) || (step.dy == -1 && heading.dx == 1);
                turns.push(if left { Direction::LEFT } else { Direction::RIGHT });
            }
        }

        heading = step;
    }

    debug!(cells = path.len(), turns = turns.len(), "compiled path");
    Ok(turns)
}
