//! A* shortest-path search over an [`OccupancyGrid`].
//!
//! # Example
//!
//! ```
//! use mazerun_planner::{AStarPlanner, OccupancyGrid, PathSource};
//! use mazerun_types::GridPoint;
//!
//! let grid = OccupancyGrid::from_rows(vec![
//!     vec![1, 1, 1],
//!     vec![0, 0, 1],
//! ]).unwrap();
//! let planner = AStarPlanner::new(grid);
//!
//! let path = planner.find_path(GridPoint::new(0, 0), GridPoint::new(2, 1)).unwrap();
//! assert_eq!(path.len(), 4);
//! ```

use mazerun_types::{GridPoint, MazeError};
use pathfinding::prelude::astar;
use tracing::debug;

use crate::grid::OccupancyGrid;

/// Anything that can produce an ordered, 4-connected cell path from `start`
/// to `end`.
pub trait PathSource {
    /// # Errors
    ///
    /// Returns [`MazeError::NoPath`] when either endpoint is blocked or the
    /// goal is unreachable.
    fn find_path(&self, start: GridPoint, end: GridPoint) -> Result<Vec<GridPoint>, MazeError>;
}

/// A* over 4-connected moves. Entering a cell costs its weight; the
/// heuristic is the Manhattan distance, which is admissible because every
/// walkable cell costs at least 1.
pub struct AStarPlanner {
    grid: OccupancyGrid,
}

impl AStarPlanner {
    pub fn new(grid: OccupancyGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }
}

impl PathSource for AStarPlanner {
    fn find_path(&self, start: GridPoint, end: GridPoint) -> Result<Vec<GridPoint>, MazeError> {
        if !self.grid.is_open(start) || !self.grid.is_open(end) {
            return Err(MazeError::NoPath { start, end });
        }

        let result = astar(
            &start,
            |node| self.grid.neighbors(*node).collect::<Vec<_>>(),
            |node| node.x.abs_diff(end.x) + node.y.abs_diff(end.y),
            |node| *node == end,
        );

        match result {
            Some((path, cost)) => {
                debug!(%start, %end, cells = path.len(), cost, "path found");
                Ok(path)
            }
            None => Err(MazeError::NoPath { start, end }),
        }
    }
}
