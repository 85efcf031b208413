//! Weighted occupancy grid for corridor mazes.

use mazerun_types::{GridPoint, MazeError};

/// Axis-aligned unit steps: east, west, south, north (y grows downwards).
const STEPS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A rectangular maze of cell weights, addressed as `(x, y)` with `y`
/// selecting the row.
///
/// A weight of `0` blocks the cell.  Any positive weight is walkable and is
/// the cost of entering that cell, so `1` is a plain corridor and larger
/// values mark traversable-but-costlier cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl OccupancyGrid {
    /// Build a grid from rows of weights (`rows[y][x]`).
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::InvalidMaze`] for an empty grid or rows of
    /// differing length.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, MazeError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeError::InvalidMaze("grid has no cells".to_string()));
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(MazeError::InvalidMaze(format!(
                "row {y} has {} cells, expected {width}",
                row.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Weight of the cell at `point`, or `None` when out of bounds.
    pub fn weight(&self, point: GridPoint) -> Option<u32> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// `true` when `point` is inside the grid and not a wall.
    pub fn is_open(&self, point: GridPoint) -> bool {
        self.weight(point).is_some_and(|w| w > 0)
    }

    /// Walkable 4-connected neighbours of `point` with the cost of entering
    /// each one.
    pub fn neighbors(&self, point: GridPoint) -> impl Iterator<Item = (GridPoint, u32)> + '_ {
        STEPS.iter().filter_map(move |&(dx, dy)| {
            let next = GridPoint::new(point.x + dx, point.y + dy);
            match self.weight(next) {
                Some(w) if w > 0 => Some((next, w)),
                _ => None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> OccupancyGrid {
        OccupancyGrid::from_rows(vec![vec![1, 0, 1], vec![1, 3, 1]]).unwrap()
    }

    #[test]
    fn dimensions_and_weights() {
        let grid = small();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.weight(GridPoint::new(1, 1)), Some(3));
        assert_eq!(grid.weight(GridPoint::new(1, 0)), Some(0));
        assert_eq!(grid.weight(GridPoint::new(3, 0)), None);
        assert_eq!(grid.weight(GridPoint::new(-1, 0)), None);
    }

    #[test]
    fn walls_are_not_open() {
        let grid = small();
        assert!(grid.is_open(GridPoint::new(0, 0)));
        assert!(!grid.is_open(GridPoint::new(1, 0)));
        assert!(!grid.is_open(GridPoint::new(0, 5)));
    }

    #[test]
    fn neighbors_skip_walls_and_edges() {
        let grid = small();
        let mut around: Vec<_> = grid.neighbors(GridPoint::new(0, 0)).collect();
        around.sort_by_key(|(p, _)| (p.x, p.y));
        assert_eq!(around, vec![(GridPoint::new(0, 1), 1)]);

        let mut centre: Vec<_> = grid.neighbors(GridPoint::new(1, 1)).collect();
        centre.sort_by_key(|(p, _)| (p.x, p.y));
        assert_eq!(
            centre,
            vec![(GridPoint::new(0, 1), 1), (GridPoint::new(2, 1), 1)]
        );
    }

    #[test]
    fn rejects_empty_and_ragged_grids() {
        assert!(matches!(
            OccupancyGrid::from_rows(vec![]),
            Err(MazeError::InvalidMaze(_))
        ));
        assert!(matches!(
            OccupancyGrid::from_rows(vec![vec![]]),
            Err(MazeError::InvalidMaze(_))
        ));
        let err = OccupancyGrid::from_rows(vec![vec![1, 1], vec![1]]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
