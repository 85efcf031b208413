//! Maze and sensor-recording files.
//!
//! A maze file is TOML:
//!
//! ```toml
//! start = [7, 0]
//! end = [1, 6]
//! grid = [
//!     [1, 0, 1],
//!     [1, 1, 1],
//! ]
//! ```
//!
//! `grid[y][x]` is the cost of entering a cell, `0` marks a wall.  A
//! recording is a JSON array of sensor frames
//! (`{"left": 300, "center": 50, "right": 300}`).

use std::fs;
use std::path::Path;

use mazerun_planner::OccupancyGrid;
use mazerun_types::{GridPoint, SensorFrame};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MazeFile {
    grid: Vec<Vec<u32>>,
    start: [i32; 2],
    end: [i32; 2],
}

/// A parsed maze with its route endpoints.
#[derive(Debug, Clone)]
pub struct Maze {
    pub grid: OccupancyGrid,
    pub start: GridPoint,
    pub end: GridPoint,
}

impl Maze {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let file: MazeFile =
            toml::from_str(raw).map_err(|e| format!("Failed to parse maze: {}", e))?;
        let grid = OccupancyGrid::from_rows(file.grid).map_err(|e| e.to_string())?;
        Ok(Self {
            grid,
            start: GridPoint::new(file.start[0], file.start[1]),
            end: GridPoint::new(file.end[0], file.end[1]),
        })
    }
}

pub fn load_maze(path: &Path) -> Result<Maze, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read maze at {}: {}", path.display(), e))?;
    Maze::parse(&raw)
}

pub fn load_frames(path: &Path) -> Result<Vec<SensorFrame>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read recording at {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Failed to parse recording: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = include_str!("../../../demos/maze.toml");

    #[test]
    fn parses_reference_maze() {
        let maze = Maze::parse(REFERENCE).expect("reference maze");
        assert_eq!(maze.start, GridPoint::new(7, 0));
        assert_eq!(maze.end, GridPoint::new(1, 6));
        assert_eq!(maze.grid.width(), 9);
        assert!(maze.grid.is_open(maze.start));
        assert!(maze.grid.is_open(maze.end));
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let err = Maze::parse("start = [0, 0]\nend = [1, 0]\ngrid = [[1, 1], [1]]\n").unwrap_err();
        assert!(err.contains("ragged") || err.contains("row"), "{err}");
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        assert!(Maze::parse("start = [0, 0]\ngrid = [[1, 1]]\n").is_err());
    }

    #[test]
    fn loads_frames_with_optional_stop_flag() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("frames.json");
        fs::write(
            &path,
            r#"[{"left": 300, "center": 50, "right": 310},
                {"left": 40, "center": 60, "right": 290, "stop_requested": true}]"#,
        )
        .unwrap();

        let frames = load_frames(&path).expect("frames");
        assert_eq!(frames, vec![
            SensorFrame::new(300, 50, 310),
            SensorFrame::new(40, 60, 290).with_stop(),
        ]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_maze(Path::new("/nonexistent/maze.toml")).unwrap_err();
        assert!(err.contains("/nonexistent/maze.toml"));
    }
}
