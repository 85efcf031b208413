//! `mazerun-planner` – Offline route planning
//!
//! Turns a maze description into the ordered list of turns the robot must
//! take, one per intersection.
//!
//! # Modules
//!
//! - [`grid`] – [`OccupancyGrid`][grid::OccupancyGrid]: rows of cell
//!   weights where `0` is a wall and any positive value is walkable at that
//!   cost.
//! - [`astar`] – [`PathSource`][astar::PathSource] and
//!   [`AStarPlanner`][astar::AStarPlanner]: 4-connected shortest-path
//!   search producing an ordered list of [`GridPoint`][mazerun_types::GridPoint]s.
//! - [`compile`] – [`path_to_turns`][compile::path_to_turns]: compiles a
//!   grid path into turn instructions that a scripted guide replays.

pub mod astar;
pub mod compile;
pub mod grid;

pub use astar::{AStarPlanner, PathSource};
pub use compile::path_to_turns;
pub use grid::OccupancyGrid;
