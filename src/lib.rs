//! # tile_pathfinding
//!
//! Grid pathfinding for a streaming tile world. Only a square window of patches around a focus
//! point is mapped onto a node grid, which is rebuilt from the terrain and the active objects
//! before every request. Paths are found with
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) over 8-connected cells, where a
//! diagonal step may not cut the corner of a blocked or costly cell, and are then shortened in
//! two passes: local smoothing of stair-steps and bumps, followed by line-of-sight waypoint
//! skipping. [Connected components](https://en.wikipedia.org/wiki/Component_(graph_theory)) are
//! kept for the window to reject unreachable goals without flood-filling.
//!
//! Searches are charged to a per-frame budget so callers can spread requests over frames.
pub mod budget;
pub mod config;
pub mod cost_field;
pub mod pathfinder;
pub mod pathing_grid;
pub mod solver;
pub mod window;
pub mod world;

pub use config::PathfinderConfig;
pub use pathfinder::Pathfinder;
pub use pathing_grid::{Node, PathingGrid};
pub use window::{StreamWindow, WindowLayout};
pub use world::{Aabb, Obstacle, TileMap, WorldPoint};

pub const SQRT_2: f32 = std::f32::consts::SQRT_2;
/// Cost of a cell that cannot be entered.
pub const MAX_COST: f32 = f32::MAX;
/// Inset applied to obstacle footprints before they are snapped to tiles.
pub const EPSILON: f32 = 1e-3;
