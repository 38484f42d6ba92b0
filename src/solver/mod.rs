//! Search and path post-processing on a built [PathingGrid](crate::pathing_grid::PathingGrid).
pub mod astar;
pub mod los;
pub mod shorten;

pub use astar::{AstarSolver, SearchOutcome};
pub use los::check_line;
pub use shorten::{reconstruct_path, shorten_global, shorten_local};
