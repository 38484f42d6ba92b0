use crate::pathing_grid::PathingGrid;
use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexSet;
use log::warn;

type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Result of a single search. A path exists iff `found`, in which case the parent chain from
/// the goal node leads back to the start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: bool,
    pub iterations: u32,
}

/// Best-first search over the 8-connected node grid.
///
/// The open set is kept in insertion order and scanned linearly for the lowest `f`, the first
/// minimum wins. Windows are small enough that this beats maintaining a heap, and it makes
/// tie-breaking follow discovery order.
#[derive(Clone, Debug)]
pub struct AstarSolver {
    pub heuristic_weight: f32,
    pub max_loops: u32,
}

impl AstarSolver {
    pub fn new(heuristic_weight: f32, max_loops: u32) -> AstarSolver {
        AstarSolver {
            heuristic_weight,
            max_loops,
        }
    }

    /// Squared euclidean distance times the weight. Not admissible: it pulls the search towards
    /// straight runs at the goal rather than guaranteeing the cheapest path.
    pub fn heuristic(&self, p1: &Point, p2: &Point) -> f32 {
        let dx = p1.x - p2.x;
        let dy = p1.y - p2.y;
        (dx * dx + dy * dy) as f32 * self.heuristic_weight
    }

    /// Searches from node `start` to node `end`, both given as arena indices. The two must
    /// differ and both must be walkable.
    ///
    /// The search succeeds whenever the goal has a parent on return. If the loop cap is hit after
    /// the goal was discovered but before it was expanded, the parent chain found so far is kept.
    pub fn search(&self, grid: &mut PathingGrid, start: usize, end: usize) -> SearchOutcome {
        debug_assert_ne!(start, end);
        grid.clear_search_state();
        let goal = grid.point(end);

        let mut open: FxIndexSet<usize> = FxIndexSet::default();
        let h = self.heuristic(&grid.point(start), &goal);
        let node = grid.node_mut(start);
        node.f = h;
        node.open = true;
        open.insert(start);

        let mut iterations = 0;
        while let Some(current) = open
            .iter()
            .copied()
            .min_by(|&a, &b| grid.node(a).f.total_cmp(&grid.node(b).f))
        {
            if iterations >= self.max_loops {
                warn!(
                    "Search from {} to {} hit the loop cap of {}",
                    grid.point(start),
                    goal,
                    self.max_loops
                );
                break;
            }
            iterations += 1;
            if current == end {
                break;
            }
            open.shift_remove(&current);
            let node = grid.node_mut(current);
            node.open = false;
            node.closed = true;
            let (pos, g) = (node.grid_pos, node.g);

            for (n_ix, step) in grid.neighborhood_points_and_cost(pos) {
                let neighbour = grid.node(n_ix);
                if neighbour.closed {
                    continue;
                }
                let new_g = g + step;
                if neighbour.open && new_g >= neighbour.g {
                    continue;
                }
                let h = self.heuristic(&neighbour.grid_pos, &goal);
                let neighbour = grid.node_mut(n_ix);
                neighbour.parent = Some(current);
                neighbour.g = new_g;
                neighbour.f = new_g + h;
                if !neighbour.open {
                    neighbour.open = true;
                    open.insert(n_ix);
                }
            }
        }
        SearchOutcome {
            found: grid.node(end).parent.is_some(),
            iterations,
        }
    }
}
