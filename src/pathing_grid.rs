use crate::window::StreamWindow;
use crate::world::WorldPoint;
use crate::{MAX_COST, SQRT_2};
use core::fmt;
use grid_util::point::Point;
use itertools::iproduct;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// Moore neighbourhood in scan order, which fixes the order successors are generated in.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One cell of the window. The cost field fills in `walkable` and `cost`, the search owns the
/// remaining fields. All of it is reset before every path request.
#[derive(Clone, Debug)]
pub struct Node {
    pub grid_pos: Point,
    /// Centre of the cell in world space, recomputed whenever the grid is rebuilt.
    pub world_pos: WorldPoint,
    /// Extra traversal cost from overlapping obstacles. [MAX_COST] marks the cell as blocked.
    pub cost: f32,
    pub walkable: bool,
    /// Index of the predecessor on the best known path.
    pub parent: Option<usize>,
    pub g: f32,
    pub f: f32,
    pub open: bool,
    pub closed: bool,
}

impl Node {
    fn new(grid_pos: Point) -> Node {
        Node {
            grid_pos,
            world_pos: WorldPoint::default(),
            cost: MAX_COST,
            walkable: false,
            parent: None,
            g: 0.0,
            f: 0.0,
            open: false,
            closed: false,
        }
    }
    /// Walkable without any extra cost, the only nodes line of sight may pass through.
    pub fn is_clear(&self) -> bool {
        self.walkable && self.cost == 0.0
    }
    fn clear_search(&mut self) {
        self.parent = None;
        self.g = 0.0;
        self.f = 0.0;
        self.open = false;
        self.closed = false;
    }
}

/// [PathingGrid] is a square arena of [Node]s in row-major order covering the streaming window.
/// Parent links are indices into the same arena. It also maintains connected components of
/// walkable cells using a [UnionFind] structure so unreachable goals can be rejected up front.
#[derive(Clone, Debug)]
pub struct PathingGrid {
    width: usize,
    nodes: Vec<Node>,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl Default for PathingGrid {
    fn default() -> PathingGrid {
        PathingGrid::new(0)
    }
}

impl PathingGrid {
    /// Creates a grid of `width * width` blocked nodes.
    pub fn new(width: usize) -> PathingGrid {
        let nodes = iproduct!(0..width as i32, 0..width as i32)
            .map(|(y, x)| Node::new(Point::new(x, y)))
            .collect();
        PathingGrid {
            width,
            nodes,
            components: UnionFind::new(width * width),
            components_dirty: true,
        }
    }
    pub fn width(&self) -> usize {
        self.width
    }
    /// Reallocates the arena if the window size changed. Returns whether it did.
    pub fn ensure_width(&mut self, width: usize) -> bool {
        if self.width == width && self.nodes.len() == width * width {
            return false;
        }
        *self = PathingGrid::new(width);
        true
    }
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.width
    }
    /// Arena index of a grid position, [None] outside the window.
    pub fn ix(&self, p: Point) -> Option<usize> {
        self.in_bounds(p)
            .then(|| p.y as usize * self.width + p.x as usize)
    }
    /// Arena index for a position the caller has already bounds-checked.
    pub fn ix_fast(&self, p: Point) -> usize {
        debug_assert!(self.in_bounds(p), "{} lies outside the window", p);
        p.y as usize * self.width + p.x as usize
    }
    pub fn point(&self, ix: usize) -> Point {
        self.nodes[ix].grid_pos
    }
    pub fn node(&self, ix: usize) -> &Node {
        &self.nodes[ix]
    }
    pub fn node_mut(&mut self, ix: usize) -> &mut Node {
        &mut self.nodes[ix]
    }
    pub fn node_at(&self, p: Point) -> Option<&Node> {
        self.ix(p).map(|ix| &self.nodes[ix])
    }
    pub fn node_at_mut(&mut self, p: Point) -> Option<&mut Node> {
        match self.ix(p) {
            Some(ix) => Some(&mut self.nodes[ix]),
            None => None,
        }
    }
    pub fn node_at_fast(&self, p: Point) -> &Node {
        &self.nodes[self.ix_fast(p)]
    }
    /// Cells outside the window are never clear.
    pub fn is_clear(&self, p: Point) -> bool {
        self.node_at(p).is_some_and(Node::is_clear)
    }
    pub fn is_walkable(&self, p: Point) -> bool {
        self.node_at(p).is_some_and(|n| n.walkable)
    }
    /// Extra cost of a cell; cells outside the window count as blocked.
    pub fn cost_at(&self, p: Point) -> f32 {
        self.node_at(p).map_or(MAX_COST, |n| n.cost)
    }
    /// Marks a cell as open terrain (no extra cost) or as blocked terrain.
    pub fn set_walkable(&mut self, p: Point, walkable: bool) {
        if let Some(node) = self.node_at_mut(p) {
            node.walkable = walkable;
            node.cost = if walkable { 0.0 } else { MAX_COST };
            self.components_dirty = true;
        }
    }
    /// Adds obstacle cost to a cell. Once the accumulated cost reaches [MAX_COST] the cell is
    /// unwalkable regardless of the terrain below.
    pub fn add_cost(&mut self, p: Point, cost: f32) {
        if let Some(node) = self.node_at_mut(p) {
            node.cost = (node.cost + cost).min(MAX_COST);
            if node.cost >= MAX_COST {
                node.walkable = false;
            }
            self.components_dirty = true;
        }
    }
    /// Whether a single step from `start` to the adjacent cell `pos` is allowed. Diagonal steps
    /// are rejected if either orthogonal cell in between carries any cost, so paths never squeeze
    /// past the corner of an obstacle.
    pub fn can_move_to(&self, pos: Point, start: Point) -> bool {
        debug_assert!((start.x - pos.x).abs() <= 1 && (start.y - pos.y).abs() <= 1);
        if !self.is_walkable(pos) {
            return false;
        }
        if pos.x != start.x && pos.y != start.y {
            self.cost_at(Point::new(start.x, pos.y)) == 0.0
                && self.cost_at(Point::new(pos.x, start.y)) == 0.0
        } else {
            true
        }
    }
    /// Reachable neighbours of `pos` with the cost of stepping onto them: 1 for orthogonal and
    /// sqrt(2) for diagonal moves, plus the cost of the target cell.
    pub fn neighborhood_points_and_cost(&self, pos: Point) -> SmallVec<[(usize, f32); 8]> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|&(dx, dy)| (Point::new(pos.x + dx, pos.y + dy), dx != 0 && dy != 0))
            .filter(|&(p, _)| self.can_move_to(p, pos))
            .map(|(p, diagonal)| {
                let ix = self.ix_fast(p);
                let step = if diagonal { SQRT_2 } else { 1.0 };
                (ix, step + self.nodes[ix].cost)
            })
            .collect()
    }
    /// Resets every node to blocked and recomputes the cached world positions for the current
    /// window placement.
    pub fn reset(&mut self, window: &StreamWindow) {
        for node in &mut self.nodes {
            node.world_pos = window.grid_to_world(node.grid_pos);
            node.cost = MAX_COST;
            node.walkable = false;
            node.clear_search();
        }
        self.components_dirty = true;
    }
    /// Clears parents, scores and open/closed flags without touching the cost field.
    pub fn clear_search_state(&mut self) {
        for node in &mut self.nodes {
            node.clear_search();
        }
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: Point, goal: Point) -> bool {
        match (self.ix(start), self.ix(goal)) {
            (Some(s), Some(g)) => {
                self.nodes[s].walkable && self.nodes[g].walkable && self.components.equiv(s, g)
            }
            _ => false,
        }
    }
    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }
    /// Generates a new [UnionFind] structure and links up walkable orthogonal neighbours. Diagonal
    /// moves are only allowed when both flanking cells are clear, so 4-connectivity gives the same
    /// components as the search's 8-connectivity.
    pub fn generate_components(&mut self) {
        let w = self.width as i32;
        self.components = UnionFind::new(self.nodes.len());
        self.components_dirty = false;
        for (y, x) in iproduct!(0..w, 0..w) {
            let point = Point::new(x, y);
            let ix = self.ix_fast(point);
            if !self.nodes[ix].walkable {
                continue;
            }
            for n in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                if let Some(n_ix) = self.ix(n) {
                    if self.nodes[n_ix].walkable {
                        self.components.union(ix, n_ix);
                    }
                }
            }
        }
    }
}

/// Renders the cost field, `.` for clear cells, `+` for walkable cells with extra cost and `#`
/// for blocked cells.
impl fmt::Display for PathingGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.nodes.chunks(self.width.max(1)) {
            let line = row
                .iter()
                .map(|n| {
                    if n.is_clear() {
                        '.'
                    } else if n.walkable {
                        '+'
                    } else {
                        '#'
                    }
                })
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: usize) -> PathingGrid {
        let mut grid = PathingGrid::new(width);
        for y in 0..width as i32 {
            for x in 0..width as i32 {
                grid.set_walkable(Point::new(x, y), true);
            }
        }
        grid
    }

    #[test]
    fn accessors_are_bounds_checked() {
        let grid = PathingGrid::new(4);
        assert!(grid.node_at(Point::new(0, 0)).is_some());
        assert!(grid.node_at(Point::new(3, 3)).is_some());
        assert!(grid.node_at(Point::new(4, 0)).is_none());
        assert!(grid.node_at(Point::new(0, -1)).is_none());
        assert_eq!(grid.node_at_fast(Point::new(2, 1)).grid_pos, Point::new(2, 1));
        assert_eq!(grid.ix(Point::new(2, 1)), Some(6));
    }

    #[test]
    fn new_nodes_are_blocked() {
        let grid = PathingGrid::new(3);
        assert!(grid.nodes().iter().all(|n| !n.walkable && n.cost == MAX_COST));
    }

    #[test]
    fn ensure_width_only_reallocates_on_change() {
        let mut grid = open_grid(4);
        assert!(!grid.ensure_width(4));
        assert!(grid.is_clear(Point::new(1, 1)));
        assert!(grid.ensure_width(6));
        assert_eq!(grid.nodes().len(), 36);
        assert!(!grid.is_clear(Point::new(1, 1)));
    }

    #[test]
    fn blocking_cost_overrides_terrain() {
        let mut grid = open_grid(3);
        let p = Point::new(1, 1);
        grid.add_cost(p, 2.0);
        assert!(grid.is_walkable(p));
        assert!(!grid.is_clear(p));
        assert_eq!(grid.cost_at(p), 2.0);
        grid.add_cost(p, MAX_COST);
        assert!(!grid.is_walkable(p));
        assert_eq!(grid.cost_at(p), MAX_COST);

        // Partial costs adding up to the sentinel block as well
        let q = Point::new(2, 2);
        grid.add_cost(q, MAX_COST * 0.75);
        assert!(grid.is_walkable(q));
        grid.add_cost(q, MAX_COST * 0.75);
        assert!(!grid.is_walkable(q));
        assert_eq!(grid.cost_at(q), MAX_COST);
    }

    /// Tests whether points are correctly mapped to different connected components
    #[test]
    fn test_component_generation() {
        // Corresponds to the following grid:
        // |.#.|
        // |.#.|
        // |.#.|
        let mut grid = open_grid(3);
        for y in 0..3 {
            grid.set_walkable(Point::new(1, y), false);
        }
        grid.update();
        assert!(grid.reachable(Point::new(0, 0), Point::new(0, 2)));
        assert!(!grid.reachable(Point::new(0, 0), Point::new(2, 0)));
        assert!(!grid.reachable(Point::new(0, 0), Point::new(1, 1)));
        grid.set_walkable(Point::new(1, 2), true);
        grid.update();
        assert!(grid.reachable(Point::new(0, 0), Point::new(2, 0)));
    }

    #[test]
    fn diagonal_needs_both_flanks_free() {
        // |.+|
        // |..|
        let mut grid = open_grid(2);
        grid.add_cost(Point::new(1, 0), 0.5);
        let start = Point::new(0, 0);
        assert!(!grid.can_move_to(Point::new(1, 1), start));
        assert!(grid.can_move_to(Point::new(1, 0), start));
        assert!(grid.can_move_to(Point::new(0, 1), start));
        let neighbours = grid.neighborhood_points_and_cost(start);
        assert_eq!(neighbours.len(), 2);
        assert_eq!(neighbours[0], (1, 1.5));
        assert_eq!(neighbours[1], (2, 1.0));
    }

    #[test]
    fn diagonal_costs_sqrt_two() {
        let grid = open_grid(3);
        let neighbours = grid.neighborhood_points_and_cost(Point::new(1, 1));
        assert_eq!(neighbours.len(), 8);
        assert_eq!(neighbours[0], (0, SQRT_2));
        assert_eq!(neighbours[1], (1, 1.0));
    }

    #[test]
    fn display_marks_cell_kinds() {
        let mut grid = open_grid(3);
        grid.set_walkable(Point::new(0, 0), false);
        grid.add_cost(Point::new(2, 2), 1.0);
        assert_eq!(format!("{}", grid), "#..\n...\n..+\n");
    }
}
