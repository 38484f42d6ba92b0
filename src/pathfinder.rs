use crate::budget::SearchBudget;
use crate::config::PathfinderConfig;
use crate::cost_field::{build_cost_field, ObjectCostFn, WalkabilityFn};
use crate::pathing_grid::PathingGrid;
use crate::solver::astar::AstarSolver;
use crate::solver::shorten::{reconstruct_path, shorten_global, shorten_local};
use crate::window::{StreamWindow, WindowLayout};
use crate::world::{Obstacle, TileMap, WorldPoint};
use grid_util::point::Point;
use log::{debug, info};

/// Finds paths between world positions inside the streaming window.
///
/// The game supplies two policies at construction: whether a tile of type `T` can be crossed,
/// and how much cost an object of type `O` adds to the cells under it. Every request rebuilds
/// the cost field from the terrain and the objects handed in, runs the search and, if enabled,
/// both shortening passes.
///
/// Requests are synchronous. Callers spreading work over frames should call
/// [update](Self::update) once per frame and skip requests while
/// [is_ok_to_search](Self::is_ok_to_search) is false.
pub struct Pathfinder<T, O> {
    pub config: PathfinderConfig,
    window: StreamWindow,
    grid: PathingGrid,
    budget: SearchBudget,
    is_walkable: Box<WalkabilityFn<T>>,
    object_cost: Box<ObjectCostFn<O>>,
    last_search_iterations: u32,
    last_path: Vec<WorldPoint>,
}

impl<T, O: Obstacle> Pathfinder<T, O> {
    pub fn new<W, C>(
        config: PathfinderConfig,
        layout: WindowLayout,
        is_walkable: W,
        object_cost: C,
    ) -> Pathfinder<T, O>
    where
        W: Fn(&T, bool) -> bool + 'static,
        C: Fn(&O, bool) -> f32 + 'static,
    {
        Pathfinder {
            config,
            window: StreamWindow::new(layout),
            grid: PathingGrid::new(layout.array_width()),
            budget: SearchBudget::new(),
            is_walkable: Box::new(is_walkable),
            object_cost: Box::new(object_cost),
            last_search_iterations: 0,
            last_path: Vec::new(),
        }
    }

    /// Once-per-frame tick: starts a new search budget frame and moves the window to the
    /// patch containing `focus`.
    pub fn update(&mut self, focus: WorldPoint) {
        self.budget.roll();
        self.window.follow(focus);
    }
    /// Changes the window dimensions. The node array is reallocated on the next rebuild.
    pub fn set_layout(&mut self, layout: WindowLayout) {
        self.window.set_layout(layout);
    }
    pub fn window(&self) -> &StreamWindow {
        &self.window
    }
    pub fn grid(&self) -> &PathingGrid {
        &self.grid
    }

    pub fn search_cost_this_frame(&self) -> u32 {
        self.budget.this_frame()
    }
    pub fn search_cost_last_frame(&self) -> u32 {
        self.budget.last_frame()
    }
    /// False once this frame's searches have spent more than the configured per-frame cost.
    pub fn is_ok_to_search(&self) -> bool {
        self.budget.is_ok(self.config.max_cost_per_frame)
    }
    /// Search iterations charged by the most recent request.
    pub fn last_search_iterations(&self) -> u32 {
        self.last_search_iterations
    }
    /// The most recently returned path, kept for debug overlays.
    pub fn last_path(&self) -> &[WorldPoint] {
        &self.last_path
    }

    /// Rebuilds the cost field for the current window from the terrain and active objects.
    pub fn build_cost_field<M>(&mut self, tiles: &M, objects: &[O], can_fly: bool)
    where
        M: TileMap<Tile = T>,
    {
        build_cost_field(
            &mut self.grid,
            &self.window,
            tiles,
            &*self.is_walkable,
            objects,
            &*self.object_cost,
            can_fly,
        );
        if self.config.debug_render {
            debug!("Cost field:\n{}", self.grid);
        }
    }

    /// Computes a path between two world positions. The returned positions are cell centres,
    /// starting at the cell nearest `start` and ending at the cell nearest `end`. [None] if no
    /// path exists, an endpoint lies outside the window or the search ran out of loops.
    pub fn get_path<M>(
        &mut self,
        tiles: &M,
        objects: &[O],
        start: WorldPoint,
        end: WorldPoint,
        can_fly: bool,
    ) -> Option<Vec<WorldPoint>>
    where
        M: TileMap<Tile = T>,
    {
        self.last_search_iterations = 0;
        self.last_path.clear();
        if !self.config.enabled {
            return None;
        }
        self.build_cost_field(tiles, objects, can_fly);
        let cells = self
            .window
            .world_to_grid(start)
            .zip(self.window.world_to_grid(end))
            .and_then(|(start_cell, end_cell)| self.get_grid_path(start_cell, end_cell));
        let Some(cells) = cells else {
            info!("No path from {} to {}", start, end);
            return None;
        };
        let path = cells
            .iter()
            .map(|&p| self.grid.node_at_fast(p).world_pos)
            .collect::<Vec<_>>();
        info!(
            "Path from {} to {} with {} points after {} iterations",
            start,
            end,
            path.len(),
            self.last_search_iterations
        );
        if self.config.debug_render {
            debug!("Path: {:?}", cells);
        }
        self.last_path = path.clone();
        Some(path)
    }

    /// Searches between two grid cells on the cost field as it was last built, snapping both
    /// endpoints to the nearest clear cell first. Returns grid positions, or [None] when the
    /// pathfinder is disabled.
    pub fn get_grid_path(&mut self, start: Point, end: Point) -> Option<Vec<Point>> {
        self.last_search_iterations = 0;
        if !self.config.enabled {
            return None;
        }
        let (Some(start), Some(end)) = (self.nearest_clear(start), self.nearest_clear(end)) else {
            info!("No clear cell near {} or {}", start, end);
            return None;
        };
        if start == end {
            return Some(vec![start]);
        }
        if self.config.reject_unreachable {
            self.grid.update();
            if !self.grid.reachable(start, end) {
                info!("{} is not reachable from {}", end, start);
                return None;
            }
        }

        let solver = AstarSolver::new(self.config.heuristic_weight, self.config.max_loops);
        let (s, e) = (self.grid.ix_fast(start), self.grid.ix_fast(end));
        let outcome = solver.search(&mut self.grid, s, e);
        self.last_search_iterations = outcome.iterations;
        self.budget.charge(outcome.iterations);
        if !outcome.found {
            return None;
        }

        let mut path = reconstruct_path(&self.grid, e)
            .into_iter()
            .map(|ix| self.grid.point(ix))
            .collect::<Vec<_>>();
        if self.config.try_shorten {
            shorten_local(&self.grid, &mut path);
            path = shorten_global(&self.grid, &path);
        }
        Some(path)
    }

    /// The clear cell closest to `p`, searching square rings of growing radius up to the snap
    /// radius. Positions outside the window have no nearest cell.
    fn nearest_clear(&self, p: Point) -> Option<Point> {
        if !self.grid.in_bounds(p) {
            return None;
        }
        if self.grid.is_clear(p) {
            return Some(p);
        }
        for r in 1..=self.config.snap_radius {
            let mut best: Option<(i32, Point)> = None;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let q = Point::new(p.x + dx, p.y + dy);
                    let d = dx * dx + dy * dy;
                    if self.grid.is_clear(q) && best.map_or(true, |(bd, _)| d < bd) {
                        best = Some((d, q));
                    }
                }
            }
            if let Some((_, q)) = best {
                return Some(q);
            }
        }
        None
    }
}
