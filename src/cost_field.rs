use crate::pathing_grid::PathingGrid;
use crate::window::StreamWindow;
use crate::world::{Aabb, Obstacle, TileMap, WorldPoint};
use crate::EPSILON;
use grid_util::point::Point;
use itertools::iproduct;
use log::debug;

/// Decides whether a tile can be crossed, the flag is set for flying searches.
pub type WalkabilityFn<T> = dyn Fn(&T, bool) -> bool;
/// Extra cost an object adds to the cells it covers: `0.0` to ignore it, [crate::MAX_COST] to
/// block them.
pub type ObjectCostFn<O> = dyn Fn(&O, bool) -> f32;

/// Rebuilds the whole window from the terrain and the active objects: every node is reset, cells
/// over walkable tiles become clear, and then obstacle cost is accumulated on top.
pub fn build_cost_field<M, O>(
    grid: &mut PathingGrid,
    window: &StreamWindow,
    tiles: &M,
    is_walkable: &WalkabilityFn<M::Tile>,
    objects: &[O],
    object_cost: &ObjectCostFn<O>,
    can_fly: bool,
) where
    M: TileMap,
    O: Obstacle,
{
    let width = window.layout().array_width();
    if grid.ensure_width(width) {
        debug!("Reallocated node grid to {width}x{width}");
    }
    grid.reset(window);

    let w = grid.width() as i32;
    for (y, x) in iproduct!(0..w, 0..w) {
        let p = Point::new(x, y);
        let walkable = tiles
            .tile_at(window.grid_to_tile(p))
            .is_some_and(|tile| is_walkable(tile, can_fly));
        if walkable {
            grid.set_walkable(p, true);
        }
    }

    let mut applied = 0;
    for object in objects {
        let cost = object_cost(object, can_fly);
        if cost == 0.0 {
            continue;
        }
        if let Some(footprint) = object.footprint() {
            stamp_footprint(grid, window, &footprint, cost);
            applied += 1;
        }
    }
    grid.update();
    debug!(
        "Rebuilt {w}x{w} cost field at offset {}, {applied} of {} objects applied",
        window.offset(),
        objects.len()
    );
}

/// Adds `cost` to every node overlapped by `footprint`. The corners are pulled inward by
/// [EPSILON] so a box ending exactly on a tile boundary does not spill into the next tile. A box
/// that collapses to a point only affects the node at its centre.
pub fn stamp_footprint(grid: &mut PathingGrid, window: &StreamWindow, footprint: &Aabb, cost: f32) {
    let layout = window.layout();
    let min_tile = layout.world_to_tile(WorldPoint::new(
        footprint.min.x + EPSILON,
        footprint.min.y + EPSILON,
    ));
    let max_tile = layout.world_to_tile(WorldPoint::new(
        footprint.max.x - EPSILON,
        footprint.max.y - EPSILON,
    ));
    if min_tile.x > max_tile.x || min_tile.y > max_tile.y {
        if let Some(p) = window.world_to_grid(footprint.center()) {
            grid.add_cost(p, cost);
        }
        return;
    }
    let offset = window.offset();
    let last = grid.width() as i32 - 1;
    let (x0, x1) = (
        min_tile.x.saturating_sub(offset.x).max(0),
        max_tile.x.saturating_sub(offset.x).min(last),
    );
    let (y0, y1) = (
        min_tile.y.saturating_sub(offset.y).max(0),
        max_tile.y.saturating_sub(offset.y).min(last),
    );
    for (y, x) in iproduct!(y0..=y1, x0..=x1) {
        grid.add_cost(Point::new(x, y), cost);
    }
}
