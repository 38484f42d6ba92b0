//! Maps world positions onto the node grid. The grid only covers a square window of patches
//! centred on the patch containing the stream focus (usually the player or the camera), so grid
//! coordinates are tile coordinates shifted by the window offset.
use crate::world::WorldPoint;
use grid_util::point::Point;

/// Dimensions of the tile world and of the window the grid covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowLayout {
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Side length of a streaming patch in tiles.
    pub tiles_per_patch: i32,
    /// Number of patches the window extends on each side of the focus patch.
    pub window_radius: i32,
}

impl Default for WindowLayout {
    fn default() -> WindowLayout {
        WindowLayout {
            tile_size: 1.0,
            tiles_per_patch: 16,
            window_radius: 1,
        }
    }
}

impl WindowLayout {
    pub fn patches_per_window(&self) -> i32 {
        2 * self.window_radius + 1
    }
    /// Side length of the node array.
    pub fn array_width(&self) -> usize {
        (self.tiles_per_patch * self.patches_per_window()).max(0) as usize
    }
    pub fn world_to_tile(&self, world: WorldPoint) -> Point {
        Point::new(
            (world.x / self.tile_size).floor() as i32,
            (world.y / self.tile_size).floor() as i32,
        )
    }
    /// World position of the centre of a tile.
    pub fn tile_center(&self, tile: Point) -> WorldPoint {
        WorldPoint::new(
            (tile.x as f32 + 0.5) * self.tile_size,
            (tile.y as f32 + 0.5) * self.tile_size,
        )
    }
    pub fn patch_of(&self, tile: Point) -> Point {
        Point::new(
            tile.x.div_euclid(self.tiles_per_patch),
            tile.y.div_euclid(self.tiles_per_patch),
        )
    }
}

/// The window placement. The offset only changes in [follow](Self::follow) and
/// [set_layout](Self::set_layout), never during a search.
#[derive(Clone, Copy, Debug)]
pub struct StreamWindow {
    layout: WindowLayout,
    focus: WorldPoint,
    offset: Point,
}

impl StreamWindow {
    pub fn new(layout: WindowLayout) -> StreamWindow {
        debug_assert!(layout.tiles_per_patch > 0, "tiles_per_patch must be positive");
        let mut window = StreamWindow {
            layout,
            focus: WorldPoint::default(),
            offset: Point::new(0, 0),
        };
        window.recompute_offset();
        window
    }
    pub fn layout(&self) -> &WindowLayout {
        &self.layout
    }
    pub fn focus(&self) -> WorldPoint {
        self.focus
    }
    /// Tile coordinate of grid cell (0, 0).
    pub fn offset(&self) -> Point {
        self.offset
    }
    /// Moves the window so that it is centred on the patch containing `focus`.
    pub fn follow(&mut self, focus: WorldPoint) {
        self.focus = focus;
        self.recompute_offset();
    }
    pub fn set_layout(&mut self, layout: WindowLayout) {
        debug_assert!(layout.tiles_per_patch > 0, "tiles_per_patch must be positive");
        self.layout = layout;
        self.recompute_offset();
    }
    fn recompute_offset(&mut self) {
        let layout = &self.layout;
        let focus_patch = layout.patch_of(layout.world_to_tile(self.focus));
        let origin = |patch: i32| {
            layout
                .tiles_per_patch
                .saturating_mul(patch.saturating_sub(layout.window_radius))
        };
        self.offset = Point::new(origin(focus_patch.x), origin(focus_patch.y));
    }
    /// Grid position of the cell containing `world`. The result may lie outside the window, and
    /// is [None] for positions so far away that the cell index does not fit.
    pub fn world_to_grid(&self, world: WorldPoint) -> Option<Point> {
        let tile = self.layout.world_to_tile(world);
        Some(Point::new(
            tile.x.checked_sub(self.offset.x)?,
            tile.y.checked_sub(self.offset.y)?,
        ))
    }
    pub fn grid_to_tile(&self, grid: Point) -> Point {
        Point::new(
            grid.x.saturating_add(self.offset.x),
            grid.y.saturating_add(self.offset.y),
        )
    }
    /// World position of the centre of a grid cell.
    pub fn grid_to_world(&self, grid: Point) -> WorldPoint {
        self.layout.tile_center(self.grid_to_tile(grid))
    }
}
