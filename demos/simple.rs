use grid_util::point::Point;
use tile_pathfinding::{Aabb, Pathfinder, PathfinderConfig, TileMap, WindowLayout, WorldPoint, MAX_COST};

struct Map(Vec<&'static str>);

impl TileMap for Map {
    type Tile = u8;
    fn tile_at(&self, tile: Point) -> Option<&u8> {
        let row = self.0.get(usize::try_from(tile.y).ok()?)?;
        row.as_bytes().get(usize::try_from(tile.x).ok()?)
    }
}

// In this example a path is found on a map with shape
// ########
// #S     #
// # #### #
// #    # #
// #### # #
// #     E#
// ########
// S marks the start
// E marks the end
// A crate is dropped in the corridor on the right before a second request.
fn main() {
    let map = Map(vec![
        "########", "#      #", "# #### #", "#    # #", "#### # #", "#      #", "########",
    ]);
    let layout = WindowLayout {
        tile_size: 1.0,
        tiles_per_patch: 8,
        window_radius: 0,
    };
    let mut pf = Pathfinder::new(
        PathfinderConfig::default(),
        layout,
        |tile: &u8, _| *tile != b'#',
        |_: &Aabb, _| MAX_COST,
    );
    pf.update(WorldPoint::new(1.5, 1.5));
    let start = WorldPoint::new(1.5, 1.5);
    let end = WorldPoint::new(6.5, 5.5);
    if let Some(path) = pf.get_path(&map, &[], start, end, false) {
        println!("A path has been found after {} iterations:", pf.last_search_iterations());
        for p in path {
            println!("{}", p);
        }
    }
    println!("{}", pf.grid());

    let blocker = Aabb::from_center(WorldPoint::new(6.5, 3.5), 0.5, 0.5);
    match pf.get_path(&map, &[blocker], start, end, false) {
        Some(path) => println!("Found a detour with {} points", path.len()),
        None => println!("The crate blocks the only way through"),
    }
}
